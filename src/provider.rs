use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{mask, ProviderConfig};

const API_VERSION: &str = "2010-04-01";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error document; `message` is theirs, unedited.
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),
}

/// Who an SMS appears to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderIdentity {
    MessagingService(String),
    Number(String),
}

impl SenderIdentity {
    /// Log-safe label; the sid or number itself is left out.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessagingService(_) => "messaging service",
            Self::Number(_) => "sender number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub body: String,
    pub to: String,
    pub sender: SenderIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCall {
    pub url: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderReceipt {
    pub sid: String,
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn create_message(&self, message: &NewMessage) -> Result<ProviderReceipt, ProviderError>;
    async fn create_call(&self, call: &NewCall) -> Result<ProviderReceipt, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    code: Option<i64>,
    message: String,
    #[serde(default)]
    more_info: Option<String>,
}

/// Twilio-compatible REST client.
pub struct TwilioClient {
    account_id: String,
    auth_secret: Secret<String>,
    base_url: String,
    client: Client,
}

impl TwilioClient {
    pub fn new(account_id: String, auth_secret: Secret<String>, base_url: String) -> Self {
        Self {
            account_id,
            auth_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// `None` unless both the account id and the auth secret are configured.
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        let account_id = config.account_id.clone()?;
        let auth_secret = config.auth_secret.clone()?;
        Some(Self::new(
            account_id,
            auth_secret,
            config.api_base_url.clone(),
        ))
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{}.json",
            self.base_url, API_VERSION, self.account_id, resource
        )
    }

    async fn post_form(
        &self,
        resource: &str,
        form: &[(&str, &str)],
    ) -> Result<ProviderReceipt, ProviderError> {
        let url = self.resource_url(resource);
        debug!(
            "POST {} for account {}",
            resource,
            mask(Some(&self.account_id))
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_id, Some(self.auth_secret.expose_secret()))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(transport_error)?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorDocument>(&text) {
                Ok(doc) => {
                    if let Some(more_info) = &doc.more_info {
                        debug!("{} rejected ({}): see {}", resource, status, more_info);
                    }
                    ProviderError::Rejected {
                        status: status.as_u16(),
                        code: doc.code,
                        message: doc.message,
                    }
                }
                Err(_) => ProviderError::Rejected {
                    status: status.as_u16(),
                    code: None,
                    message: if text.trim().is_empty() {
                        format!("provider returned status {}", status)
                    } else {
                        text
                    },
                },
            });
        }

        serde_json::from_str::<ProviderReceipt>(&text)
            .map_err(|e| ProviderError::Decode(format!("unexpected {} response: {}", resource, e)))
    }
}

/// reqwest errors print the request URL, which carries the account id.
fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.without_url().to_string())
}

#[async_trait]
impl MessagingProvider for TwilioClient {
    async fn create_message(&self, message: &NewMessage) -> Result<ProviderReceipt, ProviderError> {
        let sender = match &message.sender {
            SenderIdentity::MessagingService(sid) => ("MessagingServiceSid", sid.as_str()),
            SenderIdentity::Number(number) => ("From", number.as_str()),
        };
        let form = [
            ("To", message.to.as_str()),
            ("Body", message.body.as_str()),
            sender,
        ];

        self.post_form("Messages", &form).await
    }

    async fn create_call(&self, call: &NewCall) -> Result<ProviderReceipt, ProviderError> {
        let form = [
            ("To", call.to.as_str()),
            ("From", call.from.as_str()),
            ("Url", call.url.as_str()),
        ];

        self.post_form("Calls", &form).await
    }
}
