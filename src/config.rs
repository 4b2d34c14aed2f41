use std::path::PathBuf;

use log::{info, warn};
use secrecy::Secret;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_CALL_FLOW_URL: &str = "http://demo.twilio.com/docs/voice.xml";
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

const MASK_REVEAL_MIN_LEN: usize = 12;

/// Provider settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub account_id: Option<String>,
    pub auth_secret: Option<Secret<String>>,
    pub sender_number: Option<String>,
    pub messaging_service_id: Option<String>,
    pub default_destination: Option<String>,
    /// TwiML document the voice call plays.
    pub call_flow_url: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        Self {
            account_id: get("ACCOUNT_ID"),
            auth_secret: get("AUTH_SECRET").map(Secret::new),
            sender_number: get("SENDER_NUMBER"),
            messaging_service_id: get("MESSAGING_SERVICE_ID"),
            default_destination: get("DEFAULT_DESTINATION"),
            call_flow_url: get("CALL_FLOW_URL")
                .unwrap_or_else(|| DEFAULT_CALL_FLOW_URL.to_string()),
            api_base_url: get("PROVIDER_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.account_id.is_some() && self.auth_secret.is_some()
    }

    /// Dumps the effective settings with credential-like values masked.
    pub fn log_summary(&self) {
        if !self.has_credentials() {
            warn!("Provider credentials not found. Set ACCOUNT_ID and AUTH_SECRET");
        }
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("ACCOUNT_ID: {}", mask(self.account_id.as_deref())),
            format!(
                "AUTH_SECRET: {}",
                if self.auth_secret.is_some() { "set" } else { "undefined" }
            ),
            format!("SENDER_NUMBER: {}", display(self.sender_number.as_deref())),
            format!(
                "MESSAGING_SERVICE_ID: {}",
                mask(self.messaging_service_id.as_deref())
            ),
            format!(
                "DEFAULT_DESTINATION: {}",
                display(self.default_destination.as_deref())
            ),
        ]
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_PORT);
        let static_dir = non_empty(lookup("STATIC_DIR"))
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        Self {
            port,
            static_dir: PathBuf::from(static_dir),
        }
    }
}

/// Returns the first candidate that holds a non-blank string, in order.
///
/// Only emptiness disqualifies a value: `"0"` or `"false"` are kept as given.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Shortens a credential-like value to its first and last four characters.
/// Values of twelve characters or fewer are starred out entirely.
pub fn mask(value: Option<&str>) -> String {
    let Some(value) = value else {
        return "undefined".to_string();
    };

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= MASK_REVEAL_MIN_LEN {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn display(value: Option<&str>) -> &str {
    value.unwrap_or("undefined")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
