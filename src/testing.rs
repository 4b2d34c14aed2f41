use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{MessagingProvider, NewCall, NewMessage, ProviderError, ProviderReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Message(NewMessage),
    Call(NewCall),
}

/// In-memory provider that records every request and answers from canned results.
#[derive(Default)]
pub struct RecordingProvider {
    pub requests: Mutex<Vec<Recorded>>,
    pub message_error: Option<String>,
    pub call_error: Option<String>,
}

impl RecordingProvider {
    pub fn failing_message(message: &str) -> Self {
        Self {
            message_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_call(message: &str) -> Self {
        Self {
            call_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn rejected(message: &str) -> ProviderError {
        ProviderError::Rejected {
            status: 400,
            code: None,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl MessagingProvider for RecordingProvider {
    async fn create_message(&self, message: &NewMessage) -> Result<ProviderReceipt, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded::Message(message.clone()));
        match &self.message_error {
            Some(err) => Err(Self::rejected(err)),
            None => Ok(ProviderReceipt {
                sid: "SMxxxx".to_string(),
            }),
        }
    }

    async fn create_call(&self, call: &NewCall) -> Result<ProviderReceipt, ProviderError> {
        self.requests.lock().unwrap().push(Recorded::Call(call.clone()));
        match &self.call_error {
            Some(err) => Err(Self::rejected(err)),
            None => Ok(ProviderReceipt {
                sid: "CAxxxx".to_string(),
            }),
        }
    }
}
