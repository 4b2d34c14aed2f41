use log::{debug, error, info, warn};

use crate::config::{first_non_empty, ProviderConfig};
use crate::error::DispatchError;
use crate::provider::{MessagingProvider, NewCall, NewMessage, ProviderError, SenderIdentity};
use crate::types::AlertRequest;

pub const DEFAULT_ALERT_BODY: &str = "Fan 1 in Pond A has stopped working!";

const SENT_MESSAGE: &str = "SMS and Call sent successfully.";
const CALL_SKIPPED_MESSAGE: &str = "SMS sent (call skipped - no SENDER_NUMBER configured).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertOutcome {
    pub sms_sid: String,
    /// `None` when no sender number was configured and the call was skipped.
    pub call_sid: Option<String>,
    pub message: String,
}

/// Fails unless a provider client was built from `ACCOUNT_ID` and `AUTH_SECRET`.
pub fn ensure_configured(
    provider: Option<&dyn MessagingProvider>,
) -> Result<&dyn MessagingProvider, DispatchError> {
    provider.ok_or_else(|| {
        DispatchError::Configuration(
            "Provider client not configured. Set ACCOUNT_ID and AUTH_SECRET".to_string(),
        )
    })
}

/// Request `to` first, then `DEFAULT_DESTINATION`.
pub fn resolve_destination(request: &AlertRequest, config: &ProviderConfig) -> Option<String> {
    first_non_empty([
        request.to.as_deref(),
        config.default_destination.as_deref(),
    ])
    .map(str::to_string)
}

pub fn resolve_body(request: &AlertRequest) -> String {
    first_non_empty([request.body.as_deref()])
        .unwrap_or(DEFAULT_ALERT_BODY)
        .to_string()
}

/// Messaging service wins over a literal sender number.
pub fn resolve_sender(config: &ProviderConfig) -> Option<SenderIdentity> {
    if let Some(sid) = first_non_empty([config.messaging_service_id.as_deref()]) {
        return Some(SenderIdentity::MessagingService(sid.to_string()));
    }
    first_non_empty([config.sender_number.as_deref()])
        .map(|number| SenderIdentity::Number(number.to_string()))
}

/// Sends the alert SMS, then places the voice call when a sender number exists.
///
/// Nothing is retried. A failed SMS stops the flow before the call; a failed
/// call still reports the SMS sid it follows.
pub async fn dispatch_alert(
    request: &AlertRequest,
    config: &ProviderConfig,
    provider: Option<&dyn MessagingProvider>,
) -> Result<AlertOutcome, DispatchError> {
    let provider = ensure_configured(provider)?;

    let to = resolve_destination(request, config).ok_or_else(|| {
        DispatchError::Validation(
            "Missing 'to' number. Provide it in the JSON body { \"to\": \"+91...\" } or set DEFAULT_DESTINATION"
                .to_string(),
        )
    })?;
    let body = resolve_body(request);
    let sender = resolve_sender(config).ok_or_else(|| {
        DispatchError::Configuration(
            "Missing 'from' configuration. Set SENDER_NUMBER or MESSAGING_SERVICE_ID".to_string(),
        )
    })?;
    debug!("Validated alert for {} via {}", to, sender.kind());

    let sms = provider
        .create_message(&NewMessage {
            body,
            to: to.clone(),
            sender,
        })
        .await
        .map_err(|e| provider_failure("SMS", e, None))?;
    info!("SMS {} sent to {}", sms.sid, to);

    let Some(from) = first_non_empty([config.sender_number.as_deref()]) else {
        warn!("Skipping call: SENDER_NUMBER not set (required for call 'from')");
        return Ok(AlertOutcome {
            sms_sid: sms.sid,
            call_sid: None,
            message: CALL_SKIPPED_MESSAGE.to_string(),
        });
    };

    let call = provider
        .create_call(&NewCall {
            url: config.call_flow_url.clone(),
            from: from.to_string(),
            to: to.clone(),
        })
        .await
        .map_err(|e| provider_failure("Call", e, Some(sms.sid.clone())))?;
    info!("Call {} placed to {}", call.sid, to);

    Ok(AlertOutcome {
        sms_sid: sms.sid,
        call_sid: Some(call.sid),
        message: SENT_MESSAGE.to_string(),
    })
}

fn provider_failure(stage: &str, err: ProviderError, sms_sid: Option<String>) -> DispatchError {
    match &err {
        ProviderError::Rejected {
            status,
            code: Some(code),
            ..
        } => error!("{} rejected by provider (status {}, code {}): {}", stage, status, code, err),
        ProviderError::Rejected { status, .. } => {
            error!("{} rejected by provider (status {}): {}", stage, status, err)
        }
        ProviderError::Transport(_) | ProviderError::Decode(_) => {
            error!("{} failed: {}", stage, err)
        }
    }

    DispatchError::Provider {
        message: err.to_string(),
        sms_sid,
    }
}
