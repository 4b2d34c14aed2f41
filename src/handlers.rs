use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::dispatch::{dispatch_alert, ensure_configured, AlertOutcome};
use crate::error::DispatchError;
use crate::provider::MessagingProvider;
use crate::types::{AlertRequest, AlertResponse};

pub struct AppState {
    pub config: ProviderConfig,
    /// Absent when the process started without provider credentials.
    pub provider: Option<Arc<dyn MessagingProvider>>,
}

pub async fn health() -> &'static str {
    "Fan Alert System is running."
}

pub async fn send_failure_alert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, DispatchError> {
    ensure_configured(state.provider.as_deref())?;

    let req = parse_alert_request(&headers, &body)?;
    info!(
        "Failure alert requested (to: {}, custom body: {})",
        req.to.as_deref().unwrap_or("default"),
        req.body.is_some()
    );

    let outcome = dispatch_alert(&req, &state.config, state.provider.as_deref()).await?;
    Ok(Json(AlertResponse::from(outcome)))
}

impl From<AlertOutcome> for AlertResponse {
    fn from(outcome: AlertOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message,
            sms_sid: outcome.sms_sid,
            call_sid: outcome.call_sid,
        }
    }
}

/// Accepts JSON or form-encoded bodies. An empty body means "use every default".
fn parse_alert_request(headers: &HeaderMap, body: &[u8]) -> Result<AlertRequest, DispatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AlertRequest::default());
    }

    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(is_form_media_type)
        .unwrap_or(false);

    if is_form {
        return serde_urlencoded::from_bytes::<AlertRequest>(body).map_err(invalid_body);
    }

    // Derived struct deserializers also take a positional array, so insist on an object first.
    match serde_json::from_slice::<Value>(body).map_err(invalid_body)? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(invalid_body),
        _ => Err(invalid_body("expected a JSON object")),
    }
}

fn is_form_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn invalid_body(err: impl std::fmt::Display) -> DispatchError {
    DispatchError::Validation(format!("Invalid request body: {}", err))
}
