use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use thiserror::Error;

use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Deployment problem: credentials or sender identity missing.
    #[error("{0}")]
    Configuration(String),

    /// Caller sent too little (or malformed) data and nothing could fill the gap.
    #[error("{0}")]
    Validation(String),

    /// The provider refused or failed. `sms_sid` is set when the SMS had already gone out.
    #[error("{message}")]
    Provider {
        message: String,
        sms_sid: Option<String>,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Validation(_) => "ValidationError",
            Self::Provider { .. } => "ProviderError",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Responding {} with {}: {}", status.as_u16(), self.kind(), self);
        let error = self.to_string();
        let sms_sid = match self {
            Self::Provider { sms_sid, .. } => sms_sid,
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
                sms_sid,
            }),
        )
            .into_response()
    }
}
