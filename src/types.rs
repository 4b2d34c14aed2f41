use serde::{Deserialize, Serialize};

/// Body of `POST /send-failure-alert`. Both fields fall back to configured defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertRequest {
    pub to: Option<String>,
    pub body: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub success: bool,
    pub message: String,
    pub sms_sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_sid: Option<String>,
}
