//! Exchange audit events. Every remote call and inbound webhook is
//! recorded exactly once, request and response, with known-sensitive
//! fields masked before serialization.

use common_utils::pii::mask_sensitive_values;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct GatewayEvent {
    pub gateway: String,
    pub flow: String,
    pub url: Option<String>,
    request_body: Option<serde_json::Value>,
    response_body: Option<serde_json::Value>,
    error_response_body: Option<serde_json::Value>,
    pub status_code: Option<u16>,
    pub success: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl GatewayEvent {
    pub fn new(gateway: &str, flow: &str, url: Option<String>) -> Self {
        Self {
            gateway: gateway.to_string(),
            flow: flow.to_string(),
            url,
            request_body: None,
            response_body: None,
            error_response_body: None,
            status_code: None,
            success: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn set_request_body<T: Serialize>(&mut self, body: &T) {
        self.request_body = Self::masked(body);
    }

    pub fn set_response_body<T: Serialize>(&mut self, body: &T) {
        self.response_body = Self::masked(body);
    }

    pub fn set_error_response_body<T: Serialize>(&mut self, body: &T) {
        self.error_response_body = Self::masked(body);
    }

    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = Some(status_code);
    }

    pub fn set_success(&mut self, success: bool) {
        self.success = success;
    }

    fn masked<T: Serialize>(body: &T) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(body).ok()?;
        mask_sensitive_values(&mut value);
        Some(value)
    }

    /// Emit the event to the structured log. Called once per exchange.
    pub fn emit(&self) {
        tracing::info!(
            gateway = %self.gateway,
            flow = %self.flow,
            url = ?self.url,
            status_code = ?self.status_code,
            success = self.success,
            request = ?self.request_body,
            response = ?self.response_body,
            error = ?self.error_response_body,
            "gateway exchange"
        );
    }
}
