//! Inbound notification handling. Verification runs before any parsing;
//! a payload that fails verification is logged and rejected so the host
//! can never mistake it for a real event.

use common_utils::errors::CustomResult;
use domain_types::{
    errors::GatewayError,
    gateway_types::{EventType, GatewayWebhookSecrets, RequestDetails, WebhookDetailsResponse},
};
use error_stack::ResultExt;

use crate::{
    events::GatewayEvent,
    verification::{GatewaySourceVerificationSecrets, SourceVerification},
};

pub trait IncomingWebhook: SourceVerification {
    /// The signature the provider attached to this notification.
    fn get_webhook_source_verification_signature(
        &self,
        _request: &RequestDetails,
        _webhook_secret: &GatewayWebhookSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        Ok(Vec::new())
    }

    /// The bytes the signature was computed over. Defaults to the raw
    /// body, which is what most providers sign.
    fn get_webhook_source_verification_message(
        &self,
        request: &RequestDetails,
        _webhook_secret: &GatewayWebhookSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        Ok(request.body.clone())
    }

    fn verify_webhook_source(
        &self,
        request: &RequestDetails,
        webhook_secret: Option<&GatewayWebhookSecrets>,
    ) -> CustomResult<bool, GatewayError> {
        let secret = webhook_secret
            .ok_or(GatewayError::WebhookSourceVerificationFailed)?;
        let key = self.get_secrets(GatewaySourceVerificationSecrets::WebhookSecret(
            secret.clone(),
        ))?;
        let signature =
            self.get_webhook_source_verification_signature(request, secret)?;
        let message =
            self.get_webhook_source_verification_message(request, secret)?;
        self.get_algorithm()?
            .verify_signature(&key, &signature, &message)
            .change_context(GatewayError::WebhookSourceVerificationFailed)
    }

    fn get_event_type(
        &self,
        _request: &RequestDetails,
    ) -> CustomResult<EventType, GatewayError> {
        Err(GatewayError::NotImplemented("get_event_type".to_string()).into())
    }

    fn process_payment_webhook(
        &self,
        _request: RequestDetails,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        Err(GatewayError::NotImplemented("process_payment_webhook".to_string()).into())
    }

    /// The full pipeline: log the raw payload, verify the source, then
    /// parse. Verification failure returns an error and nothing else, the
    /// payload is never interpreted.
    fn handle_webhook(
        &self,
        gateway: &str,
        request: RequestDetails,
        webhook_secret: Option<GatewayWebhookSecrets>,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        let mut event = GatewayEvent::new(gateway, "incoming_webhook", request.uri.clone());
        event.set_request_body(&raw_body_for_log(&request.body));

        let verified = self
            .verify_webhook_source(&request, webhook_secret.as_ref())
            .unwrap_or(false);
        if !verified {
            event.set_success(false);
            event.emit();
            return Err(GatewayError::WebhookSourceVerificationFailed.into());
        }

        match self.process_payment_webhook(request) {
            Ok(details) => {
                event.set_status_code(details.status_code);
                event.set_success(true);
                event.emit();
                Ok(details)
            }
            Err(error) => {
                event.set_success(false);
                event.emit();
                Err(error)
            }
        }
    }
}

/// Body rendition for the exchange log. JSON bodies are logged
/// structurally so field masking applies; anything else is logged as a
/// lossy string.
fn raw_body_for_log(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}
