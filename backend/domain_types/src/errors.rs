//! Error taxonomy for the gateway layer.
//!
//! Runtime payment outcomes (declines) are never errors: they travel in
//! the transaction status. Errors cover adapter, configuration, protocol
//! and verification failures. Configuration problems are additionally
//! collected into a field-keyed [`SettingsErrors`] map so the host can
//! render them next to the offending form field.

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to obtain authentication type")]
    FailedToObtainAuthType,
    #[error("Failed to encode gateway request")]
    RequestEncodingFailed,
    #[error("Failed to deserialize gateway response")]
    ResponseDeserializationFailed,
    #[error("{0} is not supported by this gateway")]
    NotImplemented(String),
    #[error("Failed to convert amount to the gateway's unit")]
    AmountConversionFailed,
    #[error("Webhook source verification failed")]
    WebhookSourceVerificationFailed,
    #[error("Webhook signature not found in the request")]
    WebhookSignatureNotFound,
    #[error("Failed to decode webhook body")]
    WebhookBodyDecodingFailed,
    #[error("Missing gateway transaction id")]
    MissingGatewayTransactionId,
    #[error("Failed to parse invoice references from the metadata channel")]
    InvoiceReferenceDecodingFailed,
}

/// Field-keyed configuration errors, returned to the caller as data.
/// Ordered so rendered forms are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SettingsErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl SettingsErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.errors.iter()
    }

    /// Empty maps collapse to `Ok(())` so callers can use `?`-free
    /// control flow on the validation result.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_errors_collect_per_field() {
        let mut errors = SettingsErrors::new();
        errors.add("merchant_id", "Merchant id cannot be empty");
        errors.add("pin", "PIN must be 4 digits");
        errors.add("pin", "PIN is required in live mode");
        assert_eq!(errors.get("pin").map(<[String]>::len), Some(2));
        assert!(errors.clone().into_result().is_err());
        assert!(SettingsErrors::new().into_result().is_ok());
    }
}
