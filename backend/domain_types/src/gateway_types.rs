//! Flow context, request/response payloads and webhook shapes shared by
//! every gateway adapter.

use std::collections::HashMap;

use common_enums::{
    CountryAlpha2, Currency, PaymentMethod, RefundStatus, TransactionStatus,
};
use common_utils::{
    errors::CustomResult,
    pii::SecretSerdeValue,
    request::Method,
    types::MinorUnit,
    Email, Secret,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::GatewayError,
    invoice::{InvoiceEnvelope, InvoiceRef},
    payment_method_data::PaymentMethodData,
    types::Gateways,
};

/// Gateways known to the registry.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatewayEnum {
    Converge,
    Coinbase,
    Squareup,
}

/// Payer identity and billing address handed to the adapter. Everything
/// here is PII and stays masked outside the wire request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PayerInfo {
    pub first_name: Option<Secret<String>>,
    pub last_name: Option<Secret<String>>,
    pub email: Option<Email>,
    pub line1: Option<Secret<String>>,
    pub city: Option<String>,
    pub zip: Option<Secret<String>>,
    pub country: Option<CountryAlpha2>,
    pub phone: Option<Secret<String>>,
}

/// Common context shared by the payment flows of one charge attempt.
#[derive(Clone, Debug)]
pub struct PaymentFlowData {
    pub status: TransactionStatus,
    pub payment_id: String,
    /// Reference the adapter sends to the provider so the transaction can
    /// be found again from either side.
    pub gateway_request_reference_id: String,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    pub return_url: Option<String>,
    pub webhook_url: Option<String>,
    pub payer: PayerInfo,
    /// Adapter-specific settings the host stores against the gateway
    /// (shop identifiers, currency policy). Never logged in cleartext.
    pub gateway_meta: Option<SecretSerdeValue>,
    pub test_mode: Option<bool>,
    pub gateways: Gateways,
    /// Raw provider payload of the last exchange, for the audit trail.
    pub raw_gateway_response: Option<String>,
}

/// Common context for refund flows.
#[derive(Clone, Debug)]
pub struct RefundFlowData {
    pub status: RefundStatus,
    pub refund_id: Option<String>,
    pub gateways: Gateways,
    pub raw_gateway_response: Option<String>,
}

/// Charge or fund reservation against a payment instrument.
#[derive(Clone, Debug)]
pub struct PaymentsAuthorizeData {
    pub payment_method_data: PaymentMethodData,
    pub amount: MinorUnit,
    pub currency: Currency,
    /// Settle immediately (a charge) instead of reserving funds.
    pub auto_capture: bool,
    pub invoice_refs: Vec<InvoiceRef>,
    pub email: Option<Email>,
    pub metadata: Option<serde_json::Value>,
}

/// Settlement of a prior authorization.
#[derive(Clone, Debug)]
pub struct PaymentsCaptureData {
    pub gateway_transaction_id: String,
    pub reference_id: Option<String>,
    pub amount_to_capture: MinorUnit,
    pub currency: Currency,
    pub invoice_refs: Vec<InvoiceRef>,
}

/// Cancellation of an authorization or unsettled charge.
#[derive(Clone, Debug)]
pub struct PaymentVoidData {
    pub gateway_transaction_id: String,
    pub reference_id: Option<String>,
}

/// Reversal of a settled charge.
#[derive(Clone, Debug)]
pub struct RefundsData {
    pub gateway_transaction_id: String,
    pub refund_id: String,
    pub minor_refund_amount: MinorUnit,
    pub currency: Currency,
    pub reason: Option<String>,
}

/// Authoritative status re-query. Used on browser return because the
/// browser-supplied parameters are never trusted on their own.
#[derive(Clone, Debug, Default)]
pub struct PaymentsSyncData {
    pub gateway_transaction_id: ResponseId,
    pub amount: MinorUnit,
    pub currency: Currency,
}

/// Off-site checkout build for non-merchant gateways. The invoice refs
/// and client id travel through the provider's metadata channel and must
/// come back bit-for-bit in the notification.
#[derive(Clone, Debug)]
pub struct RedirectCheckoutData {
    pub amount: MinorUnit,
    pub currency: Currency,
    pub client_id: String,
    pub invoice_refs: Vec<InvoiceRef>,
    pub description: Option<String>,
    pub return_url: String,
    pub cancel_url: Option<String>,
    pub webhook_url: Option<String>,
}

impl RedirectCheckoutData {
    pub fn invoice_envelope(&self) -> InvoiceEnvelope {
        InvoiceEnvelope::new(Some(self.client_id.clone()), self.invoice_refs.clone())
    }
}

/// The id a provider hands back for a transaction.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub enum ResponseId {
    GatewayTransactionId(String),
    EncodedData(String),
    #[default]
    NoResponseId,
}

impl ResponseId {
    pub fn get_gateway_transaction_id(&self) -> CustomResult<String, GatewayError> {
        match self {
            Self::GatewayTransactionId(txn_id) => Ok(txn_id.to_string()),
            _ => Err(GatewayError::MissingGatewayTransactionId.into()),
        }
    }
}

/// Browser redirect a non-merchant gateway hands back for checkout.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum RedirectForm {
    Form {
        endpoint: String,
        method: Method,
        form_fields: Vec<(String, String)>,
    },
    Uri {
        uri: String,
    },
    Html {
        html: String,
    },
}

/// Normalized success payload of a payment flow.
#[derive(Clone, Debug)]
pub enum PaymentsResponseData {
    TransactionResponse {
        resource_id: ResponseId,
        redirection_data: Option<Box<RedirectForm>>,
        /// Provider-internal reference distinct from the transaction id
        /// (approval codes, order references).
        reference_id: Option<String>,
        gateway_metadata: Option<serde_json::Value>,
        status_code: u16,
    },
}

impl PaymentsResponseData {
    pub fn get_resource_id(&self) -> &ResponseId {
        match self {
            Self::TransactionResponse { resource_id, .. } => resource_id,
        }
    }
}

/// Normalized success payload of a refund flow.
#[derive(Clone, Debug)]
pub struct RefundsResponseData {
    pub gateway_refund_id: String,
    pub refund_status: RefundStatus,
    pub status_code: u16,
}

/// The uniform transaction shape the host persists, identical for
/// synchronous merchant flows and asynchronous webhook reconstruction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionResult {
    pub status: TransactionStatus,
    pub gateway_transaction_id: Option<String>,
    pub reference_id: Option<String>,
    /// Set on refunds/voids to the transaction they reverse.
    pub parent_transaction_id: Option<String>,
    pub message: Option<String>,
}

impl TransactionResult {
    pub fn from_payment_response(
        status: TransactionStatus,
        response: &PaymentsResponseData,
        parent_transaction_id: Option<String>,
    ) -> Self {
        let PaymentsResponseData::TransactionResponse {
            resource_id,
            reference_id,
            ..
        } = response;
        Self {
            status,
            gateway_transaction_id: resource_id.get_gateway_transaction_id().ok(),
            reference_id: reference_id.clone(),
            parent_transaction_id,
            message: None,
        }
    }
}

/// Normalized inbound webhook/IPN. Only produced after source
/// verification has passed.
#[derive(Clone, Debug)]
pub struct WebhookDetailsResponse {
    pub resource_id: Option<ResponseId>,
    pub status: TransactionStatus,
    /// Provider event id, for downstream de-duplication.
    pub event_id: Option<String>,
    pub reference_id: Option<String>,
    /// Invoice allocation recovered from the metadata channel.
    pub invoice_envelope: Option<InvoiceEnvelope>,
    pub amount: Option<MinorUnit>,
    pub currency: Option<Currency>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub raw_body: Option<String>,
    pub status_code: u16,
}

/// The inbound HTTP request as the host received it.
#[derive(Clone, Debug)]
pub struct RequestDetails {
    pub method: Method,
    pub uri: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_params: Option<String>,
}

impl RequestDetails {
    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Shared secret material for webhook source verification.
#[derive(Clone, Debug)]
pub struct GatewayWebhookSecrets {
    pub secret: Vec<u8>,
    pub additional_secret: Option<Secret<String>>,
}

/// Category of an inbound provider event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    PaymentSuccess,
    PaymentProcessing,
    PaymentFailure,
    PaymentCancelled,
    RefundSuccess,
    RefundFailure,
    Unspecified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_result_carries_the_gateway_ids() {
        let response = PaymentsResponseData::TransactionResponse {
            resource_id: ResponseId::GatewayTransactionId("txn_9".to_string()),
            redirection_data: None,
            reference_id: Some("approval_1".to_string()),
            gateway_metadata: None,
            status_code: 200,
        };
        let result = TransactionResult::from_payment_response(
            TransactionStatus::Refunded,
            &response,
            Some("txn_parent".to_string()),
        );
        assert_eq!(result.status, TransactionStatus::Refunded);
        assert_eq!(result.gateway_transaction_id.as_deref(), Some("txn_9"));
        assert_eq!(result.parent_transaction_id.as_deref(), Some("txn_parent"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = RequestDetails {
            method: Method::Post,
            uri: None,
            headers: HashMap::from([(
                "X-CC-Webhook-Signature".to_string(),
                "abc".to_string(),
            )]),
            body: Vec::new(),
            query_params: None,
        };
        assert_eq!(request.get_header("x-cc-webhook-signature"), Some("abc"));
        assert_eq!(request.get_header("missing"), None);
    }
}
