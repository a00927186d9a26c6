use std::collections::HashMap;

use common_enums::{Currency, TransactionStatus};
use common_utils::{errors::CustomResult, types::MinorUnit, Secret};
use domain_types::{
    errors::GatewayError,
    flow::{CreateRedirect, PSync},
    gateway_data::{GatewayAuthType, GatewayData},
    gateway_types::{
        EventType, PaymentFlowData, PaymentsResponseData, PaymentsSyncData, RedirectCheckoutData,
        RedirectForm, ResponseId, WebhookDetailsResponse,
    },
    invoice::InvoiceEnvelope,
};
use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::types::ResponseGatewayData;

/// Key under which the invoice envelope rides in the order metadata map.
/// Square returns order metadata verbatim on every fetch.
pub(super) const METADATA_ENVELOPE_KEY: &str = "invoice_envelope";

pub struct SquareupRouterData<T> {
    pub amount: MinorUnit,
    pub router_data: T,
}

// Auth
pub struct SquareupAuthType {
    pub(super) access_token: Secret<String>,
    pub(super) location_id: Secret<String>,
}

impl TryFrom<&GatewayAuthType> for SquareupAuthType {
    type Error = error_stack::Report<GatewayError>;
    fn try_from(auth_type: &GatewayAuthType) -> Result<Self, Self::Error> {
        match auth_type {
            GatewayAuthType::BodyKey { api_key, key1 } => Ok(Self {
                access_token: api_key.to_owned(),
                location_id: key1.to_owned(),
            }),
            _ => Err(GatewayError::FailedToObtainAuthType.into()),
        }
    }
}

// Requests
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupMoney {
    pub amount: MinorUnit,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
pub struct SquareupLineItem {
    pub name: String,
    pub quantity: String,
    pub base_price_money: SquareupMoney,
}

#[derive(Debug, Serialize)]
pub struct SquareupOrder {
    pub location_id: Secret<String>,
    pub line_items: Vec<SquareupLineItem>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SquareupCheckoutOptions {
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct SquareupPaymentLinkRequest {
    pub idempotency_key: String,
    pub order: SquareupOrder,
    pub checkout_options: SquareupCheckoutOptions,
}

impl
    TryFrom<
        SquareupRouterData<
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    > for SquareupPaymentLinkRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: SquareupRouterData<
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let auth = SquareupAuthType::try_from(&item.router_data.auth_type)?;
        let request = &item.router_data.request;
        let envelope = request.invoice_envelope().encode()?;
        let name = request
            .description
            .clone()
            .unwrap_or_else(|| format!("Payment {}", request.client_id));
        Ok(Self {
            idempotency_key: item
                .router_data
                .resource_common_data
                .gateway_request_reference_id
                .clone(),
            order: SquareupOrder {
                location_id: auth.location_id,
                line_items: vec![SquareupLineItem {
                    name,
                    quantity: "1".to_string(),
                    base_price_money: SquareupMoney {
                        amount: item.amount,
                        currency: request.currency,
                    },
                }],
                metadata: HashMap::from([(METADATA_ENVELOPE_KEY.to_string(), envelope)]),
            },
            checkout_options: SquareupCheckoutOptions {
                redirect_url: request.return_url.clone(),
            },
        })
    }
}

// Responses
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupPaymentLink {
    pub id: String,
    pub url: String,
    pub order_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupPaymentLinkResponse {
    pub payment_link: SquareupPaymentLink,
}

/// Per-tender card status. A checkout paid with several tenders reports
/// one of these for each.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquareupTenderCardStatus {
    Authorized,
    Captured,
    Voided,
    Failed,
    #[serde(other)]
    Unknown,
}

impl From<SquareupTenderCardStatus> for TransactionStatus {
    fn from(status: SquareupTenderCardStatus) -> Self {
        match status {
            SquareupTenderCardStatus::Authorized => Self::Pending,
            SquareupTenderCardStatus::Captured => Self::Approved,
            SquareupTenderCardStatus::Voided => Self::Void,
            SquareupTenderCardStatus::Failed => Self::Declined,
            SquareupTenderCardStatus::Unknown => Self::Error,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupCardDetails {
    pub status: SquareupTenderCardStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupTender {
    pub id: String,
    pub card_details: Option<SquareupCardDetails>,
    pub amount_money: Option<SquareupMoney>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupOrderData {
    pub id: String,
    pub tenders: Option<Vec<SquareupTender>>,
    pub metadata: Option<HashMap<String, String>>,
    pub total_money: Option<SquareupMoney>,
}

impl SquareupOrderData {
    /// Worst-case status across all tenders. An order with no tenders is
    /// an abandoned or still-open checkout, which stays pending.
    pub fn aggregate_status(&self) -> TransactionStatus {
        let tenders = match self.tenders.as_deref() {
            Some(tenders) if !tenders.is_empty() => tenders,
            _ => return TransactionStatus::Pending,
        };
        TransactionStatus::aggregate(tenders.iter().map(|tender| {
            tender
                .card_details
                .as_ref()
                .map(|card| TransactionStatus::from(card.status))
                .unwrap_or(TransactionStatus::Error)
        }))
    }

    pub fn invoice_envelope(&self) -> Result<Option<InvoiceEnvelope>, error_stack::Report<GatewayError>> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.get(METADATA_ENVELOPE_KEY))
            .map(|raw| InvoiceEnvelope::decode(raw))
            .transpose()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SquareupOrderResponse {
    pub order: SquareupOrderData,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupErrorDetail {
    pub category: Option<String>,
    pub code: String,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupErrorResponse {
    pub errors: Vec<SquareupErrorDetail>,
}

impl SquareupErrorResponse {
    pub fn first_error(&self) -> (String, String) {
        self.errors
            .first()
            .map(|error| {
                (
                    error.code.clone(),
                    error.detail.clone().unwrap_or_else(|| error.code.clone()),
                )
            })
            .unwrap_or_else(|| {
                (
                    "UNKNOWN".to_string(),
                    "Gateway returned an error without details".to_string(),
                )
            })
    }
}

impl
    TryFrom<
        ResponseGatewayData<
            SquareupPaymentLinkResponse,
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    > for GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ResponseGatewayData<
            SquareupPaymentLinkResponse,
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let link = item.response.payment_link;
        let response = PaymentsResponseData::TransactionResponse {
            resource_id: ResponseId::GatewayTransactionId(link.order_id),
            redirection_data: Some(Box::new(RedirectForm::Uri { uri: link.url })),
            reference_id: Some(link.id),
            gateway_metadata: None,
            status_code: item.http_code,
        };
        Ok(item
            .gateway_data
            .update_resource_common_data(|mut common| {
                common.status = TransactionStatus::Pending;
                common
            })
            .set_response(Ok(response)))
    }
}

impl
    TryFrom<
        ResponseGatewayData<
            SquareupOrderResponse,
            GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        >,
    > for GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ResponseGatewayData<
            SquareupOrderResponse,
            GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let order = item.response.order;
        let status = order.aggregate_status();
        let gateway_metadata = order
            .invoice_envelope()?
            .map(|envelope| {
                serde_json::to_value(envelope)
                    .change_context(GatewayError::InvoiceReferenceDecodingFailed)
            })
            .transpose()?;
        let response = PaymentsResponseData::TransactionResponse {
            resource_id: ResponseId::GatewayTransactionId(order.id.clone()),
            redirection_data: None,
            reference_id: None,
            gateway_metadata,
            status_code: item.http_code,
        };
        Ok(item
            .gateway_data
            .update_resource_common_data(|mut common| {
                common.status = status;
                common
            })
            .set_response(Ok(response)))
    }
}

// Webhooks
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquareupPaymentStatus {
    Approved,
    Pending,
    Completed,
    Canceled,
    Failed,
    #[serde(other)]
    Unknown,
}

impl From<SquareupPaymentStatus> for TransactionStatus {
    fn from(status: SquareupPaymentStatus) -> Self {
        match status {
            SquareupPaymentStatus::Completed => Self::Approved,
            SquareupPaymentStatus::Approved | SquareupPaymentStatus::Pending => Self::Pending,
            SquareupPaymentStatus::Canceled => Self::Void,
            SquareupPaymentStatus::Failed => Self::Declined,
            SquareupPaymentStatus::Unknown => Self::Error,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupWebhookPayment {
    pub id: String,
    pub order_id: Option<String>,
    pub status: SquareupPaymentStatus,
    pub amount_money: Option<SquareupMoney>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupWebhookObject {
    pub payment: SquareupWebhookPayment,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupWebhookData {
    pub id: String,
    pub object: SquareupWebhookObject,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquareupWebhookBody {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: SquareupWebhookData,
}

impl SquareupWebhookBody {
    pub fn event_type(&self) -> EventType {
        match (
            self.event_type.as_str(),
            self.data.object.payment.status,
        ) {
            (_, SquareupPaymentStatus::Completed) => EventType::PaymentSuccess,
            (_, SquareupPaymentStatus::Failed) => EventType::PaymentFailure,
            (_, SquareupPaymentStatus::Canceled) => EventType::PaymentCancelled,
            ("payment.created" | "payment.updated", _) => EventType::PaymentProcessing,
            _ => EventType::Unspecified,
        }
    }

    /// Normalize a verified notification into the host-facing shape.
    pub fn webhook_details(
        &self,
        status_code: u16,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        let payment = &self.data.object.payment;
        let status = TransactionStatus::from(payment.status);
        let resource_id = payment
            .order_id
            .clone()
            .or_else(|| Some(payment.id.clone()))
            .map(ResponseId::GatewayTransactionId);
        let (amount, currency) = payment
            .amount_money
            .as_ref()
            .map(|money| (money.amount, money.currency))
            .map_or((None, None), |(amount, currency)| {
                (Some(amount), Some(currency))
            });
        Ok(WebhookDetailsResponse {
            resource_id,
            status,
            event_id: Some(self.event_id.clone()),
            reference_id: Some(payment.id.clone()),
            // The notification carries no order metadata; the host
            // recovers the envelope with a follow-up order sync.
            invoice_envelope: None,
            amount,
            currency,
            error_code: None,
            error_message: None,
            raw_body: None,
            status_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tender(status: &str) -> SquareupTender {
        serde_json::from_value(serde_json::json!({
            "id": format!("tender_{status}"),
            "card_details": {"status": status}
        }))
        .unwrap()
    }

    fn order_with(statuses: &[&str]) -> SquareupOrderData {
        SquareupOrderData {
            id: "order_1".to_string(),
            tenders: Some(statuses.iter().map(|status| tender(status)).collect()),
            metadata: None,
            total_money: None,
        }
    }

    #[test]
    fn mixed_tenders_report_the_worst_status() {
        assert_eq!(
            order_with(&["CAPTURED", "FAILED"]).aggregate_status(),
            TransactionStatus::Declined
        );
        assert_eq!(
            order_with(&["CAPTURED", "AUTHORIZED"]).aggregate_status(),
            TransactionStatus::Pending
        );
        assert_eq!(
            order_with(&["CAPTURED", "CAPTURED"]).aggregate_status(),
            TransactionStatus::Approved
        );
    }

    #[test]
    fn order_without_tenders_stays_pending() {
        let order = SquareupOrderData {
            id: "order_2".to_string(),
            tenders: None,
            metadata: None,
            total_money: None,
        };
        assert_eq!(order.aggregate_status(), TransactionStatus::Pending);
    }

    #[test]
    fn tender_with_unknown_status_degrades_the_aggregate_to_error() {
        assert_eq!(
            order_with(&["CAPTURED", "SOME_NEW_STATUS"]).aggregate_status(),
            TransactionStatus::Error
        );
    }

    #[test]
    fn payment_status_maps_to_canonical_statuses() {
        assert_eq!(
            TransactionStatus::from(SquareupPaymentStatus::Completed),
            TransactionStatus::Approved
        );
        assert_eq!(
            TransactionStatus::from(SquareupPaymentStatus::Approved),
            TransactionStatus::Pending
        );
        assert_eq!(
            TransactionStatus::from(SquareupPaymentStatus::Failed),
            TransactionStatus::Declined
        );
    }

    #[test]
    fn webhook_body_normalizes_into_host_details() {
        let body: SquareupWebhookBody = serde_json::from_value(serde_json::json!({
            "event_id": "evt_42",
            "type": "payment.updated",
            "data": {
                "id": "data_1",
                "object": {
                    "payment": {
                        "id": "pay_1",
                        "order_id": "order_1",
                        "status": "COMPLETED",
                        "amount_money": {"amount": 10000, "currency": "USD"}
                    }
                }
            }
        }))
        .unwrap();

        let details = body.webhook_details(200).unwrap();
        assert_eq!(details.status, TransactionStatus::Approved);
        assert_eq!(details.event_id.as_deref(), Some("evt_42"));
        assert_eq!(details.amount, Some(MinorUnit::new(10000)));
        // The envelope rides in order metadata, not the notification.
        assert_eq!(details.invoice_envelope, None);
    }

    #[test]
    fn error_response_surfaces_the_first_error() {
        let response: SquareupErrorResponse = serde_json::from_str(
            r#"{"errors":[{"category":"INVALID_REQUEST_ERROR","code":"NOT_FOUND","detail":"Order not found"}]}"#,
        )
        .unwrap();
        let (code, message) = response.first_error();
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(message, "Order not found");
    }
}
