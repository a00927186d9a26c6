use common_enums::{Currency, TransactionStatus};
use common_utils::{
    errors::CustomResult,
    types::{AmountConvertor, StringMajorUnit, StringMajorUnitForGateway},
    Secret,
};
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

pub struct CoinbaseRouterData<T> {
    pub amount: StringMajorUnit,
    pub router_data: T,
}

// Auth
pub struct CoinbaseAuthType {
    pub(super) api_key: Secret<String>,
}

impl TryFrom<&GatewayAuthType> for CoinbaseAuthType {
    type Error = error_stack::Report<GatewayError>;
    fn try_from(auth_type: &GatewayAuthType) -> Result<Self, Self::Error> {
        match auth_type {
            GatewayAuthType::HeaderKey { api_key } => Ok(Self {
                api_key: api_key.to_owned(),
            }),
            _ => Err(GatewayError::FailedToObtainAuthType.into()),
        }
    }
}

// Requests
#[derive(Debug, Serialize)]
pub struct LocalPrice {
    pub amount: StringMajorUnit,
    pub currency: Currency,
}

/// The free-text channel Coinbase round-trips verbatim. The invoice
/// envelope must come back bit-for-bit in the notification.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CoinbaseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_envelope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoinbaseChargeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pricing_type: &'static str,
    pub local_price: LocalPrice,
    pub metadata: CoinbaseMetadata,
    pub redirect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

impl
    TryFrom<
        CoinbaseRouterData<
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    > for CoinbaseChargeRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: CoinbaseRouterData<
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let request = &item.router_data.request;
        let envelope = request.invoice_envelope().encode()?;
        Ok(Self {
            name: item.router_data.resource_common_data.description.clone(),
            description: request.description.clone(),
            pricing_type: "fixed_price",
            local_price: LocalPrice {
                amount: item.amount,
                currency: request.currency,
            },
            metadata: CoinbaseMetadata {
                invoice_envelope: Some(envelope),
                client_id: Some(request.client_id.clone()),
            },
            redirect_url: request.return_url.clone(),
            cancel_url: request.cancel_url.clone(),
        })
    }
}

// Responses
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoinbaseChargeStatus {
    New,
    Pending,
    Completed,
    Expired,
    Canceled,
    Unresolved,
    Resolved,
    #[serde(other)]
    Unknown,
}

impl From<CoinbaseChargeStatus> for TransactionStatus {
    fn from(status: CoinbaseChargeStatus) -> Self {
        match status {
            CoinbaseChargeStatus::New
            | CoinbaseChargeStatus::Pending
            | CoinbaseChargeStatus::Unresolved => Self::Pending,
            CoinbaseChargeStatus::Completed | CoinbaseChargeStatus::Resolved => Self::Approved,
            CoinbaseChargeStatus::Expired => Self::Declined,
            CoinbaseChargeStatus::Canceled => Self::Void,
            CoinbaseChargeStatus::Unknown => Self::Error,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinbaseTimelineEntry {
    pub status: CoinbaseChargeStatus,
    pub time: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinbaseMoney {
    pub amount: StringMajorUnit,
    pub currency: Currency,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinbasePricing {
    pub local: CoinbaseMoney,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinbaseChargeData {
    pub id: String,
    /// The short charge code; the id payers and notifications reference.
    pub code: String,
    pub hosted_url: Option<String>,
    pub timeline: Option<Vec<CoinbaseTimelineEntry>>,
    pub metadata: Option<CoinbaseMetadata>,
    pub pricing: Option<CoinbasePricing>,
}

impl CoinbaseChargeData {
    /// The current status is the last timeline entry; a charge with no
    /// timeline yet has only been created.
    pub fn current_status(&self) -> CoinbaseChargeStatus {
        self.timeline
            .as_deref()
            .and_then(<[CoinbaseTimelineEntry]>::last)
            .map(|entry| entry.status)
            .unwrap_or(CoinbaseChargeStatus::New)
    }

    fn paid_amount(&self) -> Option<(StringMajorUnit, Currency)> {
        self.pricing
            .as_ref()
            .map(|pricing| (pricing.local.amount.clone(), pricing.local.currency))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinbaseChargeResponse {
    pub data: CoinbaseChargeData,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoinbaseErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoinbaseErrorResponse {
    pub error: CoinbaseErrorBody,
}

impl
    TryFrom<
        ResponseGatewayData<
            CoinbaseChargeResponse,
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    > for GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ResponseGatewayData<
            CoinbaseChargeResponse,
            GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let charge = item.response.data;
        let redirection_data = charge
            .hosted_url
            .clone()
            .map(|uri| RedirectForm::Uri { uri });
        let response = PaymentsResponseData::TransactionResponse {
            resource_id: ResponseId::GatewayTransactionId(charge.code.clone()),
            redirection_data: redirection_data.map(Box::new),
            reference_id: Some(charge.id),
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
            CoinbaseChargeResponse,
            GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        >,
    > for GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ResponseGatewayData<
            CoinbaseChargeResponse,
            GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let charge = item.response.data;
        let status = TransactionStatus::from(charge.current_status());
        let response = PaymentsResponseData::TransactionResponse {
            resource_id: ResponseId::GatewayTransactionId(charge.code.clone()),
            redirection_data: None,
            reference_id: Some(charge.id),
            gateway_metadata: None,
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
#[derive(Debug, Deserialize, Serialize)]
pub struct CoinbaseWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: CoinbaseChargeData,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoinbaseWebhookBody {
    pub event: CoinbaseWebhookEvent,
}

impl CoinbaseWebhookBody {
    pub fn event_type(&self) -> EventType {
        match self.event.event_type.as_str() {
            "charge:confirmed" | "charge:resolved" => EventType::PaymentSuccess,
            "charge:created" | "charge:pending" => EventType::PaymentProcessing,
            "charge:failed" => EventType::PaymentFailure,
            _ => EventType::Unspecified,
        }
    }

    /// Normalize a verified notification into the host-facing shape,
    /// recovering the invoice envelope from the echoed metadata.
    pub fn webhook_details(
        &self,
        status_code: u16,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        let charge = &self.event.data;
        let status = TransactionStatus::from(charge.current_status());
        let invoice_envelope = charge
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.invoice_envelope.as_deref())
            .map(InvoiceEnvelope::decode)
            .transpose()?;
        let (amount, currency) = match charge.paid_amount() {
            Some((amount, currency)) => {
                let minor = StringMajorUnitForGateway
                    .convert_back(amount, currency)
                    .change_context(GatewayError::AmountConversionFailed)?;
                (Some(minor), Some(currency))
            }
            None => (None, None),
        };
        Ok(WebhookDetailsResponse {
            resource_id: Some(ResponseId::GatewayTransactionId(charge.code.clone())),
            status,
            event_id: Some(self.event.id.clone()),
            reference_id: Some(charge.id.clone()),
            invoice_envelope,
            amount,
            currency,
            error_code: None,
            error_message: None,
            raw_body: None,
            status_code,
        })
    }
}
