use common_enums::RefundStatus;
use common_utils::{
    consts::{NO_ERROR_CODE, NO_ERROR_MESSAGE},
    errors::CustomResult,
    types::StringMajorUnit,
    Secret,
};
use domain_types::{
    errors::GatewayError,
    flow::{Authorize, Capture, Refund, Void},
    gateway_data::{ErrorResponse, GatewayAuthType, GatewayData},
    gateway_types::{
        PaymentFlowData, PaymentVoidData, PaymentsAuthorizeData, PaymentsCaptureData,
        PaymentsResponseData, RefundFlowData, RefundsData, RefundsResponseData, ResponseId,
    },
    invoice::DelimitedScheme,
    payment_method_data::{CardNumber, PaymentMethodData},
};
use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::types::ResponseGatewayData;

/// Flow data plus the amount already converted to Converge's wire unit.
pub struct ConvergeRouterData<T> {
    pub amount: StringMajorUnit,
    pub router_data: T,
}

// Auth
pub struct ConvergeAuthType {
    pub(super) merchant_id: Secret<String>,
    pub(super) user_id: Secret<String>,
    pub(super) pin: Secret<String>,
}

impl TryFrom<&GatewayAuthType> for ConvergeAuthType {
    type Error = error_stack::Report<GatewayError>;
    fn try_from(auth_type: &GatewayAuthType) -> Result<Self, Self::Error> {
        match auth_type {
            GatewayAuthType::SignatureKey {
                api_key,
                key1,
                api_secret,
            } => Ok(Self {
                merchant_id: api_key.to_owned(),
                user_id: key1.to_owned(),
                pin: api_secret.to_owned(),
            }),
            _ => Err(GatewayError::FailedToObtainAuthType.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergeTransactionType {
    CcSale,
    CcAuthOnly,
    CcComplete,
    CcVoid,
    CcReturn,
}

/// The scheme Converge records pack invoice refs with; the description
/// channel allows the pipe character.
pub const CONVERGE_INVOICE_SCHEME: DelimitedScheme = DelimitedScheme::pipe_delimited();

// Requests
#[derive(Debug, Serialize)]
pub struct ConvergePaymentsRequest {
    pub ssl_transaction_type: ConvergeTransactionType,
    pub ssl_merchant_id: Secret<String>,
    pub ssl_user_id: Secret<String>,
    pub ssl_pin: Secret<String>,
    pub ssl_amount: StringMajorUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_card_number: Option<CardNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_exp_date: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cvv2cvc2: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_first_name: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_txn_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_description: Option<String>,
    pub ssl_result_format: &'static str,
}

impl ConvergePaymentsRequest {
    fn base(auth: ConvergeAuthType, transaction_type: ConvergeTransactionType, amount: StringMajorUnit) -> Self {
        Self {
            ssl_transaction_type: transaction_type,
            ssl_merchant_id: auth.merchant_id,
            ssl_user_id: auth.user_id,
            ssl_pin: auth.pin,
            ssl_amount: amount,
            ssl_card_number: None,
            ssl_exp_date: None,
            ssl_cvv2cvc2: None,
            ssl_first_name: None,
            ssl_txn_id: None,
            ssl_invoice_number: None,
            ssl_description: None,
            ssl_result_format: "JSON",
        }
    }

    /// Flatten into the form pairs Converge's endpoint expects.
    pub fn to_form_fields(&self) -> CustomResult<Vec<(String, String)>, GatewayError> {
        let value = serde_json::to_value(self)
            .change_context(GatewayError::RequestEncodingFailed)?;
        let object = value
            .as_object()
            .ok_or(GatewayError::RequestEncodingFailed)?;
        object
            .iter()
            .map(|(key, entry)| {
                let rendered = match entry {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Ok((key.clone(), rendered))
            })
            .collect()
    }
}

impl
    TryFrom<
        ConvergeRouterData<
            GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
        >,
    > for ConvergePaymentsRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ConvergeRouterData<
            GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let auth = ConvergeAuthType::try_from(&item.router_data.auth_type)?;
        let request = &item.router_data.request;
        let transaction_type = if request.auto_capture {
            ConvergeTransactionType::CcSale
        } else {
            ConvergeTransactionType::CcAuthOnly
        };
        let card = match &request.payment_method_data {
            PaymentMethodData::Card(card) => card,
            PaymentMethodData::BankDebit(_) => {
                return Err(GatewayError::NotImplemented(
                    "Bank debit payments for converge".to_string(),
                )
                .into())
            }
        };
        let mut wire = Self::base(auth, transaction_type, item.amount);
        wire.ssl_card_number = Some(card.card_number.clone());
        wire.ssl_exp_date = Some(card.expiry_mmyy());
        wire.ssl_cvv2cvc2 = Some(card.card_cvc.clone());
        wire.ssl_first_name = card.card_holder_name.clone();
        wire.ssl_invoice_number = request
            .invoice_refs
            .first()
            .map(|invoice| invoice.invoice_id.clone());
        if !request.invoice_refs.is_empty() {
            wire.ssl_description = Some(CONVERGE_INVOICE_SCHEME.serialize(&request.invoice_refs));
        }
        Ok(wire)
    }
}

impl
    TryFrom<
        ConvergeRouterData<
            GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
        >,
    > for ConvergePaymentsRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ConvergeRouterData<
            GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let auth = ConvergeAuthType::try_from(&item.router_data.auth_type)?;
        let mut wire = Self::base(auth, ConvergeTransactionType::CcComplete, item.amount);
        wire.ssl_txn_id = Some(item.router_data.request.gateway_transaction_id.clone());
        Ok(wire)
    }
}

impl
    TryFrom<
        ConvergeRouterData<
            GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
        >,
    > for ConvergePaymentsRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ConvergeRouterData<
            GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let auth = ConvergeAuthType::try_from(&item.router_data.auth_type)?;
        let mut wire = Self::base(auth, ConvergeTransactionType::CcVoid, item.amount);
        wire.ssl_txn_id = Some(item.router_data.request.gateway_transaction_id.clone());
        Ok(wire)
    }
}

impl
    TryFrom<
        ConvergeRouterData<GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>>,
    > for ConvergePaymentsRequest
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ConvergeRouterData<
            GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let auth = ConvergeAuthType::try_from(&item.router_data.auth_type)?;
        let mut wire = Self::base(auth, ConvergeTransactionType::CcReturn, item.amount);
        wire.ssl_txn_id = Some(item.router_data.request.gateway_transaction_id.clone());
        Ok(wire)
    }
}

// Responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvergePaymentsResponse {
    pub ssl_result: Option<String>,
    pub ssl_result_message: Option<String>,
    pub ssl_txn_id: Option<String>,
    pub ssl_approval_code: Option<String>,
    pub ssl_amount: Option<String>,
    pub ssl_invoice_number: Option<String>,
    #[serde(rename = "errorCode")]
    pub error_code: Option<serde_json::Value>,
    #[serde(rename = "errorName")]
    pub error_name: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl ConvergePaymentsResponse {
    /// Converge reports success as `ssl_result == "0"`; anything else,
    /// including the errorCode shape, is a decline or protocol error.
    pub fn is_approved(&self) -> bool {
        self.ssl_result.as_deref() == Some("0") && self.error_code.is_none()
    }

    /// The errorCode shape is a protocol or configuration failure, not a
    /// payment decision; only a non-zero `ssl_result` is a decline.
    pub fn failed_status(&self) -> common_enums::TransactionStatus {
        if self.error_code.is_some() {
            common_enums::TransactionStatus::Error
        } else {
            common_enums::TransactionStatus::Declined
        }
    }

    fn error_response(&self, status_code: u16) -> ErrorResponse {
        ErrorResponse {
            code: self
                .error_code
                .as_ref()
                .map(render_error_code)
                .unwrap_or_else(|| NO_ERROR_CODE.to_string()),
            message: self
                .error_message
                .clone()
                .or_else(|| self.ssl_result_message.clone())
                .unwrap_or_else(|| NO_ERROR_MESSAGE.to_string()),
            reason: self.error_name.clone(),
            status_code,
            status: Some(self.failed_status()),
            gateway_transaction_id: self.ssl_txn_id.clone(),
        }
    }
}

// Converge's JSON emits errorCode both as number and string.
fn render_error_code(code: &serde_json::Value) -> String {
    match code {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Status on the success path depends on which operation ran. Voids
/// report `Void` and returns report `Refunded`, never `Approved`.
pub(super) fn approved_status(
    transaction_type: ConvergeTransactionType,
) -> common_enums::TransactionStatus {
    match transaction_type {
        ConvergeTransactionType::CcSale | ConvergeTransactionType::CcComplete => {
            common_enums::TransactionStatus::Approved
        }
        ConvergeTransactionType::CcAuthOnly => common_enums::TransactionStatus::Pending,
        ConvergeTransactionType::CcVoid => common_enums::TransactionStatus::Void,
        ConvergeTransactionType::CcReturn => common_enums::TransactionStatus::Refunded,
    }
}

fn payment_response(
    response: &ConvergePaymentsResponse,
    http_code: u16,
) -> PaymentsResponseData {
    PaymentsResponseData::TransactionResponse {
        resource_id: response
            .ssl_txn_id
            .clone()
            .map(ResponseId::GatewayTransactionId)
            .unwrap_or_default(),
        redirection_data: None,
        reference_id: response.ssl_approval_code.clone(),
        gateway_metadata: None,
        status_code: http_code,
    }
}

/// Payment flows share the response shape; the status rewrite on success
/// differs by transaction type.
pub(super) fn handle_reference_flow_response<F, Req>(
    response: ConvergePaymentsResponse,
    router_data: GatewayData<F, PaymentFlowData, Req, PaymentsResponseData>,
    transaction_type: ConvergeTransactionType,
    http_code: u16,
) -> GatewayData<F, PaymentFlowData, Req, PaymentsResponseData> {
    let (status, flow_response) = if response.is_approved() {
        (
            approved_status(transaction_type),
            Ok(payment_response(&response, http_code)),
        )
    } else {
        (
            response.failed_status(),
            Err(response.error_response(http_code)),
        )
    };
    router_data
        .update_resource_common_data(|mut common| {
            common.status = status;
            common
        })
        .set_response(flow_response)
}

impl<F>
    TryFrom<
        ResponseGatewayData<
            ConvergePaymentsResponse,
            GatewayData<F, RefundFlowData, RefundsData, RefundsResponseData>,
        >,
    > for GatewayData<F, RefundFlowData, RefundsData, RefundsResponseData>
{
    type Error = error_stack::Report<GatewayError>;
    fn try_from(
        item: ResponseGatewayData<
            ConvergePaymentsResponse,
            GatewayData<F, RefundFlowData, RefundsData, RefundsResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let router_data = item.gateway_data;
        if item.response.is_approved() {
            let refund_id = item
                .response
                .ssl_txn_id
                .clone()
                .ok_or(GatewayError::MissingGatewayTransactionId)?;
            Ok(router_data
                .update_resource_common_data(|mut common| {
                    common.status = RefundStatus::Success;
                    common.refund_id = Some(refund_id.clone());
                    common
                })
                .set_response(Ok(RefundsResponseData {
                    gateway_refund_id: refund_id,
                    refund_status: RefundStatus::Success,
                    status_code: item.http_code,
                })))
        } else {
            let error = item.response.error_response(item.http_code);
            Ok(router_data
                .update_resource_common_data(|mut common| {
                    common.status = RefundStatus::Failure;
                    common
                })
                .set_response(Err(error)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_and_authonly_pick_the_right_transaction_type() {
        assert_eq!(
            approved_status(ConvergeTransactionType::CcSale),
            common_enums::TransactionStatus::Approved
        );
        assert_eq!(
            approved_status(ConvergeTransactionType::CcAuthOnly),
            common_enums::TransactionStatus::Pending
        );
    }

    #[test]
    fn void_and_return_never_report_approved() {
        assert_eq!(
            approved_status(ConvergeTransactionType::CcVoid),
            common_enums::TransactionStatus::Void
        );
        assert_eq!(
            approved_status(ConvergeTransactionType::CcReturn),
            common_enums::TransactionStatus::Refunded
        );
    }

    #[test]
    fn error_code_renders_from_number_or_string() {
        assert_eq!(
            render_error_code(&serde_json::json!(4025)),
            "4025".to_string()
        );
        assert_eq!(
            render_error_code(&serde_json::json!("4025")),
            "4025".to_string()
        );
    }

    #[test]
    fn success_requires_result_zero_and_no_error() {
        let approved: ConvergePaymentsResponse =
            serde_json::from_str(r#"{"ssl_result":"0","ssl_txn_id":"txn_1"}"#).unwrap();
        assert!(approved.is_approved());

        let declined: ConvergePaymentsResponse =
            serde_json::from_str(r#"{"ssl_result":"1","ssl_result_message":"DECLINED"}"#).unwrap();
        assert!(!declined.is_approved());

        let errored: ConvergePaymentsResponse =
            serde_json::from_str(r#"{"errorCode":4025,"errorMessage":"Invalid Credentials"}"#)
                .unwrap();
        assert!(!errored.is_approved());
        let error = errored.error_response(200);
        assert_eq!(error.code, "4025");
    }

    #[test]
    fn credential_errors_are_not_declines() {
        let errored: ConvergePaymentsResponse = serde_json::from_str(
            r#"{"errorCode":4025,"errorName":"Invalid Credentials","errorMessage":"The credentials supplied in the authorization request are invalid"}"#,
        )
        .unwrap();
        assert_eq!(
            errored.failed_status(),
            common_enums::TransactionStatus::Error
        );
        assert_eq!(
            errored.error_response(200).status,
            Some(common_enums::TransactionStatus::Error)
        );

        let declined: ConvergePaymentsResponse =
            serde_json::from_str(r#"{"ssl_result":"1","ssl_result_message":"DECLINED"}"#).unwrap();
        assert_eq!(
            declined.error_response(200).status,
            Some(common_enums::TransactionStatus::Declined)
        );
    }
}
