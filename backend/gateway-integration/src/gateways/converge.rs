pub mod transformers;

#[cfg(test)]
mod test;

use std::collections::HashMap;

use common_enums::CurrencyUnit;
use common_utils::{
    errors::CustomResult,
    ext_traits::BytesExt,
    pii::require_non_empty,
    request::RequestContent,
    types::{AmountConvertor, StringMajorUnit, StringMajorUnitForGateway},
    ExposeInterface, Maskable, Secret,
};
use domain_types::{
    errors::{GatewayError, SettingsErrors},
    flow::{Authorize, Capture, Refund, Void},
    gateway_data::{ErrorResponse, GatewayAuthType, GatewayData},
    gateway_types::{
        PaymentFlowData, PaymentVoidData, PaymentsAuthorizeData, PaymentsCaptureData,
        PaymentsResponseData, RefundFlowData, RefundsData, RefundsResponseData,
    },
    input_fields::{InputField, InputFields},
    types::Gateways,
};
use error_stack::ResultExt;
use interfaces::{
    api::{GatewayCommon, Response},
    events::GatewayEvent,
    gateway_integration::GatewayIntegration,
    gateway_types,
    verification::SourceVerification,
    webhooks::IncomingWebhook,
};
use transformers::{
    self as converge, handle_reference_flow_response, ConvergePaymentsRequest,
    ConvergePaymentsResponse, ConvergeTransactionType,
};

use crate::types::ResponseGatewayData;

pub(crate) mod headers {
    pub(crate) const CONTENT_TYPE: &str = "Content-Type";
}

pub(crate) mod settings {
    pub(crate) const MERCHANT_ID: &str = "merchant_id";
    pub(crate) const USER_ID: &str = "user_id";
    pub(crate) const PIN: &str = "pin";
    pub(crate) const SANDBOX: &str = "sandbox";
}

#[derive(Clone)]
pub struct Converge {
    amount_converter: &'static (dyn AmountConvertor<Output = StringMajorUnit> + Sync),
}

impl Converge {
    pub const fn new() -> &'static Self {
        &Self {
            amount_converter: &StringMajorUnitForGateway,
        }
    }

    fn build_form_body(
        &self,
        wire: &ConvergePaymentsRequest,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        Ok(Some(RequestContent::FormUrlEncoded(wire.to_form_fields()?)))
    }

    fn process_url(&self, gateways: &Gateways) -> String {
        format!("{}process.do", gateways.converge.base_url)
    }
}

impl gateway_types::GatewayServiceTrait for Converge {}
impl gateway_types::PaymentAuthorize for Converge {}
impl gateway_types::PaymentCapture for Converge {}
impl gateway_types::PaymentVoid for Converge {}
impl gateway_types::RefundExecute for Converge {}
impl gateway_types::PaymentSync for Converge {}
impl gateway_types::RedirectCheckout for Converge {}
impl SourceVerification for Converge {}
impl IncomingWebhook for Converge {}

impl GatewayCommon for Converge {
    fn id(&self) -> &'static str {
        "converge"
    }

    fn get_currency_unit(&self) -> CurrencyUnit {
        CurrencyUnit::Base
    }

    fn common_get_content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn base_url<'a>(&self, gateways: &'a Gateways) -> &'a str {
        &gateways.converge.base_url
    }

    // Credentials travel in the form body, not in headers.
    fn get_auth_header(
        &self,
        _auth_type: &GatewayAuthType,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        Ok(Vec::new())
    }

    fn build_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        let response: ConvergePaymentsResponse = res
            .response
            .parse_struct("ConvergePaymentsResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_error_response_body(&response);
        }
        Ok(ErrorResponse {
            code: common_utils::consts::NO_ERROR_CODE.to_string(),
            message: response
                .error_message
                .clone()
                .or(response.ssl_result_message.clone())
                .unwrap_or_else(|| common_utils::consts::NO_ERROR_MESSAGE.to_string()),
            reason: response.error_name.clone(),
            status_code: res.status_code,
            status: None,
            gateway_transaction_id: response.ssl_txn_id,
        })
    }

    fn encryptable_fields(&self) -> &'static [&'static str] {
        &[settings::MERCHANT_ID, settings::USER_ID, settings::PIN]
    }

    fn validate_settings(&self, settings: &HashMap<String, Secret<String>>) -> SettingsErrors {
        let mut errors = SettingsErrors::new();
        for field in [settings::MERCHANT_ID, settings::USER_ID, settings::PIN] {
            let value = settings
                .get(field)
                .map(|secret| secret.clone().expose())
                .unwrap_or_default();
            if let Err(validation) = require_non_empty(field, &value) {
                errors.add(field, validation.to_string());
            }
        }
        errors
    }

    fn settings_fields(&self) -> InputFields {
        let mut fields = InputFields::new();

        let mut merchant_label = InputField::label("merchant_id_label", "Merchant ID");
        let _ = merchant_label.attach(InputField::text(settings::MERCHANT_ID));
        let _ = merchant_label.attach(InputField::tooltip(
            "The Converge account id, found under Account Settings",
        ));
        fields.push(merchant_label);

        let mut user_label = InputField::label("user_id_label", "User ID");
        let _ = user_label.attach(InputField::text(settings::USER_ID));
        fields.push(user_label);

        let mut pin_label = InputField::label("pin_label", "PIN");
        let _ = pin_label.attach(InputField::password(settings::PIN));
        let _ = pin_label.attach(InputField::tooltip(
            "The terminal PIN generated in the Converge dashboard",
        ));
        fields.push(pin_label);

        fields.push(InputField::checkbox(settings::SANDBOX).with_label("Use demo environment"));
        fields
    }
}

impl GatewayIntegration<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>
    for Converge
{
    fn get_headers(
        &self,
        _req: &GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        Ok(vec![(
            headers::CONTENT_TYPE.to_string(),
            self.common_get_content_type().to_string().into(),
        )])
    }

    fn get_content_type(&self) -> &'static str {
        self.common_get_content_type()
    }

    fn get_url(
        &self,
        req: &GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        Ok(self.process_url(&req.resource_common_data.gateways))
    }

    fn get_request_body(
        &self,
        req: &GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        let amount = self
            .amount_converter
            .convert(req.request.amount, req.request.currency)
            .change_context(GatewayError::AmountConversionFailed)?;
        let wire = ConvergePaymentsRequest::try_from(converge::ConvergeRouterData {
            amount,
            router_data: req.clone(),
        })?;
        self.build_form_body(&wire)
    }

    fn handle_response(
        &self,
        data: GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>,
        GatewayError,
    > {
        let response: ConvergePaymentsResponse = res
            .response
            .parse_struct("ConvergePaymentsResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_response_body(&response);
        }
        let transaction_type = if data.request.auto_capture {
            ConvergeTransactionType::CcSale
        } else {
            ConvergeTransactionType::CcAuthOnly
        };
        Ok(handle_reference_flow_response(
            response,
            data,
            transaction_type,
            res.status_code,
        ))
    }

    fn get_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        self.build_error_response(res, event_builder)
    }
}

impl GatewayIntegration<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>
    for Converge
{
    fn get_headers(
        &self,
        _req: &GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        Ok(vec![(
            headers::CONTENT_TYPE.to_string(),
            self.common_get_content_type().to_string().into(),
        )])
    }

    fn get_content_type(&self) -> &'static str {
        self.common_get_content_type()
    }

    fn get_url(
        &self,
        req: &GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        Ok(self.process_url(&req.resource_common_data.gateways))
    }

    fn get_request_body(
        &self,
        req: &GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        let amount = self
            .amount_converter
            .convert(req.request.amount_to_capture, req.request.currency)
            .change_context(GatewayError::AmountConversionFailed)?;
        let wire = ConvergePaymentsRequest::try_from(converge::ConvergeRouterData {
            amount,
            router_data: req.clone(),
        })?;
        self.build_form_body(&wire)
    }

    fn handle_response(
        &self,
        data: GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>,
        GatewayError,
    > {
        let response: ConvergePaymentsResponse = res
            .response
            .parse_struct("ConvergePaymentsResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_response_body(&response);
        }
        Ok(handle_reference_flow_response(
            response,
            data,
            ConvergeTransactionType::CcComplete,
            res.status_code,
        ))
    }

    fn get_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        self.build_error_response(res, event_builder)
    }
}

impl GatewayIntegration<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>
    for Converge
{
    fn get_headers(
        &self,
        _req: &GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        Ok(vec![(
            headers::CONTENT_TYPE.to_string(),
            self.common_get_content_type().to_string().into(),
        )])
    }

    fn get_content_type(&self) -> &'static str {
        self.common_get_content_type()
    }

    fn get_url(
        &self,
        req: &GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        Ok(self.process_url(&req.resource_common_data.gateways))
    }

    fn get_request_body(
        &self,
        req: &GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        // Voids reference the original transaction; Converge ignores the
        // amount on ccvoid so zero is sent.
        let wire = ConvergePaymentsRequest::try_from(converge::ConvergeRouterData {
            amount: StringMajorUnit::new("0.00".to_string()),
            router_data: req.clone(),
        })?;
        self.build_form_body(&wire)
    }

    fn handle_response(
        &self,
        data: GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>,
        GatewayError,
    > {
        let response: ConvergePaymentsResponse = res
            .response
            .parse_struct("ConvergePaymentsResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_response_body(&response);
        }
        Ok(handle_reference_flow_response(
            response,
            data,
            ConvergeTransactionType::CcVoid,
            res.status_code,
        ))
    }

    fn get_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        self.build_error_response(res, event_builder)
    }
}

impl GatewayIntegration<Refund, RefundFlowData, RefundsData, RefundsResponseData> for Converge {
    fn get_headers(
        &self,
        _req: &GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        Ok(vec![(
            headers::CONTENT_TYPE.to_string(),
            self.common_get_content_type().to_string().into(),
        )])
    }

    fn get_content_type(&self) -> &'static str {
        self.common_get_content_type()
    }

    fn get_url(
        &self,
        req: &GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        Ok(self.process_url(&req.resource_common_data.gateways))
    }

    fn get_request_body(
        &self,
        req: &GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        let amount = self
            .amount_converter
            .convert(req.request.minor_refund_amount, req.request.currency)
            .change_context(GatewayError::AmountConversionFailed)?;
        let wire = ConvergePaymentsRequest::try_from(converge::ConvergeRouterData {
            amount,
            router_data: req.clone(),
        })?;
        self.build_form_body(&wire)
    }

    fn handle_response(
        &self,
        data: GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData>,
        GatewayError,
    > {
        let response: ConvergePaymentsResponse = res
            .response
            .parse_struct("ConvergePaymentsResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_response_body(&response);
        }
        GatewayData::try_from(ResponseGatewayData {
            response,
            gateway_data: data,
            http_code: res.status_code,
        })
    }

    fn get_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        self.build_error_response(res, event_builder)
    }
}

// Converge has no hosted checkout and no provider-signed notifications;
// both flows fall through to the NotImplemented defaults.
impl
    GatewayIntegration<
        domain_types::flow::PSync,
        PaymentFlowData,
        domain_types::gateway_types::PaymentsSyncData,
        PaymentsResponseData,
    > for Converge
{
}

impl
    GatewayIntegration<
        domain_types::flow::CreateRedirect,
        PaymentFlowData,
        domain_types::gateway_types::RedirectCheckoutData,
        PaymentsResponseData,
    > for Converge
{
}
