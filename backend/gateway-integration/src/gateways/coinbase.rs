pub mod transformers;

#[cfg(test)]
mod test;

use std::collections::HashMap;

use common_enums::CurrencyUnit;
use common_utils::{
    crypto,
    errors::CustomResult,
    ext_traits::{ByteSliceExt, BytesExt},
    pii::require_non_empty,
    request::RequestContent,
    types::{AmountConvertor, StringMajorUnit, StringMajorUnitForGateway},
    ExposeInterface, Mask, Maskable, Method, Secret,
};
use domain_types::{
    errors::{GatewayError, SettingsErrors},
    flow::{Authorize, Capture, CreateRedirect, PSync, Refund, Void},
    gateway_data::{ErrorResponse, GatewayAuthType, GatewayData},
    gateway_types::{
        EventType, GatewayWebhookSecrets, PaymentFlowData, PaymentVoidData,
        PaymentsAuthorizeData, PaymentsCaptureData, PaymentsResponseData, PaymentsSyncData,
        RedirectCheckoutData, RefundFlowData, RefundsData, RefundsResponseData, RequestDetails,
        WebhookDetailsResponse,
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
    self as coinbase, CoinbaseChargeRequest, CoinbaseChargeResponse, CoinbaseErrorResponse,
    CoinbaseWebhookBody,
};

use crate::types::ResponseGatewayData;

pub(crate) mod headers {
    pub(crate) const CONTENT_TYPE: &str = "Content-Type";
    pub(crate) const X_CC_API_KEY: &str = "X-CC-Api-Key";
    pub(crate) const X_CC_VERSION: &str = "X-CC-Version";
    pub(crate) const X_CC_WEBHOOK_SIGNATURE: &str = "X-CC-Webhook-Signature";
}

const API_VERSION: &str = "2018-03-22";

pub(crate) mod settings {
    pub(crate) const API_KEY: &str = "api_key";
    pub(crate) const WEBHOOK_SECRET: &str = "webhook_secret";
}

#[derive(Clone)]
pub struct Coinbase {
    amount_converter: &'static (dyn AmountConvertor<Output = StringMajorUnit> + Sync),
}

impl Coinbase {
    pub const fn new() -> &'static Self {
        &Self {
            amount_converter: &StringMajorUnitForGateway,
        }
    }
}

impl gateway_types::GatewayServiceTrait for Coinbase {}
impl gateway_types::PaymentAuthorize for Coinbase {}
impl gateway_types::PaymentCapture for Coinbase {}
impl gateway_types::PaymentVoid for Coinbase {}
impl gateway_types::RefundExecute for Coinbase {}
impl gateway_types::PaymentSync for Coinbase {}
impl gateway_types::RedirectCheckout for Coinbase {}

impl GatewayCommon for Coinbase {
    fn id(&self) -> &'static str {
        "coinbase"
    }

    fn get_currency_unit(&self) -> CurrencyUnit {
        CurrencyUnit::Base
    }

    fn base_url<'a>(&self, gateways: &'a Gateways) -> &'a str {
        &gateways.coinbase.base_url
    }

    fn get_auth_header(
        &self,
        auth_type: &GatewayAuthType,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        let auth = coinbase::CoinbaseAuthType::try_from(auth_type)?;
        Ok(vec![
            (
                headers::CONTENT_TYPE.to_string(),
                self.common_get_content_type().to_string().into(),
            ),
            (
                headers::X_CC_API_KEY.to_string(),
                auth.api_key.into_masked(),
            ),
            (
                headers::X_CC_VERSION.to_string(),
                API_VERSION.to_string().into(),
            ),
        ])
    }

    fn build_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        let response: CoinbaseErrorResponse = res
            .response
            .parse_struct("CoinbaseErrorResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_error_response_body(&response);
        }
        Ok(ErrorResponse {
            code: response.error.error_type.clone(),
            message: response.error.message.clone(),
            reason: Some(response.error.message),
            status_code: res.status_code,
            status: None,
            gateway_transaction_id: None,
        })
    }

    fn encryptable_fields(&self) -> &'static [&'static str] {
        &[settings::API_KEY, settings::WEBHOOK_SECRET]
    }

    fn validate_settings(&self, settings: &HashMap<String, Secret<String>>) -> SettingsErrors {
        let mut errors = SettingsErrors::new();
        for field in [settings::API_KEY, settings::WEBHOOK_SECRET] {
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

        let mut api_key_label = InputField::label("api_key_label", "API Key");
        let _ = api_key_label.attach(InputField::password(settings::API_KEY));
        let _ = api_key_label.attach(InputField::tooltip(
            "Created under Settings > API keys in Coinbase Commerce",
        ));
        fields.push(api_key_label);

        let mut secret_label = InputField::label("webhook_secret_label", "Webhook Shared Secret");
        let _ = secret_label.attach(InputField::password(settings::WEBHOOK_SECRET));
        fields.push(secret_label);

        fields
    }
}

impl
    GatewayIntegration<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>
    for Coinbase
{
    fn get_headers(
        &self,
        req: &GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        self.get_auth_header(&req.auth_type)
    }

    fn get_url(
        &self,
        req: &GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        Ok(format!(
            "{}charges",
            self.base_url(&req.resource_common_data.gateways)
        ))
    }

    fn get_request_body(
        &self,
        req: &GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        let amount = self
            .amount_converter
            .convert(req.request.amount, req.request.currency)
            .change_context(GatewayError::AmountConversionFailed)?;
        let wire = CoinbaseChargeRequest::try_from(coinbase::CoinbaseRouterData {
            amount,
            router_data: req.clone(),
        })?;
        let body = serde_json::to_value(wire)
            .change_context(GatewayError::RequestEncodingFailed)?;
        Ok(Some(RequestContent::Json(body)))
    }

    fn handle_response(
        &self,
        data: GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>,
        GatewayError,
    > {
        let response: CoinbaseChargeResponse = res
            .response
            .parse_struct("CoinbaseChargeResponse")
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

impl GatewayIntegration<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>
    for Coinbase
{
    fn get_headers(
        &self,
        req: &GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        self.get_auth_header(&req.auth_type)
    }

    fn get_http_method(&self) -> Method {
        Method::Get
    }

    fn get_url(
        &self,
        req: &GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
    ) -> CustomResult<String, GatewayError> {
        let charge_code = req
            .request
            .gateway_transaction_id
            .get_gateway_transaction_id()?;
        Ok(format!(
            "{}charges/{charge_code}",
            self.base_url(&req.resource_common_data.gateways)
        ))
    }

    fn handle_response(
        &self,
        data: GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<
        GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>,
        GatewayError,
    > {
        let response: CoinbaseChargeResponse = res
            .response
            .parse_struct("CoinbaseChargeResponse")
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

// Coinbase Commerce has no merchant-side card flows; these fall through
// to the NotImplemented defaults.
impl GatewayIntegration<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>
    for Coinbase
{
}

impl GatewayIntegration<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>
    for Coinbase
{
}

impl GatewayIntegration<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>
    for Coinbase
{
}

impl GatewayIntegration<Refund, RefundFlowData, RefundsData, RefundsResponseData> for Coinbase {}

impl SourceVerification for Coinbase {
    fn get_algorithm(
        &self,
    ) -> CustomResult<Box<dyn crypto::VerifySignature + Send>, GatewayError> {
        Ok(Box::new(crypto::HmacSha256))
    }
}

impl IncomingWebhook for Coinbase {
    /// Coinbase sends a lowercase hex HMAC-SHA256 of the raw body in
    /// `X-CC-Webhook-Signature`.
    fn get_webhook_source_verification_signature(
        &self,
        request: &RequestDetails,
        _webhook_secret: &GatewayWebhookSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        let signature = request
            .get_header(headers::X_CC_WEBHOOK_SIGNATURE)
            .ok_or(GatewayError::WebhookSignatureNotFound)?;
        hex::decode(signature).change_context(GatewayError::WebhookSignatureNotFound)
    }

    fn get_event_type(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<EventType, GatewayError> {
        let body: CoinbaseWebhookBody = request
            .body
            .parse_struct("CoinbaseWebhookBody")
            .change_context(GatewayError::WebhookBodyDecodingFailed)?;
        Ok(body.event_type())
    }

    fn process_payment_webhook(
        &self,
        request: RequestDetails,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        let body: CoinbaseWebhookBody = request
            .body
            .parse_struct("CoinbaseWebhookBody")
            .change_context(GatewayError::WebhookBodyDecodingFailed)?;
        let mut details = body.webhook_details(200)?;
        details.raw_body = Some(String::from_utf8_lossy(&request.body).into_owned());
        Ok(details)
    }
}
