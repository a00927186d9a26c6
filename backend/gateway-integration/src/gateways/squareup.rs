pub mod transformers;


use std::collections::HashMap;

use base64::Engine;
use common_enums::CurrencyUnit;
use common_utils::{
    consts::BASE64_ENGINE,
    crypto,
    errors::CustomResult,
    ext_traits::{ByteSliceExt, BytesExt},
    pii::require_non_empty,
    request::RequestContent,
    types::{AmountConvertor, MinorUnit, MinorUnitForGateway},
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
    self as squareup, SquareupErrorResponse, SquareupOrderResponse, SquareupPaymentLinkRequest,
    SquareupPaymentLinkResponse, SquareupWebhookBody,
};

use crate::types::ResponseGatewayData;

pub(crate) mod headers {
    pub(crate) const AUTHORIZATION: &str = "Authorization";
    pub(crate) const CONTENT_TYPE: &str = "Content-Type";
    pub(crate) const SQUARE_SIGNATURE: &str = "x-square-hmacsha256-signature";
}

pub(crate) mod settings {
    pub(crate) const ACCESS_TOKEN: &str = "access_token";
    pub(crate) const LOCATION_ID: &str = "location_id";
    pub(crate) const WEBHOOK_SIGNATURE_KEY: &str = "webhook_signature_key";
    pub(crate) const SANDBOX: &str = "sandbox";
}

#[derive(Clone)]
pub struct Squareup {
    amount_converter: &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
}

impl Squareup {
    pub const fn new() -> &'static Self {
        &Self {
            amount_converter: &MinorUnitForGateway,
        }
    }
}

impl gateway_types::GatewayServiceTrait for Squareup {}
impl gateway_types::PaymentAuthorize for Squareup {}
impl gateway_types::PaymentCapture for Squareup {}
impl gateway_types::PaymentVoid for Squareup {}
impl gateway_types::RefundExecute for Squareup {}
impl gateway_types::PaymentSync for Squareup {}
impl gateway_types::RedirectCheckout for Squareup {}

impl GatewayCommon for Squareup {
    fn id(&self) -> &'static str {
        "squareup"
    }

    fn get_currency_unit(&self) -> CurrencyUnit {
        CurrencyUnit::Minor
    }

    fn base_url<'a>(&self, gateways: &'a Gateways) -> &'a str {
        &gateways.squareup.base_url
    }

    fn get_auth_header(
        &self,
        auth_type: &GatewayAuthType,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        let auth = squareup::SquareupAuthType::try_from(auth_type)?;
        Ok(vec![
            (
                headers::CONTENT_TYPE.to_string(),
                self.common_get_content_type().to_string().into(),
            ),
            (
                headers::AUTHORIZATION.to_string(),
                format!("Bearer {}", auth.access_token.expose()).into_masked(),
            ),
        ])
    }

    fn build_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        let response: SquareupErrorResponse = res
            .response
            .parse_struct("SquareupErrorResponse")
            .change_context(GatewayError::ResponseDeserializationFailed)?;
        if let Some(event) = event_builder {
            event.set_error_response_body(&response);
        }
        let (code, message) = response.first_error();
        Ok(ErrorResponse {
            code,
            message: message.clone(),
            reason: Some(message),
            status_code: res.status_code,
            status: None,
            gateway_transaction_id: None,
        })
    }

    fn encryptable_fields(&self) -> &'static [&'static str] {
        &[settings::ACCESS_TOKEN, settings::WEBHOOK_SIGNATURE_KEY]
    }

    fn validate_settings(&self, settings: &HashMap<String, Secret<String>>) -> SettingsErrors {
        let mut errors = SettingsErrors::new();
        for field in [
            settings::ACCESS_TOKEN,
            settings::LOCATION_ID,
            settings::WEBHOOK_SIGNATURE_KEY,
        ] {
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

        let mut token_label = InputField::label("access_token_label", "Access Token");
        let _ = token_label.attach(InputField::password(settings::ACCESS_TOKEN));
        let _ = token_label.attach(InputField::tooltip(
            "Personal access token from the Square developer dashboard",
        ));
        fields.push(token_label);

        let mut location_label = InputField::label("location_id_label", "Location ID");
        let _ = location_label.attach(InputField::text(settings::LOCATION_ID));
        fields.push(location_label);

        let mut signature_label =
            InputField::label("webhook_signature_key_label", "Webhook Signature Key");
        let _ = signature_label.attach(InputField::password(settings::WEBHOOK_SIGNATURE_KEY));
        let _ = signature_label.attach(InputField::tooltip(
            "Shown once per webhook subscription; notifications are rejected without it",
        ));
        fields.push(signature_label);

        fields.push(InputField::checkbox(settings::SANDBOX).with_label("Use sandbox environment"));

        fields
    }
}

impl
    GatewayIntegration<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>
    for Squareup
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
            "{}v2/online-checkout/payment-links",
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
        let wire = SquareupPaymentLinkRequest::try_from(squareup::SquareupRouterData {
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
        let response: SquareupPaymentLinkResponse = res
            .response
            .parse_struct("SquareupPaymentLinkResponse")
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
    for Squareup
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
        let order_id = req
            .request
            .gateway_transaction_id
            .get_gateway_transaction_id()?;
        Ok(format!(
            "{}v2/orders/{order_id}",
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
        let response: SquareupOrderResponse = res
            .response
            .parse_struct("SquareupOrderResponse")
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

// Hosted checkout only; the merchant-side card flows fall through to the
// NotImplemented defaults.
impl GatewayIntegration<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>
    for Squareup
{
}

impl GatewayIntegration<Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>
    for Squareup
{
}

impl GatewayIntegration<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>
    for Squareup
{
}

impl GatewayIntegration<Refund, RefundFlowData, RefundsData, RefundsResponseData> for Squareup {}

impl SourceVerification for Squareup {
    fn get_algorithm(
        &self,
    ) -> CustomResult<Box<dyn crypto::VerifySignature + Send>, GatewayError> {
        Ok(Box::new(crypto::HmacSha256))
    }
}

impl IncomingWebhook for Squareup {
    /// Square signs `notification_url + body` with the subscription's
    /// signature key and sends the base64 HMAC-SHA256 in
    /// `x-square-hmacsha256-signature`.
    fn get_webhook_source_verification_signature(
        &self,
        request: &RequestDetails,
        _webhook_secret: &GatewayWebhookSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        let signature = request
            .get_header(headers::SQUARE_SIGNATURE)
            .ok_or(GatewayError::WebhookSignatureNotFound)?;
        BASE64_ENGINE
            .decode(signature)
            .change_context(GatewayError::WebhookSignatureNotFound)
    }

    fn get_webhook_source_verification_message(
        &self,
        request: &RequestDetails,
        webhook_secret: &GatewayWebhookSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        let notification_url = webhook_secret
            .additional_secret
            .clone()
            .ok_or(GatewayError::WebhookSourceVerificationFailed)?
            .expose();
        let mut message = notification_url.into_bytes();
        message.extend_from_slice(&request.body);
        Ok(message)
    }

    fn get_event_type(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<EventType, GatewayError> {
        let body: SquareupWebhookBody = request
            .body
            .parse_struct("SquareupWebhookBody")
            .change_context(GatewayError::WebhookBodyDecodingFailed)?;
        Ok(body.event_type())
    }

    fn process_payment_webhook(
        &self,
        request: RequestDetails,
    ) -> CustomResult<WebhookDetailsResponse, GatewayError> {
        let body: SquareupWebhookBody = request
            .body
            .parse_struct("SquareupWebhookBody")
            .change_context(GatewayError::WebhookBodyDecodingFailed)?;
        let mut details = body.webhook_details(200)?;
        details.raw_body = Some(String::from_utf8_lossy(&request.body).into_owned());
        Ok(details)
    }
}
