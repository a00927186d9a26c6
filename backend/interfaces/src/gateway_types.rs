//! Capability traits tying the flow marker types to their payloads, and
//! the service supertrait the registry hands out.

use domain_types::{
    flow,
    gateway_types::{
        PaymentFlowData, PaymentVoidData, PaymentsAuthorizeData, PaymentsCaptureData,
        PaymentsResponseData, PaymentsSyncData, RedirectCheckoutData, RefundFlowData,
        RefundsData, RefundsResponseData,
    },
};

use crate::{
    api::GatewayCommon, gateway_integration::GatewayIntegration, webhooks::IncomingWebhook,
};

pub trait PaymentAuthorize:
    GatewayIntegration<flow::Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData>
{
}

pub trait PaymentCapture:
    GatewayIntegration<flow::Capture, PaymentFlowData, PaymentsCaptureData, PaymentsResponseData>
{
}

pub trait PaymentVoid:
    GatewayIntegration<flow::Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData>
{
}

pub trait RefundExecute:
    GatewayIntegration<flow::Refund, RefundFlowData, RefundsData, RefundsResponseData>
{
}

pub trait PaymentSync:
    GatewayIntegration<flow::PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData>
{
}

pub trait RedirectCheckout:
    GatewayIntegration<
    flow::CreateRedirect,
    PaymentFlowData,
    RedirectCheckoutData,
    PaymentsResponseData,
>
{
}

/// Everything a registered gateway exposes to the host. Flows the
/// provider lacks fall through to the `GatewayIntegration` defaults and
/// report `NotImplemented`.
pub trait GatewayServiceTrait:
    GatewayCommon
    + PaymentAuthorize
    + PaymentCapture
    + PaymentVoid
    + RefundExecute
    + PaymentSync
    + RedirectCheckout
    + IncomingWebhook
{
}

pub type BoxedGateway = Box<&'static (dyn GatewayServiceTrait + Sync)>;
