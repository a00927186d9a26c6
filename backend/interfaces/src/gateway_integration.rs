//! One flow of one gateway. Adapters implement this per flow they
//! support; every method has a default so an unsupported flow surfaces a
//! `NotImplemented` error instead of silently doing nothing.

use common_utils::{
    errors::CustomResult,
    request::{Request, RequestBuilder, RequestContent},
    Maskable, Method,
};
use domain_types::{
    errors::GatewayError,
    gateway_data::{ErrorResponse, GatewayData},
};

use crate::{api::Response, events::GatewayEvent};

pub trait GatewayIntegration<F, ResourceCommonData, Req, Resp> {
    fn get_headers(
        &self,
        req: &GatewayData<F, ResourceCommonData, Req, Resp>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        let _ = req;
        Ok(Vec::new())
    }

    fn get_content_type(&self) -> &'static str {
        "application/json"
    }

    fn get_http_method(&self) -> Method {
        Method::Post
    }

    fn get_url(
        &self,
        _req: &GatewayData<F, ResourceCommonData, Req, Resp>,
    ) -> CustomResult<String, GatewayError> {
        Err(GatewayError::NotImplemented("get_url".to_string()).into())
    }

    fn get_request_body(
        &self,
        _req: &GatewayData<F, ResourceCommonData, Req, Resp>,
    ) -> CustomResult<Option<RequestContent>, GatewayError> {
        Ok(None)
    }

    /// Assemble the outbound request. The default path goes through
    /// `get_url`, so a flow with no override propagates `NotImplemented`
    /// from here.
    fn build_request(
        &self,
        req: &GatewayData<F, ResourceCommonData, Req, Resp>,
    ) -> CustomResult<Option<Request>, GatewayError> {
        Ok(Some(
            RequestBuilder::new()
                .method(self.get_http_method())
                .url(&self.get_url(req)?)
                .headers(self.get_headers(req)?)
                .set_optional_body(self.get_request_body(req)?)
                .build(),
        ))
    }

    fn handle_response(
        &self,
        data: GatewayData<F, ResourceCommonData, Req, Resp>,
        event_builder: Option<&mut GatewayEvent>,
        res: Response,
    ) -> CustomResult<GatewayData<F, ResourceCommonData, Req, Resp>, GatewayError> {
        let (_, _, _) = (data, event_builder, res);
        Err(GatewayError::NotImplemented("handle_response".to_string()).into())
    }

    fn get_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        let _ = event_builder;
        let mut error = ErrorResponse::get_not_implemented();
        error.status_code = res.status_code;
        Ok(error)
    }
}
