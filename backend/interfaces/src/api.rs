//! Gateway-wide behavior every adapter carries regardless of flow.

use std::collections::HashMap;

use common_enums::CurrencyUnit;
use common_utils::{errors::CustomResult, Maskable, Secret};
use domain_types::{
    errors::{GatewayError, SettingsErrors},
    gateway_data::{ErrorResponse, GatewayAuthType},
    input_fields::InputFields,
    types::Gateways,
};

use crate::events::GatewayEvent;

/// Raw HTTP response handed to the adapter for interpretation.
#[derive(Clone, Debug)]
pub struct Response {
    pub response: bytes::Bytes,
    pub status_code: u16,
}

/// Behavior shared by every flow of one gateway: identity, endpoint
/// selection, credentials-to-headers mapping, error interpretation and
/// the settings surface the host renders and stores.
pub trait GatewayCommon {
    fn id(&self) -> &'static str;

    /// The unit the provider's wire format expects amounts in.
    fn get_currency_unit(&self) -> CurrencyUnit {
        CurrencyUnit::Minor
    }

    fn common_get_content_type(&self) -> &'static str {
        "application/json"
    }

    fn base_url<'a>(&self, gateways: &'a Gateways) -> &'a str;

    fn get_auth_header(
        &self,
        auth_type: &GatewayAuthType,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, GatewayError> {
        let _ = auth_type;
        Ok(Vec::new())
    }

    fn build_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut GatewayEvent>,
    ) -> CustomResult<ErrorResponse, GatewayError> {
        if let Some(event) = event_builder {
            event.set_error_response_body(&serde_json::json!({
                "status_code": res.status_code,
            }));
        }
        Ok(ErrorResponse {
            code: common_utils::consts::NO_ERROR_CODE.to_string(),
            message: common_utils::consts::NO_ERROR_MESSAGE.to_string(),
            reason: None,
            status_code: res.status_code,
            status: None,
            gateway_transaction_id: None,
        })
    }

    /// Settings keys the host must store encrypted. Adapters never
    /// encrypt themselves.
    fn encryptable_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Configuration-time validation. Problems come back as a
    /// field-keyed map, never as an error.
    fn validate_settings(&self, settings: &HashMap<String, Secret<String>>) -> SettingsErrors {
        let _ = settings;
        SettingsErrors::new()
    }

    /// The settings form the host renders for this gateway.
    fn settings_fields(&self) -> InputFields {
        InputFields::new()
    }
}
