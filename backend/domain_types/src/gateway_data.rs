//! The generic data container threaded through every gateway flow, plus
//! the authentication credential shapes.

use std::marker::PhantomData;

use common_enums::TransactionStatus;
use common_utils::{
    consts::{NO_ERROR_CODE, NO_ERROR_MESSAGE},
    ExposeInterface, Secret,
};

pub type Error = error_stack::Report<crate::errors::GatewayError>;

/// Carries one flow invocation end to end: common flow context, the
/// credentials, the flow-specific request, and the normalized response.
#[derive(Debug, Clone)]
pub struct GatewayData<Flow, ResourceCommonData, FlowSpecificRequest, FlowSpecificResponse> {
    pub flow: PhantomData<Flow>,
    pub resource_common_data: ResourceCommonData,
    pub auth_type: GatewayAuthType,
    /// Flow-specific data required to construct a provider request.
    pub request: FlowSpecificRequest,
    /// Flow-specific data the provider responds with.
    pub response: Result<FlowSpecificResponse, ErrorResponse>,
}

impl<Flow, ResourceCommonData, FlowSpecificRequest, FlowSpecificResponse>
    GatewayData<Flow, ResourceCommonData, FlowSpecificRequest, FlowSpecificResponse>
{
    pub fn set_response(
        mut self,
        response: Result<FlowSpecificResponse, ErrorResponse>,
    ) -> Self {
        self.response = response;
        self
    }

    pub fn update_resource_common_data<F>(mut self, updater: F) -> Self
    where
        F: FnOnce(ResourceCommonData) -> ResourceCommonData,
    {
        self.resource_common_data = updater(self.resource_common_data);
        self
    }
}

/// Credential shapes a gateway can be configured with. The host stores the
/// encryptable fields encrypted and hands them over at call time; they are
/// immutable for the lifetime of one request.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(tag = "auth_type")]
pub enum GatewayAuthType {
    HeaderKey {
        api_key: Secret<String>,
    },
    BodyKey {
        api_key: Secret<String>,
        key1: Secret<String>,
    },
    SignatureKey {
        api_key: Secret<String>,
        key1: Secret<String>,
        api_secret: Secret<String>,
    },
    #[default]
    NoKey,
}

impl GatewayAuthType {
    // Show only the first and last two characters, mask the middle.
    // Keys of four characters or fewer are masked entirely.
    fn mask_key(&self, key: String) -> Secret<String> {
        let key_len = key.len();
        let masked_key = if key_len <= 4 {
            "*".repeat(key_len)
        } else {
            key.chars()
                .enumerate()
                .map(|(index, character)| {
                    if index < 2 || index >= key_len - 2 {
                        character
                    } else {
                        '*'
                    }
                })
                .collect()
        };
        Secret::new(masked_key)
    }

    /// Masked rendition for display surfaces (settings review pages).
    pub fn get_masked_keys(&self) -> Self {
        match self {
            Self::NoKey => Self::NoKey,
            Self::HeaderKey { api_key } => Self::HeaderKey {
                api_key: self.mask_key(api_key.clone().expose()),
            },
            Self::BodyKey { api_key, key1 } => Self::BodyKey {
                api_key: self.mask_key(api_key.clone().expose()),
                key1: self.mask_key(key1.clone().expose()),
            },
            Self::SignatureKey {
                api_key,
                key1,
                api_secret,
            } => Self::SignatureKey {
                api_key: self.mask_key(api_key.clone().expose()),
                key1: self.mask_key(key1.clone().expose()),
                api_secret: self.mask_key(api_secret.clone().expose()),
            },
        }
    }
}

/// Normalized provider failure. A declined payment is a response with
/// declined status, not an `ErrorResponse`; this shape covers protocol and
/// provider errors.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub reason: Option<String>,
    pub status_code: u16,
    pub status: Option<TransactionStatus>,
    pub gateway_transaction_id: Option<String>,
}

impl ErrorResponse {
    pub fn get_not_implemented() -> Self {
        Self {
            code: NO_ERROR_CODE.to_string(),
            message: NO_ERROR_MESSAGE.to_string(),
            reason: Some("This operation is not supported by the gateway".to_string()),
            status_code: http_code::NOT_IMPLEMENTED,
            status: Some(TransactionStatus::Error),
            gateway_transaction_id: None,
        }
    }
}

mod http_code {
    pub const NOT_IMPLEMENTED: u16 = 501;
}
