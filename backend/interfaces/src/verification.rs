//! Webhook source verification. The secret-extraction and algorithm
//! halves live here; the webhook pipeline pulls the signature and message
//! out of the request and verifies with both. Adapters override only the
//! pieces their provider does differently.

use common_utils::{crypto, errors::CustomResult};
use domain_types::{
    errors::GatewayError,
    gateway_data::GatewayAuthType,
    gateway_types::GatewayWebhookSecrets,
};

#[derive(Clone)]
pub enum GatewaySourceVerificationSecrets {
    AuthHeaders(GatewayAuthType),
    WebhookSecret(GatewayWebhookSecrets),
    AuthWithWebhookSecret {
        auth_headers: GatewayAuthType,
        webhook_secret: GatewayWebhookSecrets,
    },
}

pub trait SourceVerification {
    /// Key material the signature was computed with. Providers signing
    /// with something other than the stored webhook secret override this.
    fn get_secrets(
        &self,
        secrets: GatewaySourceVerificationSecrets,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        match secrets {
            GatewaySourceVerificationSecrets::WebhookSecret(secret)
            | GatewaySourceVerificationSecrets::AuthWithWebhookSecret {
                webhook_secret: secret,
                ..
            } => Ok(secret.secret),
            GatewaySourceVerificationSecrets::AuthHeaders(_) => {
                Err(GatewayError::WebhookSourceVerificationFailed.into())
            }
        }
    }

    fn get_algorithm(
        &self,
    ) -> CustomResult<Box<dyn crypto::VerifySignature + Send>, GatewayError> {
        Ok(Box::new(crypto::NoAlgorithm))
    }
}
