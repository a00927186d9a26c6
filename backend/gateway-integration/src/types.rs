use domain_types::gateway_types::GatewayEnum;
use interfaces::gateway_types::BoxedGateway;

use crate::gateways;

pub struct GatewayHandle {
    pub gateway: BoxedGateway,
    pub gateway_name: GatewayEnum,
}

impl GatewayHandle {
    pub fn get_gateway_by_name(gateway_name: &GatewayEnum) -> Self {
        let gateway = Self::convert_gateway(*gateway_name);
        Self {
            gateway,
            gateway_name: *gateway_name,
        }
    }

    fn convert_gateway(gateway_name: GatewayEnum) -> BoxedGateway {
        match gateway_name {
            GatewayEnum::Converge => Box::new(gateways::Converge::new()),
            GatewayEnum::Coinbase => Box::new(gateways::Coinbase::new()),
            GatewayEnum::Squareup => Box::new(gateways::Squareup::new()),
        }
    }
}

/// Pairs a deserialized provider response with the flow data it answers,
/// so `TryFrom` conversions can consume both at once.
pub struct ResponseGatewayData<Response, GatewayData> {
    pub response: Response,
    pub gateway_data: GatewayData,
    pub http_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_every_gateway() {
        for name in [
            GatewayEnum::Converge,
            GatewayEnum::Coinbase,
            GatewayEnum::Squareup,
        ] {
            let handle = GatewayHandle::get_gateway_by_name(&name);
            assert_eq!(handle.gateway_name, name);
            assert_eq!(handle.gateway.id(), name.to_string());
        }
    }
}
