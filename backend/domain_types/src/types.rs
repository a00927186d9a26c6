//! Host-supplied gateway endpoint configuration.

use serde::Deserialize;

/// Per-gateway endpoint parameters. The sandbox flag swaps the base url
/// for the provider's test environment where one exists.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GatewayParams {
    pub base_url: String,
    pub secondary_base_url: Option<String>,
}

/// Base-url table for every supported gateway, loaded once by the host
/// and passed read-only into each flow.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Gateways {
    pub converge: GatewayParams,
    pub coinbase: GatewayParams,
    pub squareup: GatewayParams,
}
