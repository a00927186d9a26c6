//! Domain types shared between the gateway adapters and their host.

pub mod errors;
pub mod flow;
pub mod gateway_data;
pub mod gateway_types;
pub mod input_fields;
pub mod invoice;
pub mod payment_method_data;
pub mod types;
