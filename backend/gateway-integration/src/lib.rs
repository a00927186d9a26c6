//! Gateway adapters. Each adapter is one module pairing a wire codec
//! (`transformers`) with the trait implementations that drive it.

pub mod gateways;
pub mod types;
