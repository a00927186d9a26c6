//! The uniform boundary between the host and every gateway adapter.

pub mod api;
pub mod events;
pub mod gateway_integration;
pub mod gateway_types;
pub mod verification;
pub mod webhooks;
