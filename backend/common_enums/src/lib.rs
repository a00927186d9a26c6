//! Canonical enums for the gateway integration layer.

pub mod enums;

pub use enums::*;
