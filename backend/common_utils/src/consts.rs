//! Constants shared across the gateway layer.

/// Default error code when the provider response carries none.
pub const NO_ERROR_CODE: &str = "No error code";

/// Default error message when the provider response carries none.
pub const NO_ERROR_MESSAGE: &str = "No error message";

/// Base64 engine used everywhere a metadata channel needs armoring.
pub const BASE64_ENGINE: base64::engine::GeneralPurpose =
    base64::engine::general_purpose::STANDARD;
