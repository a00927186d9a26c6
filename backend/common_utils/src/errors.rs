//! Errors and their custom results.

/// The shared result type, wrapping errors in an [`error_stack::Report`].
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Parsing errors for payloads crossing the wire boundary.
#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),
    #[error("Failed to serialize to {0} format")]
    EncodeError(&'static str),
    #[error("Failed to parse {0} as a url-encoded string")]
    UrlEncodedParsingFailure(&'static str),
    #[error("Failed to parse an integer from string")]
    IntegerParsingFailure,
    #[error("Failed to parse a float from string")]
    FloatParsingFailure,
    #[error("Failed to convert {amount} {currency} between amount units")]
    AmountConversionFailure {
        amount: i64,
        currency: common_enums::Currency,
    },
    #[error("Failed to parse an email address")]
    EmailParsingError,
}

/// Validation errors reported back to the caller as data, never panics.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: String },
    #[error("Incorrect value provided for field: {field_name}")]
    IncorrectValueProvided { field_name: &'static str },
    #[error("{message}")]
    InvalidValue { message: String },
}
