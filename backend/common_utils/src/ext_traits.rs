//! Extension traits for parsing and encoding wire payloads.

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};
use crate::masking::{PeekInterface, Secret, Strategy};

/// Deserialize a typed struct out of a response body.
pub trait BytesExt {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>;
}

impl BytesExt for bytes::Bytes {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>,
    {
        serde_json::from_slice::<T>(self)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| {
                format!("Unable to parse {type_name} from the response body")
            })
    }
}

pub trait ByteSliceExt {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>;
}

impl ByteSliceExt for [u8] {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>,
    {
        serde_json::from_slice(self).change_context(ParsingError::StructParseFailure(type_name))
    }
}

/// Deserialize a typed value out of a `serde_json::Value`.
pub trait ValueExt {
    fn parse_value<T>(self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::de::DeserializeOwned;
}

impl ValueExt for serde_json::Value {
    fn parse_value<T>(self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self).change_context(ParsingError::StructParseFailure(type_name))
    }
}

impl<S: Strategy<serde_json::Value>> ValueExt for Secret<serde_json::Value, S> {
    fn parse_value<T>(self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.peek().clone().parse_value(type_name)
    }
}

pub trait OptionExt<T> {
    fn get_required_value(
        self,
        field_name: &'static str,
    ) -> CustomResult<T, crate::errors::ValidationError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn get_required_value(
        self,
        field_name: &'static str,
    ) -> CustomResult<T, crate::errors::ValidationError> {
        self.ok_or_else(|| {
            error_stack::report!(crate::errors::ValidationError::MissingRequiredField {
                field_name: field_name.to_string(),
            })
        })
    }
}

/// Encode a serializable value into the formats gateways exchange.
pub trait Encode {
    fn encode_to_string_of_json(&self) -> CustomResult<String, ParsingError>;
    fn encode_to_value(&self) -> CustomResult<serde_json::Value, ParsingError>;
}

impl<T: Serialize> Encode for T {
    fn encode_to_string_of_json(&self) -> CustomResult<String, ParsingError> {
        serde_json::to_string(self).change_context(ParsingError::EncodeError("json"))
    }

    fn encode_to_value(&self) -> CustomResult<serde_json::Value, ParsingError> {
        serde_json::to_value(self).change_context(ParsingError::EncodeError("json-value"))
    }
}
