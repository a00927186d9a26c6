//! Personal Identifiable Information protection.

use std::{fmt, ops, str::FromStr};

use error_stack::report;
use serde::Deserialize;

use crate::{
    errors::{self, ValidationError},
    masking::{Secret, Strategy, WithType},
};

/// A string constant representing a redacted or masked value.
pub const REDACTED: &str = "Redacted";

/// Type alias for serde_json value which has secret information.
pub type SecretSerdeValue = Secret<serde_json::Value>;

/// Strategy for masking email addresses: the local part is starred out.
#[derive(Debug, Copy, Clone, Deserialize)]
pub enum EmailStrategy {}

impl<T> Strategy<T> for EmailStrategy
where
    T: AsRef<str> + fmt::Debug,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val_str: &str = val.as_ref();
        match val_str.split_once('@') {
            Some((a, b)) => write!(f, "{}@{}", "*".repeat(a.len()), b),
            None => WithType::fmt(val, f),
        }
    }
}

/// Email address.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(try_from = "String")]
pub struct Email(Secret<String, EmailStrategy>);

impl Email {
    pub fn into_inner(self) -> Secret<String, EmailStrategy> {
        self.0
    }
}

impl TryFrom<String> for Email {
    type Error = error_stack::Report<errors::ParsingError>;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl FromStr for Email {
    type Err = error_stack::Report<errors::ParsingError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                Ok(Self(Secret::new(value.to_string())))
            }
            _ => Err(report!(errors::ParsingError::EmailParsingError)),
        }
    }
}

impl ops::Deref for Email {
    type Target = Secret<String, EmailStrategy>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Strategy for masking card numbers: first six and last four digits kept.
#[derive(Debug, Copy, Clone)]
pub enum CardNumberStrategy {}

impl<T> Strategy<T> for CardNumberStrategy
where
    T: AsRef<str>,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val_str = val.as_ref();
        if val_str.len() < 15 || val_str.len() > 19 {
            return write!(f, "{REDACTED}");
        }
        write!(
            f,
            "{}{}{}",
            &val_str[..6],
            "*".repeat(val_str.len() - 10),
            &val_str[val_str.len() - 4..]
        )
    }
}

/// Key fragments that mark a settings field as a credential the host must
/// store encrypted and the event log must never show in cleartext.
pub const SENSITIVE_KEY_FRAGMENTS: [&str; 10] = [
    "card_number",
    "account_number",
    "routing_number",
    "cvv",
    "cvc",
    "api_key",
    "secret",
    "password",
    "pin",
    "token",
];

fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}

/// Whether a settings key names a credential (used to assert that adapters
/// declare their encryptable fields).
pub fn is_secret_field_name(key: &str) -> bool {
    is_sensitive_key(key)
}

/// Redact known-sensitive fields of an already-serialized payload in
/// place. Applied to every request/response body before it is written to
/// the exchange log. Card-number-like values keep their last four digits.
pub fn mask_sensitive_values(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *entry = masked_replacement(key, entry);
                } else {
                    mask_sensitive_values(entry);
                }
            }
        }
        serde_json::Value::Array(entries) => {
            for entry in entries.iter_mut() {
                mask_sensitive_values(entry);
            }
        }
        _ => {}
    }
}

fn masked_replacement(key: &str, entry: &serde_json::Value) -> serde_json::Value {
    let keep_last_four = key.to_ascii_lowercase().contains("number");
    match entry {
        serde_json::Value::String(s) if keep_last_four && s.len() > 4 => {
            serde_json::Value::String(format!(
                "{}{}",
                "*".repeat(s.len() - 4),
                &s[s.len() - 4..]
            ))
        }
        _ => serde_json::Value::String(REDACTED.to_string()),
    }
}

/// Validate that a client-supplied value is not empty once trimmed.
pub fn require_non_empty(
    field_name: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingRequiredField {
            field_name: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}
