//! Invoice references and their trip through a provider's free-text
//! metadata channel.
//!
//! Most providers expose only one or two free-text fields, so the list of
//! (invoice id, amount) pairs a payment is allocated to must be packed
//! into a single string when the payer leaves for the provider and
//! reconstructed exactly when the notification comes back. The envelope
//! codec is a versioned base64 JSON blob; the delimited codec covers
//! records written by the previous generation of adapters, and decoding
//! falls back to it so in-flight payments survive a migration.
//!
//! No codec validates that the invoice amounts sum to the payment amount;
//! mismatches pass through untouched.

use base64::Engine;
use common_utils::{consts::BASE64_ENGINE, errors::CustomResult, types::MinorUnit};
use error_stack::{report, ResultExt};
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;

/// How a single payment is allocated across one outstanding invoice.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct InvoiceRef {
    pub invoice_id: String,
    pub amount: MinorUnit,
}

impl InvoiceRef {
    pub fn new(invoice_id: impl Into<String>, amount: MinorUnit) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            amount,
        }
    }
}

/// Versioned envelope carried through the provider metadata channel.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct InvoiceEnvelope {
    #[serde(rename = "v")]
    pub version: u8,
    pub client_id: Option<String>,
    pub invoices: Vec<InvoiceRef>,
}

pub const ENVELOPE_VERSION: u8 = 1;

impl InvoiceEnvelope {
    pub fn new(client_id: Option<String>, invoices: Vec<InvoiceRef>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            client_id,
            invoices,
        }
    }

    /// Serialize into a single base64 string safe for any free-text field.
    pub fn encode(&self) -> CustomResult<String, GatewayError> {
        let json = serde_json::to_string(self)
            .change_context(GatewayError::RequestEncodingFailed)?;
        Ok(BASE64_ENGINE.encode(json))
    }

    /// Reconstruct an envelope from the metadata channel. Falls back to
    /// the legacy `id=amount` delimited scheme (pipe-separated, plain or
    /// base64-wrapped) when the payload predates the envelope format.
    pub fn decode(raw: &str) -> CustomResult<Self, GatewayError> {
        if let Some(envelope) = Self::decode_envelope(raw) {
            return Ok(envelope);
        }
        let invoices = DelimitedScheme::pipe_delimited()
            .deserialize(raw)
            .or_else(|_| DelimitedScheme::base64_pipe_delimited().deserialize(raw))?;
        Ok(Self::new(None, invoices))
    }

    fn decode_envelope(raw: &str) -> Option<Self> {
        let decoded = BASE64_ENGINE.decode(raw).ok()?;
        serde_json::from_slice(&decoded).ok()
    }
}

/// The legacy packing: `id=amount` pairs joined by a delimiter, optionally
/// base64-wrapped for providers whose channel forbids the delimiter
/// characters. `serialize(deserialize(x)) == x` holds for each scheme.
#[derive(Clone, Copy, Debug)]
pub struct DelimitedScheme {
    pub pair_separator: char,
    pub kv_separator: char,
    pub base64_wrapped: bool,
}

impl DelimitedScheme {
    pub const fn pipe_delimited() -> Self {
        Self {
            pair_separator: '|',
            kv_separator: '=',
            base64_wrapped: false,
        }
    }

    pub const fn base64_pipe_delimited() -> Self {
        Self {
            pair_separator: '|',
            kv_separator: '=',
            base64_wrapped: true,
        }
    }

    pub fn serialize(&self, invoices: &[InvoiceRef]) -> String {
        let packed = invoices
            .iter()
            .map(|invoice| {
                format!(
                    "{}{}{}",
                    invoice.invoice_id,
                    self.kv_separator,
                    invoice.amount.get_amount_as_i64()
                )
            })
            .collect::<Vec<_>>()
            .join(&self.pair_separator.to_string());
        if self.base64_wrapped {
            BASE64_ENGINE.encode(packed)
        } else {
            packed
        }
    }

    pub fn deserialize(&self, raw: &str) -> CustomResult<Vec<InvoiceRef>, GatewayError> {
        let unwrapped = if self.base64_wrapped {
            let bytes = BASE64_ENGINE
                .decode(raw)
                .change_context(GatewayError::InvoiceReferenceDecodingFailed)?;
            String::from_utf8(bytes)
                .change_context(GatewayError::InvoiceReferenceDecodingFailed)?
        } else {
            raw.to_string()
        };

        if unwrapped.is_empty() {
            return Ok(Vec::new());
        }

        unwrapped
            .split(self.pair_separator)
            .map(|pair| {
                let (id, amount) = pair
                    .split_once(self.kv_separator)
                    .ok_or(report!(GatewayError::InvoiceReferenceDecodingFailed))?;
                let amount = amount
                    .parse::<i64>()
                    .change_context(GatewayError::InvoiceReferenceDecodingFailed)?;
                if id.is_empty() {
                    return Err(report!(GatewayError::InvoiceReferenceDecodingFailed));
                }
                Ok(InvoiceRef::new(id, MinorUnit::new(amount)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_invoices() -> Vec<InvoiceRef> {
        vec![
            InvoiceRef::new("42", MinorUnit::new(6000)),
            InvoiceRef::new("43", MinorUnit::new(4000)),
        ]
    }

    #[test]
    fn envelope_round_trip_preserves_order_ids_and_amounts() {
        let envelope = InvoiceEnvelope::new(Some("client-7".to_string()), two_invoices());
        let encoded = envelope.encode().unwrap();
        let decoded = InvoiceEnvelope::decode(&encoded).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn envelope_decode_falls_back_to_legacy_pipe_scheme() {
        let decoded = InvoiceEnvelope::decode("42=6000|43=4000").unwrap();
        assert_eq!(decoded.invoices, two_invoices());
        assert_eq!(decoded.client_id, None);
    }

    #[test]
    fn delimited_round_trip_for_each_scheme() {
        for scheme in [
            DelimitedScheme::pipe_delimited(),
            DelimitedScheme::base64_pipe_delimited(),
        ] {
            let invoices = two_invoices();
            let packed = scheme.serialize(&invoices);
            let unpacked = scheme.deserialize(&packed).unwrap();
            assert_eq!(unpacked, invoices);
            // serialize(deserialize(x)) == x for the adapter's own scheme
            assert_eq!(scheme.serialize(&unpacked), packed);
        }
    }

    #[test]
    fn envelope_decode_falls_back_to_base64_wrapped_legacy_records() {
        let packed = DelimitedScheme::base64_pipe_delimited().serialize(&two_invoices());
        let decoded = InvoiceEnvelope::decode(&packed).unwrap();
        assert_eq!(decoded.invoices, two_invoices());
        assert_eq!(decoded.client_id, None);
    }

    #[test]
    fn delimited_handles_credit_amounts() {
        let scheme = DelimitedScheme::pipe_delimited();
        let parsed = scheme.deserialize("42=-500").unwrap();
        assert_eq!(parsed, vec![InvoiceRef::new("42", MinorUnit::new(-500))]);
    }

    #[test]
    fn delimited_empty_list() {
        let scheme = DelimitedScheme::pipe_delimited();
        assert_eq!(scheme.serialize(&[]), "");
        assert_eq!(scheme.deserialize("").unwrap(), Vec::new());
    }

    #[test]
    fn delimited_rejects_malformed_pairs() {
        let scheme = DelimitedScheme::pipe_delimited();
        assert!(scheme.deserialize("42|43=4000").is_err());
        assert!(scheme.deserialize("=4000").is_err());
        assert!(scheme.deserialize("42=notanumber").is_err());
    }

    #[test]
    fn amount_mismatch_is_not_validated() {
        // Invoice amounts exceeding the payment amount pass through
        // untouched; the host decides what to do with them.
        let envelope = InvoiceEnvelope::new(
            None,
            vec![InvoiceRef::new("9", MinorUnit::new(999_999))],
        );
        let decoded = InvoiceEnvelope::decode(&envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded.invoices[0].amount, MinorUnit::new(999_999));
    }
}
