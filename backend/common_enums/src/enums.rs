/// Canonical status vocabulary every provider-specific raw status must be
/// mapped into. The host persists this value verbatim.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    /// Funds captured/settled
    Approved,
    /// Awaiting settlement or manual review
    #[default]
    Pending,
    /// Rejected by the processor or issuer
    Declined,
    /// Authorization canceled pre-settlement
    Void,
    /// Settled funds returned to the payer
    Refunded,
    /// Funds came back after settlement (e.g. an ACH return)
    Returned,
    /// Settled and matched against the provider's books
    Reconciled,
    /// Adapter, network, or protocol failure. Not a payment decision.
    Error,
}

impl TransactionStatus {
    /// Fixed total order used when an aggregate payment is made up of
    /// several underlying tenders. Lower weight is worse.
    pub const fn weight(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Declined | Self::Returned => 20,
            Self::Void => 40,
            Self::Refunded => 50,
            Self::Pending => 60,
            Self::Approved | Self::Reconciled => 80,
        }
    }

    /// Worst-case status of a multi-tender aggregate. A partially failed
    /// aggregate is never reported as fully approved. An empty iterator
    /// yields `Error`.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        statuses
            .into_iter()
            .min_by_key(|status| status.weight())
            .unwrap_or(Self::Error)
    }

    pub fn is_terminal_status(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Status of a refund attempt at the provider.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefundStatus {
    Failure,
    ManualReview,
    #[default]
    Pending,
    Success,
}

/// Whether a gateway expects amounts in the base (major) or minor unit of
/// the transaction currency.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum CurrencyUnit {
    Base,
    Minor,
}

/// The subset of ISO 4217 currencies the billing host settles in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Currency {
    AED,
    AUD,
    BHD,
    BRL,
    CAD,
    CHF,
    CLP,
    CNY,
    COP,
    CZK,
    DKK,
    EUR,
    GBP,
    HKD,
    IDR,
    ILS,
    INR,
    JOD,
    JPY,
    KRW,
    KWD,
    MXN,
    MYR,
    NOK,
    NZD,
    OMR,
    PHP,
    PLN,
    SAR,
    SEK,
    SGD,
    THB,
    TND,
    TRY,
    #[default]
    USD,
    VND,
    ZAR,
}

impl Currency {
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(self, Self::CLP | Self::JPY | Self::KRW | Self::VND)
    }

    pub fn is_three_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::BHD | Self::JOD | Self::KWD | Self::OMR | Self::TND
        )
    }

    /// ISO 4217 exponent of the currency.
    pub fn number_of_digits_after_decimal_point(self) -> u32 {
        if self.is_zero_decimal_currency() {
            0
        } else if self.is_three_decimal_currency() {
            3
        } else {
            2
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankDebit,
    Wallet,
    Crypto,
}

/// ISO 3166-1 alpha-2 country codes used in payer billing addresses.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum CountryAlpha2 {
    AE,
    AU,
    BR,
    CA,
    CH,
    CL,
    CN,
    CO,
    CZ,
    DE,
    DK,
    ES,
    FR,
    GB,
    HK,
    ID,
    IL,
    IN,
    IT,
    JP,
    KR,
    KW,
    MX,
    MY,
    NL,
    NO,
    NZ,
    OM,
    PH,
    PL,
    SA,
    SE,
    SG,
    TH,
    TR,
    #[default]
    US,
    VN,
    ZA,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_prefers_worst_case_status() {
        assert_eq!(
            TransactionStatus::aggregate([
                TransactionStatus::Approved,
                TransactionStatus::Declined
            ]),
            TransactionStatus::Declined
        );
        assert_eq!(
            TransactionStatus::aggregate([
                TransactionStatus::Approved,
                TransactionStatus::Pending
            ]),
            TransactionStatus::Pending
        );
        assert_eq!(
            TransactionStatus::aggregate([
                TransactionStatus::Approved,
                TransactionStatus::Approved
            ]),
            TransactionStatus::Approved
        );
    }

    #[test]
    fn aggregate_of_nothing_is_error() {
        assert_eq!(
            TransactionStatus::aggregate(std::iter::empty()),
            TransactionStatus::Error
        );
    }

    #[test]
    fn weight_order_matches_the_reconciliation_table() {
        let ordered = [
            TransactionStatus::Error,
            TransactionStatus::Declined,
            TransactionStatus::Void,
            TransactionStatus::Pending,
            TransactionStatus::Approved,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].weight() < pair[1].weight());
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Refunded).unwrap(),
            "\"refunded\""
        );
    }

    #[test]
    fn currency_exponents() {
        assert_eq!(Currency::JPY.number_of_digits_after_decimal_point(), 0);
        assert_eq!(Currency::USD.number_of_digits_after_decimal_point(), 2);
        assert_eq!(Currency::BHD.number_of_digits_after_decimal_point(), 3);
    }
}
