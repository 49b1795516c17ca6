use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Placeholder for a missing agent or merchant name.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Converts a raw cell into a `Decimal`, resolving anything unusable to zero.
///
/// Accepts plain and scientific notation with surrounding whitespace. Empty,
/// missing or non-numeric input yields `Decimal::ZERO`; this is the single
/// numeric conversion used for every record field.
pub fn parse_lenient_decimal(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Numeric columns of a merchant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericField {
    SalesVolume,
    TransactionCount,
    GrossProfit,
    NetResidual,
}

/// Text columns of a merchant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextField {
    MerchantId,
    MerchantName,
    Agent,
    PricingModel,
}

/// One merchant row of one monthly residuals export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRecord {
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub agent: String,
    pub pricing_model: Option<String>,
    pub sales_volume: Decimal,
    pub transaction_count: Decimal,
    pub gross_profit: Decimal,
    pub net_residual: Decimal,
}

impl MerchantRecord {
    /// Creates a record with zeroed numeric fields.
    ///
    /// A blank agent is stored as [`UNKNOWN_LABEL`].
    pub fn new(merchant_id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_name: None,
            agent: normalize_agent(agent.into()),
            pricing_model: None,
            sales_volume: Decimal::ZERO,
            transaction_count: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            net_residual: Decimal::ZERO,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.merchant_name = non_blank(name.into());
        self
    }

    pub fn with_pricing(mut self, pricing: impl Into<String>) -> Self {
        self.pricing_model = non_blank(pricing.into());
        self
    }

    pub fn with_residual(mut self, residual: Decimal) -> Self {
        self.net_residual = residual;
        self
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.sales_volume = volume;
        self
    }

    pub fn with_transactions(mut self, count: Decimal) -> Self {
        self.transaction_count = count;
        self
    }

    pub fn with_gross_profit(mut self, profit: Decimal) -> Self {
        self.gross_profit = profit;
        self
    }

    pub fn numeric(&self, field: NumericField) -> Decimal {
        match field {
            NumericField::SalesVolume => self.sales_volume,
            NumericField::TransactionCount => self.transaction_count,
            NumericField::GrossProfit => self.gross_profit,
            NumericField::NetResidual => self.net_residual,
        }
    }

    /// Returns the text value of `field`, or `""` when the column is absent.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::MerchantId => &self.merchant_id,
            TextField::MerchantName => self.merchant_name.as_deref().unwrap_or(""),
            TextField::Agent => &self.agent,
            TextField::PricingModel => self.pricing_model.as_deref().unwrap_or(""),
        }
    }

    /// Name shown in tables; falls back to "Unknown".
    pub fn display_name(&self) -> &str {
        self.merchant_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn is_negative(&self) -> bool {
        self.net_residual.is_sign_negative() && !self.net_residual.is_zero()
    }
}

/// A row as it arrives from a delimited export, before numeric conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMerchantRow {
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub agent: Option<String>,
    pub pricing_model: Option<String>,
    pub sales_volume: Option<String>,
    pub transaction_count: Option<String>,
    pub gross_profit: Option<String>,
    pub net_residual: Option<String>,
}

/// Text cells are trimmed, so padding in an export never splits one merchant
/// or rep into two keys. Agent filtering then matches the trimmed value
/// verbatim.
impl From<RawMerchantRow> for MerchantRecord {
    fn from(raw: RawMerchantRow) -> Self {
        let lenient = |cell: &Option<String>| cell.as_deref().map_or(Decimal::ZERO, parse_lenient_decimal);

        Self {
            merchant_id: raw.merchant_id.map(|id| id.trim().to_string()).unwrap_or_default(),
            merchant_name: raw.merchant_name.and_then(non_blank),
            agent: normalize_agent(raw.agent.unwrap_or_default()),
            pricing_model: raw.pricing_model.and_then(non_blank),
            sales_volume: lenient(&raw.sales_volume),
            transaction_count: lenient(&raw.transaction_count),
            gross_profit: lenient(&raw.gross_profit),
            net_residual: lenient(&raw.net_residual),
        }
    }
}

fn normalize_agent(agent: String) -> String {
    non_blank(agent).unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
