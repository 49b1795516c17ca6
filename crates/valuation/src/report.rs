use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of valuing one dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Valuation {
    /// The view spans several periods; only portfolio counts are reported.
    Unavailable(ValuationDiagnostics),
    /// A full valuation of a single period.
    Estimated(ValuationBreakdown),
}

impl Valuation {
    pub fn breakdown(&self) -> Option<&ValuationBreakdown> {
        match self {
            Valuation::Estimated(breakdown) => Some(breakdown),
            Valuation::Unavailable(_) => None,
        }
    }

    pub fn diagnostics(&self) -> ValuationDiagnostics {
        match self {
            Valuation::Unavailable(diagnostics) => *diagnostics,
            Valuation::Estimated(breakdown) => ValuationDiagnostics {
                active_merchants: breakdown.active_merchants,
                negative_merchants: breakdown.negative_merchants,
            },
        }
    }
}

/// Portfolio counts reported even when no valuation can be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationDiagnostics {
    /// Distinct non-empty merchant ids.
    pub active_merchants: usize,
    /// Records with a negative net residual.
    pub negative_merchants: usize,
}

/// Merchants lost between the previous and the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttritionAnalysis {
    /// Distinct merchant ids in the previous period.
    pub previous_merchants: usize,
    /// Previous ids missing from the current period.
    pub lost_merchants: usize,
    pub attrition_rate_pct: Decimal,
    pub penalty: u32,
}

/// Every intermediate value of a single-period valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationBreakdown {
    pub total_residual: Decimal,
    pub active_merchants: usize,
    pub negative_merchants: usize,
    pub avg_per_merchant: Decimal,
    pub base_multiple: u32,
    /// `None` unless the period is the latest one and has a comparable predecessor.
    pub attrition: Option<AttritionAnalysis>,
    pub attrition_penalty: u32,
    /// Share of total residual held by the top positive-residual merchants.
    pub concentration_pct: Decimal,
    /// How many merchants formed the top group.
    pub concentration_count: usize,
    pub concentration_penalty: u32,
    pub adjusted_multiple: u32,
    pub conservative_multiple: u32,
    pub premium_multiple: u32,
    pub conservative_value: Decimal,
    pub market_value: Decimal,
    pub premium_value: Decimal,
    /// Residual growth versus the previous period, when one is comparable.
    pub growth_rate_pct: Option<Decimal>,
}
