use core_types::aggregate::{average, percent_change, sum_field, unique_count};
use core_types::{MerchantRecord, NumericField, TextField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline figures for the selected view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub total_residual: Decimal,
    /// Distinct non-empty merchant ids.
    pub active_merchants: usize,
    pub avg_per_merchant: Decimal,
    pub total_volume: Decimal,
    /// `None` when there is no comparable previous period ("N/A"), which is
    /// different from a comparison showing zero change.
    pub comparison: Option<KpiComparison>,
}

/// Previous-period figures and the deltas against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiComparison {
    pub previous_residual: Decimal,
    pub previous_merchants: usize,
    pub previous_avg_per_merchant: Decimal,
    pub previous_volume: Decimal,
    pub residual_change_pct: Decimal,
    /// Absolute change in active merchants.
    pub merchant_change: i64,
    pub avg_change_pct: Decimal,
    pub volume_change_pct: Decimal,
}

struct Totals {
    residual: Decimal,
    merchants: usize,
    avg: Decimal,
    volume: Decimal,
}

fn totals(records: &[MerchantRecord]) -> Totals {
    let residual = sum_field(records, NumericField::NetResidual);
    let merchants = unique_count(records, TextField::MerchantId);
    Totals {
        residual,
        merchants,
        avg: average(residual, merchants),
        volume: sum_field(records, NumericField::SalesVolume),
    }
}

/// Computes the KPI bundle.
///
/// `previous` should be `None` when the period has no predecessor; an empty
/// previous slice is treated the same way.
pub fn compute_kpis(current: &[MerchantRecord], previous: Option<&[MerchantRecord]>) -> KpiReport {
    let now = totals(current);

    let comparison = previous.filter(|p| !p.is_empty()).map(|previous| {
        let before = totals(previous);
        KpiComparison {
            residual_change_pct: percent_change(now.residual, before.residual),
            merchant_change: now.merchants as i64 - before.merchants as i64,
            avg_change_pct: percent_change(now.avg, before.avg),
            volume_change_pct: percent_change(now.volume, before.volume),
            previous_residual: before.residual,
            previous_merchants: before.merchants,
            previous_avg_per_merchant: before.avg,
            previous_volume: before.volume,
        }
    });

    KpiReport {
        total_residual: now.residual,
        active_merchants: now.merchants,
        avg_per_merchant: now.avg,
        total_volume: now.volume,
        comparison,
    }
}
