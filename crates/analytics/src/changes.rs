use core_types::aggregate::percent_change;
use core_types::MerchantRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A merchant whose residual swung by at least the reporting threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantChange {
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub agent: String,
    pub previous_residual: Decimal,
    pub current_residual: Decimal,
    pub percent_change: Decimal,
}

/// Outcome of the month-over-month comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeDetection {
    /// No comparable previous period.
    Unavailable,
    /// Changes ordered by descending magnitude.
    Detected(Vec<MerchantChange>),
}

impl ChangeDetection {
    pub fn changes(&self) -> &[MerchantChange] {
        match self {
            ChangeDetection::Unavailable => &[],
            ChangeDetection::Detected(changes) => changes,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ChangeDetection::Detected(_))
    }
}

/// Lists merchants present in both periods whose residual moved by at least
/// `threshold_pct` percent.
///
/// Merchants new in `current`, or with a zero previous residual, are not
/// reported. When an id repeats in `previous`, its last row is the baseline.
pub fn detect_changes(
    current: &[MerchantRecord],
    previous: Option<&[MerchantRecord]>,
    threshold_pct: Decimal,
) -> ChangeDetection {
    let Some(previous) = previous.filter(|p| !p.is_empty()) else {
        return ChangeDetection::Unavailable;
    };

    let baseline: HashMap<&str, Decimal> = previous
        .iter()
        .map(|r| (r.merchant_id.as_str(), r.net_residual))
        .collect();

    let mut changes: Vec<MerchantChange> = current
        .iter()
        .filter_map(|record| {
            let previous_residual = *baseline.get(record.merchant_id.as_str())?;
            if previous_residual.is_zero() {
                return None;
            }
            let pct = percent_change(record.net_residual, previous_residual);
            (pct.abs() >= threshold_pct).then(|| MerchantChange {
                merchant_id: record.merchant_id.clone(),
                merchant_name: record.merchant_name.clone(),
                agent: record.agent.clone(),
                previous_residual,
                current_residual: record.net_residual,
                percent_change: pct,
            })
        })
        .collect();

    changes.sort_by(|a, b| b.percent_change.abs().cmp(&a.percent_change.abs()));

    tracing::debug!(
        compared = current.len(),
        flagged = changes.len(),
        %threshold_pct,
        "Month-over-month changes detected."
    );

    ChangeDetection::Detected(changes)
}
