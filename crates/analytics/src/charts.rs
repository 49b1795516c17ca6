use core_types::aggregate::{group_sum, sum_field};
use core_types::{filter_records, AgentFilter, MerchantRecord, NumericField, Portfolio, TextField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One labelled value of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: Decimal,
}

/// Total net residual per concrete period for `agent`, oldest first.
///
/// The trend always spans every known period, whatever period is selected.
pub fn residual_trend(portfolio: &Portfolio, agent: &AgentFilter) -> Vec<SeriesPoint> {
    portfolio
        .periods()
        .iter()
        .map(|period| SeriesPoint {
            label: period.name.clone(),
            value: sum_field(&filter_records(&period.records, agent), NumericField::NetResidual),
        })
        .collect()
}

/// Summed residual per agent, largest first, limited to `limit` agents.
pub fn agent_distribution(records: &[MerchantRecord], limit: usize) -> Vec<SeriesPoint> {
    let mut totals = group_sum(records, TextField::Agent, NumericField::NetResidual);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
        .into_iter()
        .take(limit)
        .map(|(label, value)| SeriesPoint { label, value })
        .collect()
}
