use crate::changes::ChangeDetection;
use crate::charts::SeriesPoint;
use crate::insights::Insights;
use crate::kpi::KpiReport;
use core_types::{FilterContext, MerchantRecord};
use serde::{Deserialize, Serialize};
use valuation::Valuation;

/// Everything the dashboard shows for one (period × agent) selection.
///
/// This struct is the final output of the `AnalyticsEngine` and is handed to
/// whatever renders the dashboard; it carries no formatting beyond the
/// narrative insight texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub context: FilterContext,
    pub period_name: String,

    // I. Headline figures
    pub kpis: KpiReport,

    // II. Charts
    pub residual_trend: Vec<SeriesPoint>,
    pub agent_distribution: Vec<SeriesPoint>,

    // III. Tables
    /// Best merchants by net residual, largest first.
    pub top_merchants: Vec<MerchantRecord>,
    /// Merchants with a negative residual, most negative first.
    pub negative_merchants: Vec<MerchantRecord>,
    /// Every record of the filtered view, in source order.
    pub merchants: Vec<MerchantRecord>,
    pub changes: ChangeDetection,

    // IV. Valuation and analytics
    pub valuation: Valuation,
    pub insights: Insights,
}

impl DashboardReport {
    pub fn record_count(&self) -> usize {
        self.merchants.len()
    }
}
