use crate::changes::detect_changes;
use crate::charts::{agent_distribution, residual_trend};
use crate::error::AnalyticsError;
use crate::insights::compute_insights;
use crate::kpi::compute_kpis;
use crate::report::DashboardReport;
use configuration::{AnalyticsParams, Config};
use core_types::aggregate::top_n;
use core_types::{FilterContext, MerchantRecord, NumericField, Portfolio, SortOrder};
use valuation::{MultipleValuator, PortfolioValuator, Valuation};

/// A stateless calculator that turns a portfolio selection into a dashboard.
///
/// Every call recomputes from the immutable `Portfolio`; nothing is cached
/// between selections.
pub struct AnalyticsEngine {
    params: AnalyticsParams,
    valuator: Box<dyn PortfolioValuator>,
}

impl AnalyticsEngine {
    pub fn new(params: AnalyticsParams, valuator: Box<dyn PortfolioValuator>) -> Self {
        Self { params, valuator }
    }

    /// Builds an engine with the multiple-based valuator from `config`.
    pub fn from_config(config: &Config) -> Result<Self, AnalyticsError> {
        let valuator = MultipleValuator::new(config.valuation.clone())?;
        Ok(Self::new(config.analytics.clone(), Box::new(valuator)))
    }

    pub fn params(&self) -> &AnalyticsParams {
        &self.params
    }

    /// The main entry point for calculating the dashboard.
    ///
    /// # Arguments
    ///
    /// * `portfolio` - Every loaded period.
    /// * `context` - The selected period and agent.
    ///
    /// # Returns
    ///
    /// The `DashboardReport`, or an `AnalyticsError` if the selected period
    /// does not exist.
    pub fn calculate(
        &self,
        portfolio: &Portfolio,
        context: &FilterContext,
    ) -> Result<DashboardReport, AnalyticsError> {
        let view = portfolio.view(context)?;
        let current = &view.current;
        let previous = view.comparable_previous();

        tracing::debug!(
            period = %view.period_name,
            agent = %context.agent,
            records = current.len(),
            previous_records = previous.map_or(0, <[MerchantRecord]>::len),
            "Calculating dashboard."
        );

        let negatives: Vec<MerchantRecord> = current.iter().filter(|r| r.is_negative()).cloned().collect();

        let report = DashboardReport {
            context: context.clone(),
            period_name: view.period_name.clone(),
            kpis: compute_kpis(current, previous),
            residual_trend: residual_trend(portfolio, &context.agent),
            agent_distribution: agent_distribution(current, self.params.top_agents),
            top_merchants: top_n(current, NumericField::NetResidual, self.params.top_merchants, SortOrder::Descending),
            negative_merchants: top_n(&negatives, NumericField::NetResidual, negatives.len(), SortOrder::Ascending),
            changes: detect_changes(current, previous, self.params.change_threshold_pct),
            valuation: self.valuator.value(&view),
            insights: compute_insights(current, previous, &self.params),
            merchants: view.current.clone(),
        };

        tracing::info!(
            period = %report.period_name,
            agent = %context.agent,
            total_residual = %report.kpis.total_residual,
            merchants = report.kpis.active_merchants,
            "Dashboard calculated."
        );

        Ok(report)
    }

    /// Values the selected view without building the rest of the dashboard.
    pub fn value(&self, portfolio: &Portfolio, context: &FilterContext) -> Result<Valuation, AnalyticsError> {
        let view = portfolio.view(context)?;
        Ok(self.valuator.value(&view))
    }
}
