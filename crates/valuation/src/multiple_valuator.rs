use crate::PortfolioValuator;
use crate::error::ValuationError;
use crate::report::{AttritionAnalysis, Valuation, ValuationBreakdown, ValuationDiagnostics};
use configuration::{PenaltyTier, ValuationParams};
use core_types::aggregate::{
    average, distinct_values, percent_change, saturating_sum, share_pct, sum_field, unique_count,
};
use core_types::{MerchantRecord, NumericField, PeriodView, TextField};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Values a period as a multiple of its monthly residual.
///
/// The multiple starts from a bracket on average residual per merchant and is
/// reduced by attrition and concentration penalties, down to a hard floor.
#[derive(Debug, Clone)]
pub struct MultipleValuator {
    params: ValuationParams,
}

impl MultipleValuator {
    /// Creates a new `MultipleValuator` with the given configuration parameters.
    pub fn new(params: ValuationParams) -> Result<Self, ValuationError> {
        // Validate that valuation parameters are logical.
        if !strictly_descending(params.base_multiples.iter().map(|t| t.min_avg_residual)) {
            return Err(ValuationError::InvalidParameters(
                "base_multiples must be ordered by descending min_avg_residual".to_string(),
            ));
        }
        if !strictly_descending(params.attrition_penalties.iter().map(|t| t.threshold_pct)) {
            return Err(ValuationError::InvalidParameters(
                "attrition_penalties must be ordered by descending threshold_pct".to_string(),
            ));
        }
        if !strictly_descending(params.concentration_penalties.iter().map(|t| t.threshold_pct)) {
            return Err(ValuationError::InvalidParameters(
                "concentration_penalties must be ordered by descending threshold_pct".to_string(),
            ));
        }
        if params.top_share <= dec!(0) || params.top_share > dec!(1) {
            return Err(ValuationError::InvalidParameters(
                "top_share must be in (0, 1]".to_string(),
            ));
        }
        if params.multiple_floor > params.default_multiple {
            return Err(ValuationError::InvalidParameters(
                "multiple_floor must not exceed default_multiple".to_string(),
            ));
        }
        if params.band_spread > params.multiple_floor {
            return Err(ValuationError::InvalidParameters(
                "band_spread must not exceed multiple_floor".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ValuationParams {
        &self.params
    }

    /// Multiple of the first bracket whose lower bound `avg_per_merchant` reaches.
    pub fn base_multiple(&self, avg_per_merchant: Decimal) -> u32 {
        self.params
            .base_multiples
            .iter()
            .find(|tier| avg_per_merchant >= tier.min_avg_residual)
            .map_or(self.params.default_multiple, |tier| tier.multiple)
    }

    /// Attrition between two periods; the penalty bracket bounds are inclusive.
    pub fn attrition(&self, previous: &[MerchantRecord], current: &[MerchantRecord]) -> AttritionAnalysis {
        let previous_ids = distinct_values(previous, TextField::MerchantId);
        let current_ids = distinct_values(current, TextField::MerchantId);
        let lost_merchants = previous_ids.difference(&current_ids).count();

        let attrition_rate_pct = if previous_ids.is_empty() {
            Decimal::ZERO
        } else {
            share_pct(Decimal::from(lost_merchants), Decimal::from(previous_ids.len()))
        };
        let penalty = first_penalty(&self.params.attrition_penalties, |threshold| {
            attrition_rate_pct >= threshold
        });

        AttritionAnalysis {
            previous_merchants: previous_ids.len(),
            lost_merchants,
            attrition_rate_pct,
            penalty,
        }
    }

    /// Share of `total_residual` held by the top slice of positive-residual records.
    ///
    /// Returns the percentage and the size of the top slice.
    pub fn concentration(&self, records: &[MerchantRecord], total_residual: Decimal) -> (Decimal, usize) {
        let mut positive: Vec<Decimal> = records
            .iter()
            .map(|r| r.net_residual)
            .filter(|residual| *residual > Decimal::ZERO)
            .collect();
        if positive.is_empty() {
            return (Decimal::ZERO, 0);
        }
        positive.sort_by(|a, b| b.cmp(a));

        let top_count = (Decimal::from(positive.len()) * self.params.top_share)
            .ceil()
            .to_usize()
            .unwrap_or(positive.len())
            .min(positive.len());
        let top_sum = saturating_sum(positive.iter().take(top_count).copied());

        (share_pct(top_sum, total_residual), top_count)
    }

    /// Concentration penalty; the bracket bounds are exclusive.
    pub fn concentration_penalty(&self, concentration_pct: Decimal) -> u32 {
        first_penalty(&self.params.concentration_penalties, |threshold| {
            concentration_pct > threshold
        })
    }

    /// `base - penalties`, never below the configured floor.
    pub fn adjusted_multiple(&self, base: u32, attrition_penalty: u32, concentration_penalty: u32) -> u32 {
        base.saturating_sub(attrition_penalty)
            .saturating_sub(concentration_penalty)
            .max(self.params.multiple_floor)
    }

    fn estimate(&self, view: &PeriodView) -> ValuationBreakdown {
        let current = &view.current;
        let total_residual = sum_field(current, NumericField::NetResidual);
        let active_merchants = unique_count(current, TextField::MerchantId);
        let avg_per_merchant = average(total_residual, active_merchants);

        // --- 1. Base multiple ---
        let base_multiple = self.base_multiple(avg_per_merchant);

        // --- 2. Attrition, looking back from the latest period only ---
        let attrition = match view.comparable_previous() {
            Some(previous) if view.is_latest => Some(self.attrition(previous, current)),
            _ => None,
        };
        let attrition_penalty = attrition.as_ref().map_or(0, |a| a.penalty);

        // --- 3. Concentration risk ---
        let (concentration_pct, concentration_count) = self.concentration(current, total_residual);
        let concentration_penalty = self.concentration_penalty(concentration_pct);

        // --- 4. Final multiple and price bands ---
        let adjusted_multiple = self.adjusted_multiple(base_multiple, attrition_penalty, concentration_penalty);
        let conservative_multiple = adjusted_multiple.saturating_sub(self.params.band_spread);
        let premium_multiple = adjusted_multiple.saturating_add(self.params.band_spread);

        let growth_rate_pct = view
            .comparable_previous()
            .map(|previous| percent_change(total_residual, sum_field(previous, NumericField::NetResidual)));

        tracing::debug!(
            period = %view.period_name,
            %avg_per_merchant,
            base_multiple,
            attrition_penalty,
            %concentration_pct,
            concentration_penalty,
            adjusted_multiple,
            "Valuation multiple derived."
        );

        ValuationBreakdown {
            total_residual,
            active_merchants,
            negative_merchants: negative_count(current),
            avg_per_merchant,
            base_multiple,
            attrition,
            attrition_penalty,
            concentration_pct,
            concentration_count,
            concentration_penalty,
            adjusted_multiple,
            conservative_multiple,
            premium_multiple,
            conservative_value: total_residual.saturating_mul(Decimal::from(conservative_multiple)),
            market_value: total_residual.saturating_mul(Decimal::from(adjusted_multiple)),
            premium_value: total_residual.saturating_mul(Decimal::from(premium_multiple)),
            growth_rate_pct,
        }
    }
}

impl PortfolioValuator for MultipleValuator {
    fn value(&self, view: &PeriodView) -> Valuation {
        if view.context.period.is_total() {
            return Valuation::Unavailable(ValuationDiagnostics {
                active_merchants: unique_count(&view.current, TextField::MerchantId),
                negative_merchants: negative_count(&view.current),
            });
        }
        Valuation::Estimated(self.estimate(view))
    }
}

fn negative_count(records: &[MerchantRecord]) -> usize {
    records.iter().filter(|r| r.is_negative()).count()
}

fn first_penalty(tiers: &[PenaltyTier], reached: impl Fn(Decimal) -> bool) -> u32 {
    tiers
        .iter()
        .find(|tier| reached(tier.threshold_pct))
        .map_or(0, |tier| tier.penalty)
}

fn strictly_descending(values: impl Iterator<Item = Decimal>) -> bool {
    let values: Vec<Decimal> = values.collect();
    values.windows(2).all(|w| w[0] > w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{FilterContext, PeriodId};

    fn valuator() -> MultipleValuator {
        MultipleValuator::new(ValuationParams::default()).unwrap()
    }

    fn record(id: &str, residual: Decimal) -> MerchantRecord {
        MerchantRecord::new(id, "Agent").with_residual(residual)
    }

    fn view(period: PeriodId, current: Vec<MerchantRecord>, previous: Option<Vec<MerchantRecord>>, is_latest: bool) -> PeriodView {
        PeriodView {
            period_name: period.to_string(),
            context: FilterContext::period(period),
            current,
            previous,
            is_latest,
        }
    }

    #[test]
    fn base_multiple_brackets_are_lower_bound_inclusive() {
        let v = valuator();
        assert_eq!(v.base_multiple(dec!(50000)), 32);
        assert_eq!(v.base_multiple(dec!(49999.99)), 28);
        assert_eq!(v.base_multiple(dec!(25000)), 28);
        assert_eq!(v.base_multiple(dec!(10000)), 23);
        assert_eq!(v.base_multiple(dec!(5000)), 20);
        assert_eq!(v.base_multiple(dec!(2000)), 17);
        assert_eq!(v.base_multiple(dec!(1999.99)), 15);
        assert_eq!(v.base_multiple(dec!(-40)), 15);
    }

    #[test]
    fn adjusted_multiple_never_drops_below_floor() {
        let v = valuator();
        assert_eq!(v.adjusted_multiple(15, 5, 2), 10);
        assert_eq!(v.adjusted_multiple(32, 5, 2), 25);
        assert_eq!(v.adjusted_multiple(17, 0, 0), 17);
    }

    #[test]
    fn concentration_at_exactly_sixty_percent_is_not_penalised_at_top_tier() {
        let v = valuator();
        let records: Vec<MerchantRecord> = [100, 100, 100, 100, 600]
            .iter()
            .enumerate()
            .map(|(i, r)| record(&format!("M{i}"), Decimal::from(*r)))
            .collect();

        let (pct, count) = v.concentration(&records, dec!(1000));

        assert_eq!(count, 1);
        assert_eq!(pct, dec!(60));
        assert_eq!(v.concentration_penalty(pct), 1);
        assert_eq!(v.concentration_penalty(dec!(60.01)), 2);
        assert_eq!(v.concentration_penalty(dec!(50)), 0);
    }

    #[test]
    fn concentration_ignores_non_positive_records() {
        let v = valuator();
        let records = vec![record("a", dec!(-500)), record("b", dec!(0))];
        assert_eq!(v.concentration(&records, dec!(-500)), (Decimal::ZERO, 0));
    }

    #[test]
    fn concentration_is_zero_when_total_is_zero() {
        let v = valuator();
        let records = vec![record("a", dec!(100)), record("b", dec!(-100))];
        assert_eq!(v.concentration(&records, Decimal::ZERO), (Decimal::ZERO, 1));
    }

    #[test]
    fn attrition_counts_distinct_lost_ids() {
        let v = valuator();
        let previous: Vec<MerchantRecord> = (0..20).map(|i| record(&format!("M{i}"), dec!(10))).collect();
        // Two lost merchants out of twenty, plus a duplicate row that must not count twice.
        let mut current: Vec<MerchantRecord> = (2..20).map(|i| record(&format!("M{i}"), dec!(10))).collect();
        current.push(record("M5", dec!(1)));

        let attrition = v.attrition(&previous, &current);

        assert_eq!(attrition.previous_merchants, 20);
        assert_eq!(attrition.lost_merchants, 2);
        assert_eq!(attrition.attrition_rate_pct, dec!(10));
        assert_eq!(attrition.penalty, 5);
    }

    #[test]
    fn attrition_penalty_brackets_are_inclusive() {
        let v = valuator();
        let previous: Vec<MerchantRecord> = (0..100).map(|i| record(&format!("M{i}"), dec!(1))).collect();
        for (lost, penalty) in [(2, 0), (3, 1), (5, 2), (7, 3), (9, 3), (10, 5)] {
            let current: Vec<MerchantRecord> = previous[lost..].to_vec();
            assert_eq!(v.attrition(&previous, &current).penalty, penalty, "lost {lost}");
        }
    }

    #[test]
    fn total_view_is_unavailable_with_diagnostics() {
        let v = valuator();
        let records = vec![record("a", dec!(10)), record("a", dec!(-5)), record("b", dec!(-1))];
        let valuation = v.value(&view(PeriodId::Total, records, None, false));

        assert_eq!(
            valuation,
            Valuation::Unavailable(ValuationDiagnostics {
                active_merchants: 2,
                negative_merchants: 2,
            })
        );
        assert!(valuation.breakdown().is_none());
    }

    #[test]
    fn earliest_period_has_no_attrition_or_growth() {
        let v = valuator();
        let records = vec![record("a", dec!(3000)), record("b", dec!(3000))];
        let valuation = v.value(&view(PeriodId::named("October"), records, None, false));
        let breakdown = valuation.breakdown().unwrap();

        assert_eq!(breakdown.avg_per_merchant, dec!(3000));
        assert_eq!(breakdown.base_multiple, 17);
        assert!(breakdown.attrition.is_none());
        assert!(breakdown.growth_rate_pct.is_none());
        // Top 20% of two records is one record holding half the residual.
        assert_eq!(breakdown.concentration_pct, dec!(50));
        assert_eq!(breakdown.concentration_penalty, 0);
        assert_eq!(breakdown.adjusted_multiple, 17);
        assert_eq!(breakdown.conservative_value, dec!(84000));
        assert_eq!(breakdown.market_value, dec!(102000));
        assert_eq!(breakdown.premium_value, dec!(120000));
    }

    #[test]
    fn attrition_only_applies_to_latest_period() {
        let v = valuator();
        let previous = vec![record("a", dec!(100)), record("b", dec!(100))];
        let current = vec![record("a", dec!(100))];

        let latest = v.value(&view(PeriodId::named("Nov"), current.clone(), Some(previous.clone()), true));
        let latest = latest.breakdown().unwrap();
        assert_eq!(latest.attrition.as_ref().map(|a| a.lost_merchants), Some(1));
        assert_eq!(latest.attrition_penalty, 5);
        assert_eq!(latest.growth_rate_pct, Some(dec!(-50)));

        let middle = v.value(&view(PeriodId::named("Nov"), current, Some(previous), false));
        let middle = middle.breakdown().unwrap();
        assert!(middle.attrition.is_none());
        assert_eq!(middle.attrition_penalty, 0);
    }

    #[test]
    fn empty_period_values_to_zero() {
        let v = valuator();
        let valuation = v.value(&view(PeriodId::named("Nov"), vec![], Some(vec![]), true));
        let breakdown = valuation.breakdown().unwrap();

        assert_eq!(breakdown.active_merchants, 0);
        assert_eq!(breakdown.avg_per_merchant, Decimal::ZERO);
        assert_eq!(breakdown.base_multiple, 15);
        assert!(breakdown.attrition.is_none());
        assert_eq!(breakdown.market_value, Decimal::ZERO);
    }

    #[test]
    fn residuals_near_decimal_max_saturate_instead_of_panicking() {
        let huge = core_types::parse_lenient_decimal("50000000000000000000000000000");
        let records = vec![record("A", huge), record("B", huge)];

        let valuation = valuator().value(&view(PeriodId::named("November"), records, None, true));
        let breakdown = valuation.breakdown().unwrap();

        assert_eq!(breakdown.total_residual, Decimal::MAX);
        assert_eq!(breakdown.base_multiple, 32);
        assert_eq!(breakdown.market_value, Decimal::MAX);
        assert_eq!(breakdown.premium_value, Decimal::MAX);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut params = ValuationParams::default();
        params.base_multiples.reverse();
        assert!(MultipleValuator::new(params).is_err());

        let mut params = ValuationParams::default();
        params.top_share = dec!(0);
        assert!(MultipleValuator::new(params).is_err());

        let mut params = ValuationParams::default();
        params.multiple_floor = 20;
        assert!(MultipleValuator::new(params).is_err());

        let mut params = ValuationParams::default();
        params.band_spread = 11;
        assert!(MultipleValuator::new(params).is_err());
    }
}
