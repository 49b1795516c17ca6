use crate::enums::{PeriodId, TOTAL_PERIOD};
use crate::error::CoreError;
use crate::filter::{filter_records, FilterContext};
use crate::record::{MerchantRecord, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The records of one calendar period, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDataset {
    pub name: String,
    pub records: Vec<MerchantRecord>,
}

impl PeriodDataset {
    pub fn new(name: impl Into<String>, records: Vec<MerchantRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Every loaded period in chronological order, plus the derived "Total" view.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    periods: Vec<PeriodDataset>,
    total: PeriodDataset,
}

/// The filtered inputs for one dashboard computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodView {
    pub context: FilterContext,
    /// Display name of the selected period.
    pub period_name: String,
    pub current: Vec<MerchantRecord>,
    /// Predecessor period filtered by the same agent, when one exists.
    pub previous: Option<Vec<MerchantRecord>>,
    /// True when the selected period is the most recent concrete period.
    pub is_latest: bool,
}

impl PeriodView {
    /// The previous period, but only when it holds at least one record.
    pub fn comparable_previous(&self) -> Option<&[MerchantRecord]> {
        self.previous.as_deref().filter(|records| !records.is_empty())
    }
}

impl Portfolio {
    /// Creates a portfolio from periods ordered oldest first.
    ///
    /// The "Total" dataset is the plain concatenation of every period; a
    /// merchant present in several months appears once per month.
    pub fn new(periods: Vec<PeriodDataset>) -> Result<Self, CoreError> {
        if periods.is_empty() {
            return Err(CoreError::EmptyPortfolio);
        }

        let mut seen = BTreeSet::new();
        for period in &periods {
            let key = period.name.trim().to_ascii_lowercase();
            if key.is_empty() {
                return Err(CoreError::InvalidInput(
                    "period name".to_string(),
                    "must not be blank".to_string(),
                ));
            }
            if key == TOTAL_PERIOD.to_ascii_lowercase() || !seen.insert(key) {
                return Err(CoreError::DuplicatePeriod(period.name.clone()));
            }
        }

        let total = PeriodDataset::new(
            TOTAL_PERIOD,
            periods.iter().flat_map(|p| p.records.iter().cloned()).collect(),
        );

        tracing::debug!(
            periods = periods.len(),
            total_records = total.len(),
            "Portfolio assembled."
        );

        Ok(Self { periods, total })
    }

    /// The concrete periods, oldest first.
    pub fn periods(&self) -> &[PeriodDataset] {
        &self.periods
    }

    pub fn dataset(&self, period: &PeriodId) -> Result<&PeriodDataset, CoreError> {
        match period {
            PeriodId::Total => Ok(&self.total),
            PeriodId::Named(name) => self
                .position(period)
                .map(|idx| &self.periods[idx])
                .ok_or_else(|| CoreError::UnknownPeriod(name.clone())),
        }
    }

    /// The period immediately before `period`, if it has one.
    ///
    /// "Total" and the earliest period have no predecessor.
    pub fn resolve_previous_period(&self, period: &PeriodId) -> Option<&PeriodDataset> {
        match self.position(period)? {
            0 => None,
            idx => self.periods.get(idx - 1),
        }
    }

    pub fn latest(&self) -> &PeriodDataset {
        // `new` guarantees at least one period.
        &self.periods[self.periods.len() - 1]
    }

    pub fn is_latest(&self, period: &PeriodId) -> bool {
        self.position(period) == Some(self.periods.len() - 1)
    }

    /// Sorted, distinct agent names across every period.
    ///
    /// Records without a rep carry [`UNKNOWN_LABEL`] and are not listed.
    pub fn agents(&self) -> Vec<String> {
        self.periods
            .iter()
            .flat_map(|p| p.records.iter())
            .map(|r| r.agent.as_str())
            .filter(|a| *a != UNKNOWN_LABEL)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Projects the portfolio onto `context`.
    pub fn view(&self, context: &FilterContext) -> Result<PeriodView, CoreError> {
        let dataset = self.dataset(&context.period)?;
        let current = filter_records(&dataset.records, &context.agent);
        let previous = self
            .resolve_previous_period(&context.period)
            .map(|prev| filter_records(&prev.records, &context.agent));

        Ok(PeriodView {
            context: context.clone(),
            period_name: dataset.name.clone(),
            current,
            previous,
            is_latest: self.is_latest(&context.period),
        })
    }

    fn position(&self, period: &PeriodId) -> Option<usize> {
        self.periods.iter().position(|p| period.matches(&p.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AgentFilter;

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            PeriodDataset::new(
                "October",
                vec![MerchantRecord::new("A", "Ava"), MerchantRecord::new("B", "Ben")],
            ),
            PeriodDataset::new(
                "November",
                vec![MerchantRecord::new("A", "Ava"), MerchantRecord::new("C", "Cy")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn total_is_concatenation_in_chronological_order() {
        let portfolio = portfolio();
        let total = portfolio.dataset(&PeriodId::Total).unwrap();
        let ids: Vec<&str> = total.records.iter().map(|r| r.merchant_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "A", "C"]);
    }

    #[test]
    fn only_later_period_has_a_predecessor() {
        let portfolio = portfolio();
        assert!(portfolio.resolve_previous_period(&PeriodId::named("october")).is_none());
        assert!(portfolio.resolve_previous_period(&PeriodId::Total).is_none());
        let prev = portfolio.resolve_previous_period(&PeriodId::named("November")).unwrap();
        assert_eq!(prev.name, "October");
    }

    #[test]
    fn view_filters_both_periods_by_agent() {
        let portfolio = portfolio();
        let ctx = FilterContext::new(PeriodId::named("November"), AgentFilter::Agent("Ava".into()));
        let view = portfolio.view(&ctx).unwrap();

        assert_eq!(view.current.len(), 1);
        assert_eq!(view.previous.as_ref().map(Vec::len), Some(1));
        assert!(view.is_latest);
    }

    #[test]
    fn empty_previous_is_not_comparable() {
        let portfolio = portfolio();
        let ctx = FilterContext::new(PeriodId::named("November"), AgentFilter::Agent("Cy".into()));
        let view = portfolio.view(&ctx).unwrap();

        assert_eq!(view.previous.as_ref().map(Vec::len), Some(0));
        assert!(view.comparable_previous().is_none());
    }

    #[test]
    fn unknown_period_is_rejected() {
        let err = portfolio()
            .view(&FilterContext::period(PeriodId::named("December")))
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownPeriod("December".to_string()));
    }

    #[test]
    fn duplicate_and_reserved_names_are_rejected() {
        let dup = Portfolio::new(vec![
            PeriodDataset::new("May", vec![]),
            PeriodDataset::new("may", vec![]),
        ]);
        assert!(matches!(dup, Err(CoreError::DuplicatePeriod(_))));

        let reserved = Portfolio::new(vec![PeriodDataset::new("Total", vec![])]);
        assert!(matches!(reserved, Err(CoreError::DuplicatePeriod(_))));

        assert_eq!(Portfolio::new(vec![]), Err(CoreError::EmptyPortfolio));
    }

    #[test]
    fn agents_are_sorted_and_distinct() {
        assert_eq!(portfolio().agents(), vec!["Ava", "Ben", "Cy"]);
    }

    #[test]
    fn records_without_a_rep_are_not_offered_as_an_agent() {
        let portfolio = Portfolio::new(vec![PeriodDataset::new(
            "October",
            vec![MerchantRecord::new("A", "  "), MerchantRecord::new("B", "Ben")],
        )])
        .unwrap();

        assert_eq!(portfolio.periods()[0].records[0].agent, UNKNOWN_LABEL);
        assert_eq!(portfolio.agents(), vec!["Ben"]);
    }
}
