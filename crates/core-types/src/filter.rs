use crate::enums::{AgentFilter, PeriodId};
use crate::record::MerchantRecord;
use serde::{Deserialize, Serialize};

/// The (period × agent) selection that every dashboard calculation runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterContext {
    pub period: PeriodId,
    pub agent: AgentFilter,
}

impl FilterContext {
    pub fn new(period: PeriodId, agent: AgentFilter) -> Self {
        Self { period, agent }
    }

    /// All agents over the given period.
    pub fn period(period: PeriodId) -> Self {
        Self::new(period, AgentFilter::All)
    }
}

/// Records accepted by `agent`, in input order.
pub fn filter_records(dataset: &[MerchantRecord], agent: &AgentFilter) -> Vec<MerchantRecord> {
    dataset
        .iter()
        .filter(|r| agent.accepts(&r.agent))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Vec<MerchantRecord> {
        vec![
            MerchantRecord::new("1", "Ava"),
            MerchantRecord::new("2", "Ben"),
            MerchantRecord::new("3", "Ava"),
            MerchantRecord::new("4", "ava"),
        ]
    }

    #[test]
    fn all_agents_returns_every_record_in_order() {
        let records = dataset();
        assert_eq!(filter_records(&records, &AgentFilter::All), records);
    }

    #[test]
    fn agent_match_is_verbatim() {
        let filtered = filter_records(&dataset(), &AgentFilter::Agent("Ava".to_string()));
        let ids: Vec<&str> = filtered.iter().map(|r| r.merchant_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn unknown_agent_yields_empty_view() {
        let filtered = filter_records(&dataset(), &AgentFilter::Agent("Zoe".to_string()));
        assert!(filtered.is_empty());
    }
}
