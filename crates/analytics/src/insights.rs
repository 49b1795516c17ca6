//! Narrative insights and agent rankings for the analytics panel.

use crate::format::{format_currency, format_currency_whole, format_pct};
use configuration::AnalyticsParams;
use core_types::aggregate::{average, group_sum, percent_change, share_pct, sum_field, top_n};
use core_types::{MerchantRecord, NumericField, SortOrder, TextField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Residual growth versus the previous period, bucketed for narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrowthInsight {
    /// No comparable previous period.
    NoData,
    Strong(Decimal),
    Modest(Decimal),
    /// Zero or negative growth.
    Declining(Decimal),
}

impl GrowthInsight {
    pub fn narrative(&self) -> String {
        match self {
            GrowthInsight::NoData => "No previous period data available for growth analysis.".to_string(),
            GrowthInsight::Strong(pct) => format!(
                "Strong growth of {}% indicates healthy portfolio expansion. Continue current merchant acquisition strategy.",
                format_pct(*pct)
            ),
            GrowthInsight::Modest(pct) => format!(
                "Modest growth of {}%. Consider implementing targeted merchant development programs.",
                format_pct(*pct)
            ),
            GrowthInsight::Declining(pct) => format!(
                "Negative growth of {}%. Immediate review of merchant retention strategies recommended.",
                format_pct(*pct)
            ),
        }
    }
}

/// Merchants dragging the portfolio down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInsight {
    pub negative_count: usize,
    /// Share of records with a negative residual.
    pub negative_pct: Decimal,
    /// Absolute value of the summed negative residuals.
    pub negative_total: Decimal,
}

impl RiskInsight {
    pub fn narrative(&self) -> String {
        format!(
            "{} merchants ({}%) with negative residuals totaling {}. Review these accounts for adjustment or closure.",
            self.negative_count,
            format_pct(self.negative_pct),
            format_currency(self.negative_total)
        )
    }
}

/// How much of the book the best accounts carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityInsight {
    pub merchant_count: usize,
    pub top_total: Decimal,
    pub share_pct: Decimal,
}

impl OpportunityInsight {
    pub fn narrative(&self) -> String {
        format!(
            "Top {} merchants represent {}% of residuals. Focus on nurturing these relationships and developing similar high-value accounts.",
            self.merchant_count,
            format_pct(self.share_pct)
        )
    }
}

/// One row of the agent ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub agent: String,
    /// Rows attributed to the agent.
    pub merchants: usize,
    pub total_residual: Decimal,
    pub avg_per_merchant: Decimal,
    /// 1 to 3, from average residual per merchant.
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub text: String,
}

/// Everything shown in the analytics panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub growth: GrowthInsight,
    pub risk: RiskInsight,
    pub opportunity: OpportunityInsight,
    pub agent_performance: Vec<AgentPerformance>,
    pub recommendations: Vec<Recommendation>,
}

pub fn growth_insight(
    current: &[MerchantRecord],
    previous: Option<&[MerchantRecord]>,
    strong_growth_pct: Decimal,
) -> GrowthInsight {
    let Some(previous) = previous.filter(|p| !p.is_empty()) else {
        return GrowthInsight::NoData;
    };

    let growth = percent_change(
        sum_field(current, NumericField::NetResidual),
        sum_field(previous, NumericField::NetResidual),
    );

    if growth > strong_growth_pct {
        GrowthInsight::Strong(growth)
    } else if growth > Decimal::ZERO {
        GrowthInsight::Modest(growth)
    } else {
        GrowthInsight::Declining(growth)
    }
}

pub fn risk_insight(current: &[MerchantRecord]) -> RiskInsight {
    let negatives: Vec<MerchantRecord> = current.iter().filter(|r| r.is_negative()).cloned().collect();
    RiskInsight {
        negative_count: negatives.len(),
        negative_pct: share_pct(Decimal::from(negatives.len()), Decimal::from(current.len())),
        negative_total: sum_field(&negatives, NumericField::NetResidual).abs(),
    }
}

pub fn opportunity_insight(current: &[MerchantRecord], top: usize) -> OpportunityInsight {
    let leaders = top_n(current, NumericField::NetResidual, top, SortOrder::Descending);
    let top_total = sum_field(&leaders, NumericField::NetResidual);
    OpportunityInsight {
        merchant_count: leaders.len(),
        top_total,
        share_pct: share_pct(top_total, sum_field(current, NumericField::NetResidual)),
    }
}

/// Ranks agents by total residual, best first, keeping the first `top_agents`.
pub fn agent_performance(current: &[MerchantRecord], params: &AnalyticsParams) -> Vec<AgentPerformance> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in current {
        *counts.entry(record.agent.as_str()).or_default() += 1;
    }

    let mut ranking: Vec<AgentPerformance> = group_sum(current, TextField::Agent, NumericField::NetResidual)
        .into_iter()
        .map(|(agent, total_residual)| {
            let merchants = counts.get(agent.as_str()).copied().unwrap_or_default();
            let avg_per_merchant = average(total_residual, merchants);
            let rating = if avg_per_merchant > params.agent_top_tier {
                3
            } else if avg_per_merchant > params.agent_mid_tier {
                2
            } else {
                1
            };
            AgentPerformance {
                agent,
                merchants,
                total_residual,
                avg_per_merchant,
                rating,
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.total_residual.cmp(&a.total_residual));
    ranking.truncate(params.top_agents);
    ranking
}

/// Fixed action items, filled in with the current figures.
pub fn recommendations(risk: &RiskInsight, agents: &[AgentPerformance]) -> Vec<Recommendation> {
    let top_agent_avg = agents.first().map_or(Decimal::ZERO, |a| a.avg_per_merchant);

    vec![
        Recommendation {
            title: "Merchant Retention".to_string(),
            text: "Implement quarterly reviews with top 50 merchants to ensure satisfaction and identify growth opportunities.".to_string(),
        },
        Recommendation {
            title: "Address Negatives".to_string(),
            text: format!(
                "{} merchants need attention. Schedule review calls to resolve issues or consider account closure.",
                risk.negative_count
            ),
        },
        Recommendation {
            title: "Agent Development".to_string(),
            text: format!(
                "Top performing agents averaging {} per merchant. Share best practices across team.",
                format_currency_whole(top_agent_avg)
            ),
        },
        Recommendation {
            title: "Volume Growth".to_string(),
            text: "Focus on increasing transaction volume with existing merchants through POS system optimization and marketing support.".to_string(),
        },
    ]
}

/// Builds the full analytics panel.
pub fn compute_insights(
    current: &[MerchantRecord],
    previous: Option<&[MerchantRecord]>,
    params: &AnalyticsParams,
) -> Insights {
    let risk = risk_insight(current);
    let agent_performance = agent_performance(current, params);
    let recommendations = recommendations(&risk, &agent_performance);

    Insights {
        growth: growth_insight(current, previous, params.strong_growth_pct),
        opportunity: opportunity_insight(current, params.opportunity_top),
        risk,
        agent_performance,
        recommendations,
    }
}
