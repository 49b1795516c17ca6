use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Monthly exports, oldest first.
    #[serde(default)]
    pub periods: Vec<PeriodSource>,
    #[serde(default)]
    pub valuation: ValuationParams,
    #[serde(default)]
    pub analytics: AnalyticsParams,
    #[serde(default)]
    pub logging: Logging,
}

/// One monthly residuals export on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodSource {
    /// Display name of the period (e.g., "November").
    pub name: String,
    /// Path to the CSV export, relative to the working directory.
    pub path: PathBuf,
}

/// A base-multiple bracket keyed on average residual per merchant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultipleTier {
    /// Inclusive lower bound of the average residual per merchant.
    pub min_avg_residual: Decimal,
    pub multiple: u32,
}

/// A penalty applied once a percentage crosses `threshold_pct`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PenaltyTier {
    pub threshold_pct: Decimal,
    pub penalty: u32,
}

/// Parameters of the multiple-based portfolio valuation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValuationParams {
    /// Highest bracket first.
    pub base_multiples: Vec<MultipleTier>,
    /// Multiple used below the lowest bracket.
    pub default_multiple: u32,
    /// Attrition brackets, highest first; thresholds are inclusive.
    pub attrition_penalties: Vec<PenaltyTier>,
    /// Concentration brackets, highest first; thresholds are exclusive.
    pub concentration_penalties: Vec<PenaltyTier>,
    /// Fraction of positive-residual merchants counted as the "top" group.
    /// 0.2 corresponds to the top 20%.
    pub top_share: Decimal,
    /// The adjusted multiple never drops below this value.
    pub multiple_floor: u32,
    /// Distance of the conservative and premium bands from the market multiple.
    pub band_spread: u32,
}

impl Default for ValuationParams {
    fn default() -> Self {
        Self {
            base_multiples: vec![
                MultipleTier { min_avg_residual: dec!(50000), multiple: 32 },
                MultipleTier { min_avg_residual: dec!(25000), multiple: 28 },
                MultipleTier { min_avg_residual: dec!(10000), multiple: 23 },
                MultipleTier { min_avg_residual: dec!(5000), multiple: 20 },
                MultipleTier { min_avg_residual: dec!(2000), multiple: 17 },
            ],
            default_multiple: 15,
            attrition_penalties: vec![
                PenaltyTier { threshold_pct: dec!(10), penalty: 5 },
                PenaltyTier { threshold_pct: dec!(7), penalty: 3 },
                PenaltyTier { threshold_pct: dec!(5), penalty: 2 },
                PenaltyTier { threshold_pct: dec!(3), penalty: 1 },
            ],
            concentration_penalties: vec![
                PenaltyTier { threshold_pct: dec!(60), penalty: 2 },
                PenaltyTier { threshold_pct: dec!(50), penalty: 1 },
            ],
            top_share: dec!(0.2),
            multiple_floor: 10,
            band_spread: 3,
        }
    }
}

/// Thresholds and list sizes for the dashboard analytics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsParams {
    /// Minimum absolute month-over-month change, in percent, to report a merchant.
    pub change_threshold_pct: Decimal,
    /// Rows in the top-merchants table and bar chart.
    pub top_merchants: usize,
    /// Rows in the agent performance ranking and distribution chart.
    pub top_agents: usize,
    /// Merchants counted by the opportunity insight.
    pub opportunity_top: usize,
    /// Growth above this percentage is reported as strong.
    pub strong_growth_pct: Decimal,
    /// Average residual per merchant above which an agent is rated tier 3.
    pub agent_top_tier: Decimal,
    /// Average residual per merchant above which an agent is rated tier 2.
    pub agent_mid_tier: Decimal,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            change_threshold_pct: dec!(30),
            top_merchants: 10,
            top_agents: 10,
            opportunity_top: 20,
            strong_growth_pct: dec!(5),
            agent_top_tier: dec!(150),
            agent_mid_tier: dec!(100),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
