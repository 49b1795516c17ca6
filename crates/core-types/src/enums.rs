use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Label of the synthetic period that concatenates every known period.
pub const TOTAL_PERIOD: &str = "Total";

/// Selector value meaning "no agent filter".
pub const ALL_AGENTS: &str = "all";

/// Direction used when ranking records by a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Identifies which dataset a view is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodId {
    /// One concrete monthly period, matched case-insensitively by name.
    Named(String),
    /// Concatenation of every known period.
    Total,
}

impl PeriodId {
    pub fn named(name: impl Into<String>) -> Self {
        PeriodId::Named(name.into())
    }

    pub fn is_total(&self) -> bool {
        matches!(self, PeriodId::Total)
    }

    /// Returns true if this id refers to the period called `name`.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            PeriodId::Named(own) => own.eq_ignore_ascii_case(name),
            PeriodId::Total => false,
        }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodId::Named(name) => f.write_str(name),
            PeriodId::Total => f.write_str(TOTAL_PERIOD),
        }
    }
}

impl FromStr for PeriodId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(TOTAL_PERIOD) {
            Ok(PeriodId::Total)
        } else {
            Ok(PeriodId::Named(s.to_string()))
        }
    }
}

/// Agent dimension of the dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentFilter {
    All,
    /// Matches records whose agent equals this string verbatim.
    Agent(String),
}

impl AgentFilter {
    pub fn accepts(&self, agent: &str) -> bool {
        match self {
            AgentFilter::All => true,
            AgentFilter::Agent(selected) => selected == agent,
        }
    }
}

impl fmt::Display for AgentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentFilter::All => f.write_str(ALL_AGENTS),
            AgentFilter::Agent(name) => f.write_str(name),
        }
    }
}

impl FromStr for AgentFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_AGENTS {
            Ok(AgentFilter::All)
        } else {
            Ok(AgentFilter::Agent(s.to_string()))
        }
    }
}
