//! # Residuals Core Types
//!
//! Layer 0 of the workspace: the merchant record model, the (period × agent)
//! filter, the portfolio of monthly datasets and the aggregation primitives
//! every engine builds on. Nothing in here performs I/O.

pub mod aggregate;
pub mod enums;
pub mod error;
pub mod filter;
pub mod portfolio;
pub mod record;

// Re-export the core types to provide a clean public API.
pub use enums::{AgentFilter, PeriodId, SortOrder, ALL_AGENTS, TOTAL_PERIOD};
pub use error::CoreError;
pub use filter::{filter_records, FilterContext};
pub use portfolio::{PeriodDataset, PeriodView, Portfolio};
pub use record::{
    parse_lenient_decimal, MerchantRecord, NumericField, RawMerchantRow, TextField, UNKNOWN_LABEL,
};
