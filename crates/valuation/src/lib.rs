//! # Residuals Valuation
//!
//! Estimates what a residuals portfolio would sell for, expressed as a multiple
//! of one month of net residual.
//!
//! - **Layer 1 Logic:** depends only on `core-types` and `configuration`.
//! - **Stateless:** a valuator holds validated parameters and nothing else, so a
//!   single instance can value any number of views.

pub mod error;
pub mod multiple_valuator;
pub mod report;

pub use error::ValuationError;
pub use multiple_valuator::MultipleValuator;
pub use report::{AttritionAnalysis, Valuation, ValuationBreakdown, ValuationDiagnostics};

use core_types::PeriodView;

/// Common interface for portfolio valuation policies.
///
/// Implementations never fail on data: degenerate views produce zeroed
/// breakdowns, and multi-period views produce `Valuation::Unavailable`.
pub trait PortfolioValuator: Send + Sync {
    fn value(&self, view: &PeriodView) -> Valuation;
}
