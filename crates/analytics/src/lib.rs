//! # Residuals Analytics Engine
//!
//! This crate turns a portfolio selection into everything the dashboard shows:
//! KPIs, chart series, tables, month-over-month changes, the valuation and the
//! narrative insights.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files
//!   or terminals. It depends on `core-types`, `valuation` and `configuration`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes an immutable
//!   `Portfolio` and a `FilterContext` and produces a fresh `DashboardReport`.
//!   Changing the selection means calling it again.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: orchestrates the individual calculations.
//! - `DashboardReport`: the standardized output.
//! - `compute_kpis`, `detect_changes`, `compute_insights`: the individual engines.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod changes;
pub mod charts;
pub mod engine;
pub mod error;
pub mod format;
pub mod insights;
pub mod kpi;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use changes::{detect_changes, ChangeDetection, MerchantChange};
pub use charts::SeriesPoint;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use insights::{compute_insights, AgentPerformance, GrowthInsight, Insights, Recommendation};
pub use kpi::{compute_kpis, KpiComparison, KpiReport};
pub use report::DashboardReport;
