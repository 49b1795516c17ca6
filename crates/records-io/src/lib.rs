//! # Residuals Records I/O
//!
//! The file boundary of the workspace: it reads monthly residuals exports into
//! `MerchantRecord`s and writes filtered record sets back out as CSV.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All file and CSV handling lives here. The logic
//!   crates only ever see an in-memory `Portfolio`.
//! - **Lenient Rows, Strict Shape:** Malformed numbers become zero and ragged
//!   rows are skipped with a warning, but a file without a `MID` column is
//!   rejected outright.
//!
//! ## Public API
//!
//! - `read_records` / `load_period` / `load_portfolio`: ingestion.
//! - `write_csv`, `ExportLayout`, `ExportScope`: export.
//! - `IoError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod export;
pub mod reader;

// Re-export the key components to create a clean, public-facing API.
pub use error::IoError;
pub use export::{write_csv, ExportLayout, ExportScope};
pub use reader::{load_period, load_portfolio, read_records};
