use crate::error::IoError;
use core_types::MerchantRecord;
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Column set of an exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportLayout {
    /// Merchant, MID, Agent, Pricing, Volume, Transactions, Net Residual.
    #[default]
    Standard,
    /// The standard columns plus Gross Profit before Net Residual.
    Detailed,
}

impl ExportLayout {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            ExportLayout::Standard => &[
                "Merchant",
                "MID",
                "Agent",
                "Pricing",
                "Volume",
                "Transactions",
                "Net Residual",
            ],
            ExportLayout::Detailed => &[
                "Merchant",
                "MID",
                "Agent",
                "Pricing",
                "Volume",
                "Transactions",
                "Gross Profit",
                "Net Residual",
            ],
        }
    }
}

/// Which records of a view end up in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportScope {
    #[default]
    All,
    NegativeOnly,
}

impl ExportScope {
    pub fn select(self, records: &[MerchantRecord]) -> Vec<&MerchantRecord> {
        match self {
            ExportScope::All => records.iter().collect(),
            ExportScope::NegativeOnly => records.iter().filter(|r| r.is_negative()).collect(),
        }
    }

    /// Short label used in default export file names.
    pub fn label(self) -> &'static str {
        match self {
            ExportScope::All => "all",
            ExportScope::NegativeOnly => "negative",
        }
    }
}

#[derive(Serialize)]
struct StandardRow<'a> {
    merchant: &'a str,
    mid: &'a str,
    agent: &'a str,
    pricing: &'a str,
    volume: Decimal,
    transactions: Decimal,
    net_residual: Decimal,
}

#[derive(Serialize)]
struct DetailedRow<'a> {
    merchant: &'a str,
    mid: &'a str,
    agent: &'a str,
    pricing: &'a str,
    volume: Decimal,
    transactions: Decimal,
    gross_profit: Decimal,
    net_residual: Decimal,
}

/// Writes `records` as CSV in the given layout and returns the row count.
///
/// The header row is always written, so an empty selection still produces a
/// valid file.
pub fn write_csv<'a, W, I>(records: I, layout: ExportLayout, writer: W) -> Result<usize, IoError>
where
    W: Write,
    I: IntoIterator<Item = &'a MerchantRecord>,
{
    let mut wrt = WriterBuilder::new().has_headers(false).from_writer(writer);
    wrt.write_record(layout.headers())?;

    let mut rows = 0usize;
    for r in records {
        let merchant = r.merchant_name.as_deref().unwrap_or("");
        let pricing = r.pricing_model.as_deref().unwrap_or("");
        match layout {
            ExportLayout::Standard => wrt.serialize(StandardRow {
                merchant,
                mid: &r.merchant_id,
                agent: &r.agent,
                pricing,
                volume: r.sales_volume,
                transactions: r.transaction_count,
                net_residual: r.net_residual,
            })?,
            ExportLayout::Detailed => wrt.serialize(DetailedRow {
                merchant,
                mid: &r.merchant_id,
                agent: &r.agent,
                pricing,
                volume: r.sales_volume,
                transactions: r.transaction_count,
                gross_profit: r.gross_profit,
                net_residual: r.net_residual,
            })?,
        }
        rows += 1;
    }
    wrt.flush()?;

    tracing::debug!(rows, ?layout, "CSV export written.");
    Ok(rows)
}
