use crate::error::IoError;
use configuration::PeriodSource;
use core_types::{MerchantRecord, PeriodDataset, Portfolio, RawMerchantRow};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_MERCHANT_NAME: &str = "DBA";
pub const COL_MERCHANT_ID: &str = "MID";
pub const COL_AGENT: &str = "Rep";
pub const COL_PRICING: &str = "Pricing";
pub const COL_SALES_VOLUME: &str = "Sales Volume";
pub const COL_TRANSACTION_COUNT: &str = "Transaction Count";
pub const COL_GROSS_PROFIT: &str = "Gross Profit";
pub const COL_NET_RESIDUAL: &str = "Net Residual";

/// Positions of the known columns within one file's header row.
///
/// Only `MID` is mandatory. Any other column may be absent, in which case the
/// field reads as missing and resolves to its default.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    merchant_id: usize,
    merchant_name: Option<usize>,
    agent: Option<usize>,
    pricing_model: Option<usize>,
    sales_volume: Option<usize>,
    transaction_count: Option<usize>,
    gross_profit: Option<usize>,
    net_residual: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, IoError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        Ok(Self {
            merchant_id: find(COL_MERCHANT_ID).ok_or(IoError::MissingColumn(COL_MERCHANT_ID))?,
            merchant_name: find(COL_MERCHANT_NAME),
            agent: find(COL_AGENT),
            pricing_model: find(COL_PRICING),
            sales_volume: find(COL_SALES_VOLUME),
            transaction_count: find(COL_TRANSACTION_COUNT),
            gross_profit: find(COL_GROSS_PROFIT),
            net_residual: find(COL_NET_RESIDUAL),
        })
    }

    fn raw_row(&self, row: &StringRecord) -> RawMerchantRow {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);

        RawMerchantRow {
            merchant_id: cell(Some(self.merchant_id)),
            merchant_name: cell(self.merchant_name),
            agent: cell(self.agent),
            pricing_model: cell(self.pricing_model),
            sales_volume: cell(self.sales_volume),
            transaction_count: cell(self.transaction_count),
            gross_profit: cell(self.gross_profit),
            net_residual: cell(self.net_residual),
        }
    }
}

/// Reads one header-keyed residuals export.
///
/// Headers are trimmed and quoted fields are unwrapped by the CSV parser.
/// Rows whose field count differs from the header's are skipped with a
/// warning; every other row becomes a record, with unusable numbers read as
/// zero.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<MerchantRecord>, IoError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let row = result?;
        if row.len() != headers.len() {
            skipped += 1;
            tracing::warn!(
                line = row.position().map_or(0, |p| p.line()),
                expected = headers.len(),
                found = row.len(),
                "Skipping row with mismatched field count."
            );
            continue;
        }
        records.push(MerchantRecord::from(columns.raw_row(&row)));
    }

    if skipped > 0 {
        tracing::warn!(skipped, kept = records.len(), "Some rows were skipped.");
    }
    Ok(records)
}

/// Loads one named period from a CSV file on disk.
pub fn load_period(name: &str, path: &Path) -> Result<PeriodDataset, IoError> {
    let file = File::open(path).map_err(|source| IoError::OpenError {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file)?;

    tracing::info!(period = name, path = %path.display(), records = records.len(), "Loaded period.");
    Ok(PeriodDataset::new(name, records))
}

/// Loads every configured period, in configuration order, into a `Portfolio`.
///
/// Any unreadable file fails the whole load; there is no partial portfolio.
pub fn load_portfolio(sources: &[PeriodSource]) -> Result<Portfolio, IoError> {
    let periods = sources
        .iter()
        .map(|source| load_period(&source.name, &source.path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Portfolio::new(periods)?)
}
