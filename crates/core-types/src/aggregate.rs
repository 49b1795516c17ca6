//! Reduction helpers shared by every downstream calculation.
//!
//! None of these functions can fail: empty input and zero denominators map to
//! `Decimal::ZERO`. Sums saturate at the `Decimal` bounds; a percentage that
//! overflows resolves to zero.

use crate::enums::SortOrder;
use crate::record::{MerchantRecord, NumericField, TextField};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};

/// Sum of `field` over `records`; zero for an empty slice.
pub fn sum_field(records: &[MerchantRecord], field: NumericField) -> Decimal {
    saturating_sum(records.iter().map(|r| r.numeric(field)))
}

/// Adds `values`, clamping at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

/// Number of distinct non-empty values of `field`.
pub fn unique_count(records: &[MerchantRecord], field: TextField) -> usize {
    distinct_values(records, field).len()
}

/// Distinct non-empty values of `field`.
pub fn distinct_values(records: &[MerchantRecord], field: TextField) -> HashSet<&str> {
    records
        .iter()
        .map(|r| r.text(field))
        .filter(|v| !v.is_empty())
        .collect()
}

/// `total / count`, or zero when `count` is zero.
pub fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    ratio(total, Decimal::from(count))
}

/// `numerator / denominator`, or zero when the division is undefined or overflows.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part / whole * 100`, or zero when `whole` is zero or the result overflows.
pub fn share_pct(part: Decimal, whole: Decimal) -> Decimal {
    to_percent(ratio(part, whole))
}

/// Relative change from `previous` to `current`, in percent.
///
/// The denominator is `|previous|`, so a move from -100 to -50 is +50%.
/// Returns zero when `previous` is zero or the change is not representable.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    match current.checked_sub(previous) {
        Some(delta) => to_percent(ratio(delta, previous.abs())),
        None => Decimal::ZERO,
    }
}

fn to_percent(fraction: Decimal) -> Decimal {
    fraction.checked_mul(dec!(100)).unwrap_or(Decimal::ZERO)
}

/// The first `n` records after a stable sort on `field`.
///
/// Ties keep their input order.
pub fn top_n(
    records: &[MerchantRecord],
    field: NumericField,
    n: usize,
    order: SortOrder,
) -> Vec<MerchantRecord> {
    let mut ranked: Vec<&MerchantRecord> = records.iter().collect();
    match order {
        SortOrder::Descending => ranked.sort_by(|a, b| b.numeric(field).cmp(&a.numeric(field))),
        SortOrder::Ascending => ranked.sort_by(|a, b| a.numeric(field).cmp(&b.numeric(field))),
    }
    ranked.into_iter().take(n).cloned().collect()
}

/// Per-key sums of `value_field`, keyed by `key_field`, in first-seen key order.
pub fn group_sum(
    records: &[MerchantRecord],
    key_field: TextField,
    value_field: NumericField,
) -> Vec<(String, Decimal)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Decimal)> = Vec::new();

    for record in records {
        let key = record.text(key_field);
        let value = record.numeric(value_field);
        match index.get(key) {
            Some(&slot) => groups[slot].1 = groups[slot].1.saturating_add(value),
            None => {
                index.insert(key, groups.len());
                groups.push((key.to_string(), value));
            }
        }
    }

    groups
}
