//! Number formatting for the narrative insight texts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats `value` as US dollars with two decimals, e.g. `-$1,234.50`.
pub fn format_currency(value: Decimal) -> String {
    format_dollars(value, 2)
}

/// Formats `value` as whole US dollars, e.g. `$1,235`.
pub fn format_currency_whole(value: Decimal) -> String {
    format_dollars(value, 0)
}

/// Formats a percentage with one decimal, e.g. `12.5`.
pub fn format_pct(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}", rounded)
}

fn format_dollars(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let plain = format!("{:.*}", dp as usize, rounded.abs());

    let (whole, fraction) = match plain.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999)), "$999.00");
        assert_eq!(format_currency(dec!(0)), "$0.00");
    }

    #[test]
    fn negative_currency_keeps_sign_in_front() {
        assert_eq!(format_currency(dec!(-1500.5)), "-$1,500.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn whole_dollars_round_half_away_from_zero() {
        assert_eq!(format_currency_whole(dec!(162.5)), "$163");
        assert_eq!(format_currency_whole(dec!(1000)), "$1,000");
    }

    #[test]
    fn percentages_have_one_decimal() {
        assert_eq!(format_pct(dec!(12.345)), "12.3");
        assert_eq!(format_pct(dec!(-3)), "-3.0");
    }
}
