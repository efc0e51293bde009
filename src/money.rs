//! Dollar/cent conversions. Amounts travel as decimal dollars on forms and
//! are stored as integer cents.

use std::str::FromStr;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use rusty_money::{iso, Money};

/// Coerce a submitted amount into a number. Accepts plain and scientific
/// notation, surrounding whitespace ignored.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// `round(amount * 100)`, half away from zero. `None` when the result does
/// not fit a BIGINT column.
pub fn amount_to_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::from(100))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

pub fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// US-dollar display string for a cent amount
pub fn format_currency(cents: i64) -> String {
    Money::from_minor(cents, iso::USD).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_dollars_to_cents() {
        let cases = [("12.50", 1250), ("0.01", 1), ("100", 10000), ("19.999", 2000), ("0.005", 1)];
        for (raw, cents) in cases {
            let amount = parse_amount(raw).unwrap();
            assert_eq!(amount_to_cents(amount), Some(cents), "amount {raw}");
        }
    }

    #[test]
    fn parse_amount_coerces_like_a_number_field() {
        assert_eq!(parse_amount(" 42 "), Some(Decimal::from(42)));
        assert_eq!(parse_amount("1e3"), Some(Decimal::from(1000)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("twelve"), None);
    }

    #[test]
    fn cents_round_trip_to_dollars() {
        assert_eq!(cents_to_amount(1250).to_string(), "12.50");
    }

    #[test]
    fn overflow_is_not_a_valid_amount() {
        assert_eq!(amount_to_cents(Decimal::MAX), None);
    }

    #[test]
    fn formats_us_dollars() {
        let formatted = format_currency(125_000);
        assert!(formatted.contains("1,250.00"), "got {formatted}");
    }
}
