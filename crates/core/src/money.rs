use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    /// Keeps every digit; rounding happens once, when formatting.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    /// Whole-unit rendering with grouping, e.g. `$4,864,294` or `CHF 1,200`.
    pub fn format_whole(self, currency: &str) -> String {
        let whole = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = whole.abs().trunc().to_string();
        let grouped = group_thousands(&digits);
        let sign = if whole.is_sign_negative() && !whole.is_zero() { "-" } else { "" };
        match currency_symbol(currency) {
            Some(symbol) => format!("{sign}{symbol}{grouped}"),
            None => format!("{sign}{} {grouped}", currency.to_uppercase()),
        }
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn format_whole_groups_thousands() {
        assert_eq!(Money::from_cents(486429400).format_whole("USD"), "$4,864,294");
        assert_eq!(Money::from_cents(99900).format_whole("usd"), "$999");
        assert_eq!(Money::from_cents(100000).format_whole("EUR"), "€1,000");
    }

    #[test]
    fn format_whole_rounds_half_away_from_zero() {
        assert_eq!(Money::from_cents(150).format_whole("USD"), "$2");
        assert_eq!(Money::from_cents(149).format_whole("USD"), "$1");
        assert_eq!(Money::from_cents(-250).format_whole("GBP"), "-£3");
    }

    #[test]
    fn format_whole_unknown_currency_uses_code() {
        assert_eq!(Money::from_cents(120000).format_whole("chf"), "CHF 1,200");
    }

    #[test]
    fn format_whole_zero_has_no_sign() {
        assert_eq!(Money::from_cents(0).format_whole("USD"), "$0");
        assert_eq!(Money::from_cents(-20).format_whole("USD"), "$0");
    }

    #[test]
    fn decimal_amounts_round_once() {
        assert_eq!(Money::from_decimal(dec("0.495")).format_whole("USD"), "$0");
        assert_eq!(Money::from_decimal(dec("2.5")).format_whole("USD"), "$3");
        assert_eq!(Money::from_decimal(dec("1250.4999")).format_whole("EUR"), "€1,250");
        assert_eq!(Money::from_decimal(dec("-0.5")).format_whole("USD"), "-$1");
    }
}
