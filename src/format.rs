//! Display formatting for KPI values. Undefined input always renders as `-`.

use num_format::{Locale, ToFormattedString};

pub const MISSING: &str = "-";

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

/// `$12.00M`
pub fn millions(value: Option<f64>) -> String {
    defined(value)
        .map(|value| format!("${:.2}M", value / 1_000_000.0))
        .unwrap_or_else(|| MISSING.to_string())
}

/// `$1,234,567`
pub fn money(value: Option<f64>) -> String {
    defined(value)
        .map(|value| {
            let rounded = value.round_ties_even();
            let sign = if rounded < 0.0 { "-" } else { "" };
            format!("{sign}${}", (rounded.abs() as u64).to_formatted_string(&Locale::en))
        })
        .unwrap_or_else(|| MISSING.to_string())
}

/// `85.0%`
pub fn percent(value: Option<f64>) -> String {
    defined(value)
        .map(|value| format!("{value:.1}%"))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Five-point survey rating, `4.26`.
pub fn rating(value: Option<f64>) -> String {
    defined(value)
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn count(value: usize) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millions_use_two_decimals() {
        assert_eq!(millions(Some(12_000_000.0)), "$12.00M");
        assert_eq!(millions(Some(1_234_567.0)), "$1.23M");
        assert_eq!(millions(None), "-");
    }

    #[test]
    fn money_groups_thousands_without_decimals() {
        assert_eq!(money(Some(250.0)), "$250");
        assert_eq!(money(Some(1_234_567.4)), "$1,234,567");
        assert_eq!(money(Some(999.6)), "$1,000");
        assert_eq!(money(Some(-1500.0)), "-$1,500");
        assert_eq!(money(Some(f64::INFINITY)), "-");
    }

    #[test]
    fn percent_and_rating() {
        assert_eq!(percent(Some(85.0)), "85.0%");
        assert_eq!(percent(Some(66.666)), "66.7%");
        assert_eq!(percent(None), "-");
        assert_eq!(rating(Some(4.256)), "4.26");
        assert_eq!(rating(Some(f64::NAN)), "-");
        assert_eq!(count(38), "38");
    }
}
