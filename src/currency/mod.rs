//! Locale-aware rendering of amounts and dates for display.

use chrono::NaiveDate;

/// Separators and symbol placement for a locale tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Whether a space separates the currency symbol from the digits.
    pub spaced_symbol: bool,
    pub day_first: bool,
}

impl LocaleFormat {
    /// Portuguese, Spanish, German and French tags use comma decimals; everything else
    /// falls back to the English conventions.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(|ch: char| ch == '-' || ch == '_')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match language.as_str() {
            "pt" | "es" | "de" | "fr" | "it" => Self {
                decimal_separator: ',',
                grouping_separator: '.',
                spaced_symbol: true,
                day_first: true,
            },
            "en" if tag.eq_ignore_ascii_case("en-gb") => Self {
                decimal_separator: '.',
                grouping_separator: ',',
                spaced_symbol: false,
                day_first: true,
            },
            _ => Self {
                decimal_separator: '.',
                grouping_separator: ',',
                spaced_symbol: false,
                day_first: false,
            },
        }
    }
}

pub fn format_number(format: &LocaleFormat, value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value.abs());
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body.as_str(), None),
    };
    let mut rendered = group_digits(int_part, format.grouping_separator);
    if let Some(fraction) = fraction {
        rendered.push(format.decimal_separator);
        rendered.push_str(fraction);
    }
    if value < 0.0 && rendered.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        rendered.insert(0, '-');
    }
    rendered
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Formats a money amount, e.g. `R$ 1.234,56` for `pt-BR` or `$1,234.56` for `en-US`.
pub fn format_amount(value: f64, locale: &str, symbol: &str) -> String {
    let format = LocaleFormat::for_locale(locale);
    let digits = format_number(&format, value.abs(), 2);
    let sign = if value < 0.0 && value.abs() >= 0.005 { "-" } else { "" };
    if symbol.is_empty() {
        format!("{sign}{digits}")
    } else if format.spaced_symbol {
        format!("{sign}{symbol} {digits}")
    } else {
        format!("{sign}{symbol}{digits}")
    }
}

pub fn format_date(locale: &str, date: NaiveDate) -> String {
    if LocaleFormat::for_locale(locale).day_first {
        date.format("%d/%m/%Y").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brazilian_reais() {
        assert_eq!(format_amount(1234.56, "pt-BR", "R$"), "R$ 1.234,56");
        assert_eq!(format_amount(-50.0, "pt-BR", "R$"), "-R$ 50,00");
        assert_eq!(format_amount(0.0, "pt-BR", "R$"), "R$ 0,00");
    }

    #[test]
    fn formats_us_dollars() {
        assert_eq!(format_amount(1234567.891, "en-US", "$"), "$1,234,567.89");
        assert_eq!(format_amount(-0.001, "en-US", "$"), "$0.00");
        assert_eq!(format_amount(12.0, "en-US", ""), "12.00");
    }

    #[test]
    fn dates_follow_locale_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date("pt-BR", date), "05/03/2024");
        assert_eq!(format_date("en-US", date), "2024-03-05");
        assert_eq!(format_date("en-GB", date), "05/03/2024");
    }

    #[test]
    fn groups_large_integers() {
        let format = LocaleFormat::for_locale("pt-BR");
        assert_eq!(format_number(&format, 1_000_000.0, 0), "1.000.000");
        assert_eq!(format_number(&format, 999.5, 1), "999,5");
    }
}
