//! Lenient cell parsers for spreadsheet imports.

use chrono::{Duration, NaiveDate};

use crate::ledger::entry::parse_stored_date;

/// Parses amounts such as `1234.56`, `R$ 1.234,56`, `1,234.56` or `-12,5`.
///
/// When both separators appear, the last one is the decimal separator and the other is digit
/// grouping. A lone comma is the decimal separator; otherwise a dot is.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-'))
        .collect();
    if kept.is_empty() {
        return None;
    }
    let normalized = match (kept.rfind(','), kept.rfind('.')) {
        (Some(comma), Some(dot)) if dot > comma => kept.replace(',', ""),
        (Some(_), _) => kept.replace('.', "").replacen(',', ".", 1),
        (None, _) => kept,
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a spreadsheet date cell.
///
/// Accepts day-first `D/M/Y` and `D-M-Y`, ISO `YYYY-MM-DD`, RFC 3339 timestamps, and bare
/// numbers, which are read as spreadsheet serial days counted from 1899-12-30.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return serial_to_date(trimmed.parse::<f64>().ok()?);
    }

    let parts: Vec<&str> = trimmed.split(|ch: char| ch == '/' || ch == '-').collect();
    if parts.len() == 3 && parts.iter().all(|part| is_number(part)) {
        let numbers: Vec<u32> = parts
            .iter()
            .map(|part| part.parse::<u32>())
            .collect::<Result<_, _>>()
            .ok()?;
        return if parts[0].len() == 4 {
            NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2])
        } else {
            let year = if parts[2].len() == 2 {
                2000 + numbers[2] as i32
            } else {
                numbers[2] as i32
            };
            NaiveDate::from_ymd_opt(year, numbers[1], numbers[0])
        };
    }

    parse_stored_date(trimmed)
}

/// Converts a spreadsheet serial day (epoch 1899-12-30) to a date; any time fraction is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_brazilian_currency_text() {
        assert_eq!(parse_amount("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_amount("-3"), Some(-3.0));
        assert_eq!(parse_amount("R$"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn parses_day_first_dates() {
        assert_eq!(parse_sheet_date("31/01/2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_sheet_date("5-3-2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_sheet_date("05/03/24"), Some(date(2024, 3, 5)));
        assert_eq!(parse_sheet_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_sheet_date("31/02/2024"), None);
        assert_eq!(parse_sheet_date("tomorrow"), None);
        assert_eq!(parse_sheet_date(""), None);
    }

    #[test]
    fn parses_serial_day_numbers() {
        assert_eq!(parse_sheet_date("45322"), Some(date(2024, 1, 31)));
        assert_eq!(parse_sheet_date("45322.75"), Some(date(2024, 1, 31)));
        assert_eq!(serial_to_date(1.0), Some(date(1899, 12, 31)));
        assert_eq!(serial_to_date(-1.0), None);
    }

    #[test]
    fn falls_back_to_timestamps() {
        assert_eq!(
            parse_sheet_date("2024-01-31T03:00:00.000Z"),
            Some(date(2024, 1, 31))
        );
    }
}
