//! Import and export adapters: JSON documents and spreadsheets.

pub mod json;
pub mod parse;
pub mod sheet;

pub use json::{
    history_export, import_history, import_month_report, month_report, to_pretty_json,
    HistoryExport, JsonImport, MonthReport, ReportTotals,
};
pub use parse::{parse_amount, parse_sheet_date, serial_to_date};
pub use sheet::{read_range, read_sheet, read_workbook, write_sheet, ImportReport, SkipReason, SkippedRow, SHEET_HEADER};
