//! Spreadsheet interchange: one row per entry with Date, Description, Type, Category and
//! Amount columns. Exports are CSV; imports read CSV or the first sheet of a workbook.

use std::{
    fmt,
    io::{Read, Write},
    path::Path,
};

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use tracing::{info, warn};

use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::{Entry, EntryDraft, EntryKind, LedgerStore},
};

use super::parse::{parse_amount, parse_sheet_date};

pub const SHEET_HEADER: [&str; 5] = ["Date", "Description", "Type", "Category", "Amount"];

const DATE_ALIASES: &[&str] = &["date", "data"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "descricao"];
const KIND_ALIASES: &[&str] = &["type", "tipo"];
const CATEGORY_ALIASES: &[&str] = &["category", "categoria"];
const AMOUNT_ALIASES: &[&str] = &["amount", "valor"];

/// Writes entries as CSV rows in the order given.
pub fn write_sheet<'a, W, I>(writer: W, entries: I) -> LedgerResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Entry>,
{
    let mut csv = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(SHEET_HEADER)?;
    for entry in entries {
        csv.write_record([
            entry.date.format("%d/%m/%Y").to_string(),
            entry.description.clone(),
            entry.kind.to_string(),
            entry.category.clone(),
            format!("{:.2}", entry.amount),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Why a spreadsheet row was left out of an import.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Incomplete,
    InvalidDate(String),
    InvalidKind(String),
    InvalidAmount(String),
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Incomplete => f.write_str("missing required fields"),
            SkipReason::InvalidDate(raw) => write!(f, "invalid date `{raw}`"),
            SkipReason::InvalidKind(raw) => {
                write!(f, "invalid type `{raw}` (expected EXPENSE or INCOME)")
            }
            SkipReason::InvalidAmount(raw) => write!(f, "invalid amount `{raw}`"),
            SkipReason::Unreadable(message) => write!(f, "unreadable row: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    pub reason: SkipReason,
}

/// Outcome of reading a spreadsheet: the rows that parsed and the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub drafts: Vec<EntryDraft>,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    /// Appends the parsed rows to the store as new unpaid entries.
    pub fn apply(self, store: &mut LedgerStore) -> LedgerResult<Vec<Entry>> {
        if self.drafts.is_empty() {
            return Err(LedgerError::NoOp(
                "spreadsheet has no valid rows to import".into(),
            ));
        }
        let created = store.append_drafts(self.drafts)?;
        info!(
            imported = created.len(),
            skipped = self.skipped.len(),
            "spreadsheet import applied"
        );
        Ok(created)
    }
}

struct Columns {
    date: usize,
    description: usize,
    kind: usize,
    category: usize,
    amount: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> LedgerResult<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| {
            normalized
                .iter()
                .position(|header| aliases.iter().any(|alias| *alias == header.as_str()))
        };
        let mut missing = Vec::new();
        let mut pick = |aliases: &[&str], label: &'static str| {
            let found = find(aliases);
            if found.is_none() {
                missing.push(label);
            }
            found.unwrap_or_default()
        };
        let columns = Columns {
            date: pick(DATE_ALIASES, "Date"),
            description: pick(DESCRIPTION_ALIASES, "Description"),
            kind: pick(KIND_ALIASES, "Type"),
            category: pick(CATEGORY_ALIASES, "Category"),
            amount: pick(AMOUNT_ALIASES, "Amount"),
        };
        if missing.is_empty() {
            Ok(columns)
        } else {
            Err(LedgerError::InvalidDocument(format!(
                "spreadsheet is missing column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Reads a CSV spreadsheet. Bad rows are collected in the report rather than failing the import.
pub fn read_sheet<R: Read>(reader: R) -> LedgerResult<ImportReport> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = Columns::resolve(&csv.headers()?.clone())?;
    let rows = csv.records().enumerate().map(|(index, record)| {
        let record = record.map_err(|err| SkipReason::Unreadable(err.to_string()));
        (index + 2, record)
    });
    Ok(collect_rows(&columns, rows))
}

/// Reads the first worksheet of an `.xlsx`, `.xls` or `.ods` workbook.
pub fn read_workbook(path: &Path) -> LedgerResult<ImportReport> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        LedgerError::InvalidDocument("workbook has no worksheets".into())
    })??;
    read_range(&range)
}

/// Reads a worksheet range whose first row holds the column headers.
pub fn read_range(range: &Range<Data>) -> LedgerResult<ImportReport> {
    let mut rows = range.rows();
    let headers: StringRecord = rows
        .next()
        .ok_or_else(|| LedgerError::InvalidDocument("worksheet has no header row".into()))?
        .iter()
        .map(cell_text)
        .collect();
    let columns = Columns::resolve(&headers)?;

    let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let records = rows.enumerate().map(|(index, cells)| {
        let record: StringRecord = cells.iter().map(cell_text).collect();
        (header_row + index + 1, Ok(record))
    });
    Ok(collect_rows(&columns, records))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        // Serial days, read by the date parser like a numeric CSV cell.
        Data::DateTime(value) => value.as_f64().to_string(),
    }
}

fn collect_rows<I>(columns: &Columns, rows: I) -> ImportReport
where
    I: IntoIterator<Item = (usize, Result<StringRecord, SkipReason>)>,
{
    let mut report = ImportReport::default();
    for (row, record) in rows {
        match record.and_then(|record| parse_row(&record, columns)) {
            Ok(draft) => report.drafts.push(draft),
            Err(reason) => {
                warn!(row, "skipping spreadsheet row: {reason}");
                report.skipped.push(SkippedRow { row, reason });
            }
        }
    }
    report
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<EntryDraft, SkipReason> {
    let cell = |index: usize| record.get(index).unwrap_or("").trim();
    let (date, description, kind, category, amount) = (
        cell(columns.date),
        cell(columns.description),
        cell(columns.kind),
        cell(columns.category),
        cell(columns.amount),
    );
    if [date, description, kind, category, amount]
        .iter()
        .any(|value| value.is_empty())
    {
        return Err(SkipReason::Incomplete);
    }

    let date = parse_sheet_date(date).ok_or_else(|| SkipReason::InvalidDate(date.to_string()))?;
    let kind =
        EntryKind::from_sheet_label(kind).ok_or_else(|| SkipReason::InvalidKind(kind.to_string()))?;
    let amount = parse_amount(amount)
        .filter(|value| *value > 0.0)
        .ok_or_else(|| SkipReason::InvalidAmount(amount.to_string()))?;

    Ok(EntryDraft::new(date, description, amount, kind, category))
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ledger::MonthKey;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_portuguese_headers_and_currency_text() {
        let data = "DATA,Descrição,tipo,Categoria,VALOR\n\
                    31/01/2024,Aluguel,GASTO,Moradia,\"R$ 1.234,56\"\n";
        let report = read_sheet(data.as_bytes()).unwrap();

        assert!(report.skipped.is_empty());
        let draft = &report.drafts[0];
        assert_eq!(draft.date, date(2024, 1, 31));
        assert_eq!(draft.amount, 1234.56);
        assert_eq!(draft.kind, EntryKind::Expense);
        assert_eq!(draft.category, "Moradia");
    }

    #[test]
    fn skips_bad_rows_and_keeps_good_ones() {
        let data = "Date,Description,Type,Category,Amount\n\
                    05/03/2024,Groceries,EXPENSE,Alimentação,100\n\
                    06/03/2024,,EXPENSE,Lazer,10\n\
                    07/03/2024,Cinema,expense,Lazer,10\n\
                    08/03/2024,Refund,INCOME,Outras Receitas,0\n\
                    32/03/2024,Typo,EXPENSE,Lazer,5\n\
                    45371,Salary,INCOME,Salário,3000\n";
        let report = read_sheet(data.as_bytes()).unwrap();

        assert_eq!(report.drafts.len(), 2);
        assert_eq!(report.drafts[1].date, date(2024, 3, 20));
        let reasons: Vec<(usize, &SkipReason)> = report
            .skipped
            .iter()
            .map(|skip| (skip.row, &skip.reason))
            .collect();
        assert_eq!(reasons.len(), 4);
        assert_eq!(reasons[0], (3, &SkipReason::Incomplete));
        assert!(matches!(reasons[1], (4, SkipReason::InvalidKind(_))));
        assert!(matches!(reasons[2], (5, SkipReason::InvalidAmount(_))));
        assert!(matches!(reasons[3], (6, SkipReason::InvalidDate(_))));
    }

    #[test]
    fn missing_columns_reject_the_file() {
        let data = "Date,Description,Amount\n05/03/2024,x,1\n";
        let err = read_sheet(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDocument(_)));
    }

    #[test]
    fn writes_header_and_day_first_dates() {
        let mut store = LedgerStore::new("2024-03".parse().unwrap());
        store
            .add_entry(EntryDraft::new(date(2024, 3, 5), "Groceries", 99.9, EntryKind::Expense, "Alimentação"))
            .unwrap();
        let month: MonthKey = "2024-03".parse().unwrap();

        let mut out = Vec::new();
        write_sheet(&mut out, store.entries_for_month(month)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Date,Description,Type,Category,Amount\n05/03/2024,Groceries,EXPENSE,Alimentação,99.90\n"
        );
    }

    #[test]
    fn reads_worksheet_cells_including_serial_dates() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 4));
        for (col, header) in ["Data", "Descrição", "Tipo", "Categoria", "Valor"].iter().enumerate() {
            range.set_value((0, col as u32), Data::String(header.to_string()));
        }
        let rows = [
            [Data::Float(45371.0), Data::String("Salário".into()), Data::String("RECEITA".into()),
             Data::String("Salário".into()), Data::Float(3000.0)],
            [Data::String("05/03/2024".into()), Data::String("Feira".into()),
             Data::String("GASTO".into()), Data::String("Alimentação".into()), Data::Int(120)],
            [Data::String("06/03/2024".into()), Data::Empty, Data::String("GASTO".into()),
             Data::String("Lazer".into()), Data::Float(10.0)],
        ];
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, cell) in cells.into_iter().enumerate() {
                range.set_value((row as u32 + 1, col as u32), cell);
            }
        }

        let report = read_range(&range).unwrap();
        assert_eq!(report.drafts.len(), 2);
        assert_eq!(report.drafts[0].date, date(2024, 3, 20));
        assert_eq!(report.drafts[0].kind, EntryKind::Income);
        assert_eq!(report.drafts[1].amount, 120.0);
        assert_eq!(report.skipped, vec![SkippedRow { row: 4, reason: SkipReason::Incomplete }]);
    }

    #[test]
    fn unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();
        assert!(matches!(read_workbook(&path), Err(LedgerError::Workbook(_))));
    }

    #[test]
    fn empty_report_is_a_no_op() {
        let mut store = LedgerStore::new("2024-03".parse().unwrap());
        let err = ImportReport::default().apply(&mut store).unwrap_err();
        assert!(matches!(err, LedgerError::NoOp(_)));
    }
}
