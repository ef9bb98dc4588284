use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::errors::LedgerError;
use crate::exchange::{
    history_export, import_history, import_month_report, month_report, read_sheet, read_workbook,
    to_pretty_json, write_sheet, ImportReport,
};

use super::{usage_error, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "export-json",
            "Write the active month as a JSON report",
            "export-json <path>",
            cmd_export_json,
        ),
        CommandDefinition::new(
            "export-history",
            "Write every month as one JSON document",
            "export-history <path>",
            cmd_export_history,
        ),
        CommandDefinition::new(
            "export-csv",
            "Write the active month as a CSV spreadsheet",
            "export-csv <path>",
            cmd_export_csv,
        ),
        CommandDefinition::new(
            "import-json",
            "Load a month report (replaces that month) or a history export (replaces everything)",
            "import-json <path>",
            cmd_import_json,
        ),
        CommandDefinition::new(
            "import-csv",
            "Append the rows of a CSV spreadsheet",
            "import-csv <path>",
            cmd_import_csv,
        ),
        CommandDefinition::new(
            "import-xlsx",
            "Append the rows of the first sheet of a workbook (.xlsx, .xls, .ods)",
            "import-xlsx <path>",
            cmd_import_xlsx,
        ),
    ]
}

fn single_path<'a>(args: &[&'a str], usage: &str) -> Result<&'a Path, CommandError> {
    match args {
        [path] => Ok(Path::new(*path)),
        _ => Err(usage_error(usage)),
    }
}

fn cmd_export_json(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "export-json <path>")?;
    let month = context.store.selected_month();
    let report = month_report(&context.store, month, &context.config.locale, context.clock())?;
    fs::write(path, to_pretty_json(&report)?)?;
    io::print_success(format!(
        "Exported {} entr(ies) of {} to {}.",
        report.entries.len(),
        report.month_name,
        path.display()
    ));
    Ok(())
}

fn cmd_export_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "export-history <path>")?;
    let export = history_export(&context.store, context.clock());
    fs::write(path, to_pretty_json(&export)?)?;
    io::print_success(format!(
        "Exported {} month(s) to {}.",
        export.months.len(),
        path.display()
    ));
    Ok(())
}

fn cmd_export_csv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "export-csv <path>")?;
    let month = context.store.selected_month();
    let entries = context.store.entries_for_month(month);
    if entries.is_empty() {
        return Err(LedgerError::NoOp(format!("month {month} has no entries to export")).into());
    }
    let count = entries.len();
    write_sheet(File::create(path)?, entries)?;
    io::print_success(format!("Exported {count} row(s) to {}.", path.display()));
    Ok(())
}

fn cmd_import_json(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "import-json <path>")?;
    let raw = fs::read_to_string(path)?;
    let document: serde_json::Value = serde_json::from_str(&raw).map_err(LedgerError::from)?;
    let is_history = document.get("history").is_some() || document.get("historico").is_some();

    let prompt = if is_history {
        "Replace the whole ledger with this history?".to_string()
    } else {
        "Replace that month's entries with this report?".to_string()
    };
    if !context.confirm(&prompt)? {
        io::print_info("Import cancelled.");
        return Ok(());
    }

    let imported = if is_history {
        import_history(&mut context.store, &raw)?
    } else {
        import_month_report(&mut context.store, &raw)?
    };
    if let Some(month) = imported.month {
        context.store.select_month(month);
        context.save_config()?;
    }
    context.persist()?;
    io::print_success(format!("Imported {} entr(ies).", imported.entries.len()));
    Ok(())
}

fn cmd_import_csv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "import-csv <path>")?;
    let report = read_sheet(BufReader::new(File::open(path)?))?;
    apply_import(context, report)
}

fn cmd_import_xlsx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_path(args, "import-xlsx <path>")?;
    let report = read_workbook(path)?;
    apply_import(context, report)
}

fn apply_import(context: &mut ShellContext, report: ImportReport) -> CommandResult {
    for skipped in &report.skipped {
        io::print_warning(format!("Row {} skipped: {}", skipped.row, skipped.reason));
    }
    let created = report.apply(&mut context.store)?;
    context.persist()?;
    io::print_success(format!("Imported {} entr(ies).", created.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::test_support::script_context;
    use crate::ledger::MonthKey;

    #[test]
    fn csv_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        context.process_line("add 2024-03-05 Feira 120,50 expense Alimentação").unwrap();
        context.process_line("add 2024-03-20 Pix 50 income Freelance").unwrap();

        let sheet = dir.path().join("march.csv");
        context
            .process_line(&format!("export-csv {}", sheet.display()))
            .unwrap();
        context
            .process_line(&format!("import-csv {}", sheet.display()))
            .unwrap();

        assert_eq!(context.store().selected_entries().len(), 4);
        assert_eq!(context.store().selected_totals().total_expense, 241.0);
    }

    #[test]
    fn json_report_import_replaces_the_month_and_selects_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        context.process_line("add 2024-03-05 Feira 100 expense").unwrap();
        let report = dir.path().join("report.json");
        context
            .process_line(&format!("export-json {}", report.display()))
            .unwrap();

        context.process_line("add 2024-03-06 Extra 1 expense").unwrap();
        context.process_line("select 2024-01").unwrap();
        context
            .process_line(&format!("import-json {}", report.display()))
            .unwrap();

        assert_eq!(context.store().selected_month(), MonthKey::new(2024, 3).unwrap());
        assert_eq!(context.store().selected_entries().len(), 1);
    }

    #[test]
    fn workbook_import_reports_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        let path = dir.path().join("march.xlsx");
        fs::write(&path, "plain text").unwrap();

        let err = context
            .process_line(&format!("import-xlsx {}", path.display()))
            .unwrap_err();
        assert!(matches!(err, CommandError::Core(LedgerError::Workbook(_))));
        assert!(context.store().is_empty());
    }

    #[test]
    fn exporting_an_empty_month_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        let target = dir.path().join("empty.csv");
        let err = context
            .process_line(&format!("export-csv {}", target.display()))
            .unwrap_err();
        assert!(matches!(err, CommandError::Core(LedgerError::NoOp(_))));
        assert!(!target.exists());
    }
}
