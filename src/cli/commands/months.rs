use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::errors::LedgerError;
use crate::ledger::{categories_for, catalog, EntryKind, MonthKey};

use super::{usage_error, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("months", "List months that have entries", "months", cmd_months),
        CommandDefinition::new("select", "Switch the active month", "select <YYYY-MM>", cmd_select),
        CommandDefinition::new("totals", "Show the active month's totals", "totals", cmd_totals),
        CommandDefinition::new(
            "roll",
            "Copy every entry of the active month into the next month",
            "roll",
            cmd_roll,
        ),
        CommandDefinition::new(
            "categories",
            "List suggested categories",
            "categories [expense|income]",
            cmd_categories,
        ),
    ]
}

fn cmd_months(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let selected = context.store.selected_month();
    let months = context.store.list_month_keys();
    output_section("Months");
    if months.is_empty() {
        io::print_info("  No entries recorded yet.");
    }
    for month in &months {
        let marker = if *month == selected { "*" } else { " " };
        let count = context.store.entries_for_month(*month).len();
        io::print_info(format!(
            " {marker} {month}  {:<18} {count} entr{}",
            context.month_name(*month),
            if count == 1 { "y" } else { "ies" }
        ));
    }
    if !months.contains(&selected) {
        io::print_info(format!(
            "Active month: {} (no entries)",
            context.month_name(selected)
        ));
    }
    Ok(())
}

fn cmd_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error("select <YYYY-MM>"));
    };
    let month: MonthKey = raw.parse()?;
    context.store.select_month(month);
    context.save_config()?;
    io::print_success(format!("Active month is now {}.", context.month_name(month)));
    Ok(())
}

fn cmd_totals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let totals = context.store.selected_totals();
    output_section(format!(
        "Totals for {}",
        context.month_name(context.store.selected_month())
    ));
    let rows = [
        ("Income", totals.total_income),
        ("Expenses", totals.total_expense),
        ("Balance", totals.net_balance),
        ("Paid expenses", totals.paid_expense),
        ("Unpaid expenses", totals.unpaid_expense),
        ("Due days 1-30", totals.due_early_month),
        ("Due day 31", totals.due_end_of_month),
        ("Income received", totals.paid_income),
    ];
    for (label, value) in rows {
        io::print_info(format!("  {label:<16} {:>16}", context.money(value)));
    }
    Ok(())
}

fn cmd_roll(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let month = context.store.selected_month();
    let count = context.store.entries_for_month(month).len();
    if count == 0 {
        return Err(LedgerError::NoOp(format!("{month} has no entries to roll forward")).into());
    }
    let next = context.month_name(month.next());
    if !context.confirm(&format!("Copy {count} entr(ies) into {next}?"))? {
        io::print_info("Roll forward cancelled.");
        return Ok(());
    }
    let created = context.store.roll_month_forward(month)?;
    context.persist()?;
    io::print_success(format!("Copied {} entr(ies) into {next}.", created.len()));
    Ok(())
}

fn cmd_categories(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let categories: Vec<_> = match args {
        [] => catalog().iter().collect(),
        [kind] => categories_for(kind.parse::<EntryKind>()?).collect(),
        _ => return Err(usage_error("categories [expense|income]")),
    };
    output_section("Categories");
    for category in categories {
        io::print_info(format!("  {:<18} {}", category.name, category.kind));
    }
    Ok(())
}
