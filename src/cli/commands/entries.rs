use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::currency::format_date;
use crate::errors::LedgerError;
use crate::ledger::{is_overdue, Entry, EntryDraft, EntryKind, EntryPatch};

use super::{parse_amount_arg, parse_date_arg, parse_id, usage_error, CommandDefinition};

const ADD_USAGE: &str = "add <date> <description> <amount> <expense|income> [category]";
const EDIT_USAGE: &str =
    "edit <id> [--date d] [--description s] [--amount n] [--kind k] [--category c]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "list",
            "List the active month's entries",
            "list [expense|income|overdue]",
            cmd_list,
        ),
        CommandDefinition::new("add", "Record a new entry", ADD_USAGE, cmd_add),
        CommandDefinition::new("edit", "Change fields of an entry", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("remove", "Delete an entry", "remove <id>", cmd_remove),
        CommandDefinition::new("pay", "Toggle an entry's paid flag", "pay <id>", cmd_pay),
        CommandDefinition::new("dup", "Duplicate an entry on the same date", "dup <id>", cmd_dup),
    ]
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let today = context.clock().today();
    let store = &context.store;
    let entries = match args {
        [] => store.selected_entries(),
        [filter] if filter.eq_ignore_ascii_case("overdue") => store.overdue_entries(today),
        [filter] => store.selected_entries_of_kind(filter.parse::<EntryKind>()?),
        _ => return Err(usage_error("list [expense|income|overdue]")),
    };

    output_section(format!(
        "Entries for {}",
        context.month_name(store.selected_month())
    ));
    if entries.is_empty() {
        io::print_info("  No entries.");
        return Ok(());
    }
    for entry in entries {
        let status = if entry.paid {
            "paid"
        } else if is_overdue(entry, today) {
            "OVERDUE"
        } else {
            "pending"
        };
        io::print_info(format!(
            "  #{:<4} {}  {:<24} {:<16} {:<8} {:>14}  {}",
            entry.id,
            format_date(&context.config.locale, entry.date),
            entry.description,
            entry.category,
            entry.kind,
            context.money(entry.amount),
            status
        ));
    }
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (date, description, amount, kind, category) = match args {
        [date, description, amount, kind] => (date, description, amount, kind, ""),
        [date, description, amount, kind, category] => (date, description, amount, kind, *category),
        _ => return Err(usage_error(ADD_USAGE)),
    };
    let draft = EntryDraft::new(
        parse_date_arg(date)?,
        *description,
        parse_amount_arg(amount)?,
        kind.parse()?,
        category,
    );
    let entry = context.store.add_entry(draft)?;
    context.persist()?;
    report(context, "Added", &entry);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((id, flags)) = args.split_first() else {
        return Err(usage_error(EDIT_USAGE));
    };
    let id = parse_id(id)?;
    let patch = parse_patch(flags)?;
    if patch.is_empty() {
        return Err(usage_error(EDIT_USAGE));
    }
    let entry = context.store.update_entry(id, patch)?;
    context.persist()?;
    report(context, "Updated", &entry);
    Ok(())
}

fn parse_patch(flags: &[&str]) -> Result<EntryPatch, CommandError> {
    let mut patch = EntryPatch::default();
    for pair in flags.chunks(2) {
        let [flag, value] = pair else {
            return Err(usage_error(EDIT_USAGE));
        };
        match *flag {
            "--date" => patch.date = Some(parse_date_arg(value)?),
            "--description" => patch.description = Some(value.to_string()),
            "--amount" => patch.amount = Some(parse_amount_arg(value)?),
            "--kind" => patch.kind = Some(value.parse()?),
            "--category" => patch.category = Some(value.to_string()),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{other}`"
                )))
            }
        }
    }
    Ok(patch)
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage_error("remove <id>"));
    };
    let id = parse_id(id)?;
    let entry = context.store.get(id).ok_or(LedgerError::NotFound(id))?;
    let prompt = format!("Remove #{} `{}`?", entry.id, entry.description);
    if !context.confirm(&prompt)? {
        io::print_info("Removal cancelled.");
        return Ok(());
    }
    let removed = context.store.remove_entry(id)?;
    context.persist()?;
    report(context, "Removed", &removed);
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage_error("pay <id>"));
    };
    let entry = context.store.toggle_paid(parse_id(id)?)?;
    context.persist()?;
    let verb = if entry.paid { "Marked paid" } else { "Marked unpaid" };
    report(context, verb, &entry);
    Ok(())
}

fn cmd_dup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage_error("dup <id>"));
    };
    let entry = context.store.duplicate_entry(parse_id(id)?)?;
    context.persist()?;
    report(context, "Duplicated as", &entry);
    Ok(())
}

fn report(context: &ShellContext, verb: &str, entry: &Entry) {
    io::print_success(format!(
        "{verb} #{} {} `{}` {} ({}).",
        entry.id,
        entry.kind,
        entry.description,
        context.money(entry.amount),
        format_date(&context.config.locale, entry.date)
    ));
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::cli::core::test_support::script_context;
    use crate::ledger::MonthKey;

    #[test]
    fn add_edit_pay_remove_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());

        context
            .process_line("add 2024-03-05 \"Feira\" 120,50 expense Alimentação")
            .unwrap();
        context.process_line("add 10/03/2024 Salário 3000 income").unwrap();
        assert_eq!(context.store().len(), 2);
        assert_eq!(context.store().selected_totals().net_balance, 2879.5);

        context
            .process_line("edit 1 --date 2024-04-02 --amount 99.5")
            .unwrap();
        let moved = context.store().get(1).unwrap();
        assert_eq!(moved.date, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
        assert_eq!(moved.month_key(), MonthKey::new(2024, 4).unwrap());

        context.process_line("pay 2").unwrap();
        assert!(context.store().get(2).unwrap().paid);

        context.process_line("remove 2").unwrap();
        assert!(context.store().get(2).is_none());
    }

    #[test]
    fn bad_arguments_surface_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());

        assert!(matches!(
            context.process_line("add 2024-03-05 Rent"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            context.process_line("add 2024-03-05 Rent -5 expense"),
            Err(CommandError::Core(_))
        ));
        assert!(matches!(
            context.process_line("edit 1 --amount"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            context.process_line("pay 42"),
            Err(CommandError::Core(LedgerError::NotFound(42)))
        ));
        assert!(context.store().is_empty());
    }

    #[test]
    fn duplicate_keeps_date_and_resets_paid() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        context.process_line("add 2024-03-05 Gym 80 expense Saúde").unwrap();
        context.process_line("pay 1").unwrap();
        context.process_line("dup 1").unwrap();

        let copy = context.store().get(2).unwrap();
        assert_eq!(copy.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert!(!copy.paid);
    }
}
