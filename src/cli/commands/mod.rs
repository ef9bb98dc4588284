use std::collections::HashMap;

use chrono::NaiveDate;

pub mod config;
pub mod entries;
pub mod exchange;
pub mod months;
pub mod system;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::exchange::{parse_amount, parse_sheet_date};
use crate::ledger::EntryId;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(months::definitions());
    commands.extend(entries::definitions());
    commands.extend(exchange::definitions());
    commands.extend(config::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

pub(crate) fn parse_id(raw: &str) -> Result<EntryId, CommandError> {
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not an entry id")))
}

/// Accepts `YYYY-MM-DD` or day-first `DD/MM/YYYY`.
pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate, CommandError> {
    parse_sheet_date(raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a valid date")))
}

pub(crate) fn parse_amount_arg(raw: &str) -> Result<f64, CommandError> {
    parse_amount(raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a valid amount")))
}
