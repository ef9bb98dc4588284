use std::io;

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    cli::{
        commands::{all_definitions, CommandDefinition, CommandRegistry},
        io as cli_io,
    },
    config::{Config, ConfigManager},
    currency,
    errors::LedgerError,
    ledger::{LedgerStore, MonthKey},
    storage::{persistence, JsonFileStorage, KeyValueStorage},
    time::{Clock, SystemClock},
    utils::paths::{app_data_dir, storage_dir_in},
};

pub const SCRIPT_ENV_VAR: &str = "MONTHLY_LEDGER_CLI_SCRIPT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Failures that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

pub type CommandResult = Result<(), CommandError>;

/// State shared by every command: the ledger, where it persists, and user settings.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) store: LedgerStore,
    pub(crate) config: Config,
    storage: Box<dyn KeyValueStorage>,
    config_manager: ConfigManager,
    clock: Box<dyn Clock>,
    theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = app_data_dir();
        let storage = JsonFileStorage::new(storage_dir_in(&base))?;
        let config_manager = ConfigManager::with_base_dir(base)?;
        Self::with_parts(mode, Box::new(storage), config_manager, Box::new(SystemClock))
    }

    pub fn with_parts(
        mode: CliMode,
        mut storage: Box<dyn KeyValueStorage>,
        config_manager: ConfigManager,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let selected = config
            .last_selected_month
            .unwrap_or_else(|| MonthKey::from_date(clock.today()));
        let store = persistence::load(storage.as_mut(), selected)?;

        Ok(Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            store,
            config,
            storage,
            config_manager,
            clock,
            theme: ColorfulTheme::default(),
            running: true,
        })
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Writes the whole ledger back to storage. Called after every mutation.
    pub(crate) fn persist(&mut self) -> CommandResult {
        persistence::save(self.storage.as_mut(), &self.store)?;
        Ok(())
    }

    pub(crate) fn save_config(&mut self) -> CommandResult {
        self.config.last_selected_month = Some(self.store.selected_month());
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "ledger [{}]> ",
            self.store.selected_month().display_name(&self.config.locale)
        )
    }

    pub(crate) fn money(&self, value: f64) -> String {
        currency::format_amount(value, &self.config.locale, &self.config.currency_symbol)
    }

    pub(crate) fn month_name(&self, month: MonthKey) -> String {
        month.display_name(&self.config.locale)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self.registry.get(command).map(|definition| definition.handler);
        if let Some(handler) = handler {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = crate::cli::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    /// Asks before destructive actions; script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        Ok(self.confirm("Exit shell?")?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(LedgerError::NoOp(message)) => {
                cli_io::print_warning(format!("Nothing to do: {message}"));
                Ok(())
            }
            CommandError::Core(err) if !err.is_recoverable() => {
                cli_io::print_error(err.to_string());
                cli_io::print_info("Check the file path and its contents, then try again.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::*;
    use crate::{storage::MemoryStorage, time::FixedClock};

    pub(crate) fn script_context(dir: &std::path::Path) -> ShellContext {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        ShellContext::with_parts(
            CliMode::Script,
            Box::new(MemoryStorage::new()),
            ConfigManager::with_base_dir(dir.to_path_buf()).unwrap(),
            Box::new(FixedClock::on(today)),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::script_context;
    use super::*;

    #[test]
    fn starts_on_the_clock_month() {
        let dir = tempfile::tempdir().unwrap();
        let context = script_context(dir.path());
        assert_eq!(context.store().selected_month(), MonthKey::new(2024, 3).unwrap());
        assert_eq!(context.prompt(), "ledger [Março/2024]> ");
    }

    #[test]
    fn unknown_commands_keep_the_shell_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = script_context(dir.path());
        assert_eq!(context.process_line("lst").unwrap(), LoopControl::Continue);
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
    }
}
