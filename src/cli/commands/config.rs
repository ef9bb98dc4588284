use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;

use super::{usage_error, CommandDefinition};

const USAGE: &str = "config [locale|currency] [value]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "Show or change display preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            output_section("Configuration");
            io::print_info(format!("  locale   : {}", context.config.locale));
            io::print_info(format!("  currency : {}", context.config.currency_symbol));
            Ok(())
        }
        [key] => {
            let value = match key.to_lowercase().as_str() {
                "locale" => context.config.locale.clone(),
                "currency" => context.config.currency_symbol.clone(),
                _ => return Err(usage_error(USAGE)),
            };
            io::print_info(format!("{key} = {value}"));
            Ok(())
        }
        [key, value] => {
            context.config.set(&key.to_lowercase(), value)?;
            context.save_config()?;
            io::print_success(format!("{key} set to `{value}`."));
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}
