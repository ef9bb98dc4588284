//! Line-oriented shell that drives the ledger: interactive with `rustyline`, or scripted from stdin.

pub mod commands;
pub mod core;
mod help;
pub mod io;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode, CommandError, LoopControl, ShellContext, SCRIPT_ENV_VAR};
pub use shell::run_cli;
