use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::command_support::load_settings;
use crate::config::Settings;
use std::fmt;

pub mod check;
pub mod package;
pub mod run;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NOT_CONFIGURED: i32 = 2;

/// A failed command: the text to show the operator and the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub message: String,
    pub exit_code: i32,
}

impl CommandError {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: EXIT_FAILURE,
        }
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: EXIT_NOT_CONFIGURED,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

pub fn run_cli(args: Vec<String>) -> Result<String, CommandError> {
    if args.is_empty() {
        return Ok(help_text());
    }
    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(CommandError::failure(format!(
            "unknown command `{}`\n\n{}",
            args[0],
            help_text()
        ))),
        _ => {
            let settings = load_settings()?;
            run_cli_with_settings(&settings, args)
        }
    }
}

pub fn run_cli_with_settings(settings: &Settings, args: Vec<String>) -> Result<String, CommandError> {
    if args.is_empty() {
        return Ok(help_text());
    }
    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Run | CliVerb::Resume => run::cmd_run(settings, &args[1..]),
        CliVerb::Check => check::cmd_check(settings, &args[1..]),
        CliVerb::Package => package::cmd_package(settings, &args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(CommandError::failure(format!("unknown command `{}`", args[0]))),
    }
}
