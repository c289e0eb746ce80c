//! Dispatch a parsed command line to its command handler.
//!
//! # Returns
//! - `Ok(CommandResult)` with the summary and every issue found
//! - `Err` if the command cannot run at all (bad config, unreadable locale file, I/O)

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{init::init, revert::revert, transform::transform},
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Transform(cmd)) => transform(cmd),
        Some(Command::Revert(cmd)) => revert(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
