//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `transform`: Replace natural-language literals with translation calls
//! - `revert`: Turn translation calls back into literals for one locale
//! - `init`: Write a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Transform(cmd)) => cmd.common.verbose,
            Some(Command::Revert(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// File or directory to process (default: the configured includes)
    pub path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct TransformCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Rewrite files and update the base locale file (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct RevertCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Target locale (default: baseLocale)
    #[arg(long, short = 'l')]
    pub locale: Option<String>,

    /// Output directory (overrides outputDir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace natural-language literals with translation calls
    Transform(TransformCommand),
    /// Write copies of the sources with translation calls turned back into text
    Revert(RevertCommand),
    /// Initialize a new .autoglotrc.json configuration file
    Init,
}
