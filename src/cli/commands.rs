use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `persona-mailer` - answers every alias of one inbox in character.
#[derive(Parser, Debug)]
#[command(name = "persona-mailer")]
#[command(version)]
#[command(about = "Polls a mailbox and replies to each alias as its persona.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.persona-mailer/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Poll the mailbox until interrupted (Ctrl-C stops between cycles)
    Run,

    /// Run a single polling cycle and exit
    Once,

    /// List the registered personas and their reply addresses
    Personas,

    /// Summarise the persisted dedup ledger and reply log
    State,
}
