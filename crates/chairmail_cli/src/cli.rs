//! CLI argument definitions.

use std::path::PathBuf;

use chairmail_core::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "chairmail",
    version,
    about = "Search and select chair mail recipients from endpoint payloads"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Objects endpoint payload (`{"type": "user"|"submission", ...}`).
    #[arg(long = "objects", value_name = "PATH", global = true)]
    pub objects: Option<PathBuf>,

    /// Mailing lists endpoint payload (`{"type": "mailing_list", ...}`).
    #[arg(long = "lists", value_name = "PATH", global = true)]
    pub lists: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (overrides CHAIRMAIL_LOG_LEVEL).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search entities (or lists) and print highlighted matches.
    Search(SearchArgs),

    /// Check entities/lists and print the effective recipients.
    Recipients(RecipientsArgs),

    /// Print the members of one mailing list.
    Members(MembersArgs),

    /// Print the core version.
    Version,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Whitespace-separated search tokens.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Search mailing lists instead of entities.
    #[arg(long = "in-lists")]
    pub in_lists: bool,
}

#[derive(Parser)]
pub struct RecipientsArgs {
    /// Entity id to check (repeatable).
    #[arg(long = "check-entity", value_name = "ID")]
    pub check_entity: Vec<String>,

    /// Mailing list id to check (repeatable).
    #[arg(long = "check-list", value_name = "ID")]
    pub check_list: Vec<String>,
}

#[derive(Parser)]
pub struct MembersArgs {
    /// Mailing list id.
    #[arg(value_name = "LIST")]
    pub list: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}
