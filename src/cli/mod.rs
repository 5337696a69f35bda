//! Command line interface.

pub mod codes;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::lint::{Code, Tolerance};

#[derive(Parser, Debug)]
#[command(
    name = "dc-template-linter",
    version,
    about = "Lint Domain Connect service provider templates",
    after_help = "--inplace and --pretty drop empty optional fields from the output.\n\
                  Long DCTL explanations: https://github.com/Domain-Connect/dc-template-linter/wiki"
)]
pub struct Cli {
    /// Template files or directories; reads standard input when none are given
    #[arg(value_name = "TEMPLATE")]
    pub paths: Vec<PathBuf>,

    /// Check logo urls are reachable (requires network)
    #[arg(long)]
    pub logos: bool,

    /// Use Cloudflare specific template rules
    #[arg(long)]
    pub cloudflare: bool,

    /// Write the canonical form back to each template file
    #[arg(long)]
    pub inplace: bool,

    /// Print the canonical form to standard output
    #[arg(long)]
    pub pretty: bool,

    /// Number of spaces in an indent step of the canonical form [default: 4]
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Increment the template version in the canonical form
    #[arg(long)]
    pub increment: bool,

    /// TTL written in place of placeholder TTLs with --inplace
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u32>,

    /// Lowest level that still exits with zero: any error warn info debug none [default: info]
    #[arg(long, value_name = "LEVEL")]
    pub tolerate: Option<Tolerance>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Machine readable JSON output and logs
    #[arg(long)]
    pub robot: bool,

    /// Configuration file replacing the global and project files
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Describe one message code, e.g. DCTL1003
    #[arg(long, value_name = "CODE")]
    pub explain: Option<Code>,

    /// List every message code
    #[arg(long)]
    pub list_codes: bool,

    /// List the validation rules
    #[arg(long)]
    pub list_rules: bool,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
