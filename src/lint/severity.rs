//! Severity levels and their aggregation.
//!
//! A template check produces any number of findings; the outcome of the
//! check is the most severe of them. The same rule combines outcomes
//! across all templates of a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LintError, Result};

/// Outcome level of a check, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Nothing to report
    #[default]
    Ok,
    /// Trace information, no action needed
    Debug,
    /// Advisory, provider dependent nuance
    Info,
    /// Likely mistake, template still usable
    Warn,
    /// Template should not be accepted as-is
    Error,
    /// Template could not be parsed, or required output could not be produced
    Fatal,
}

impl Severity {
    /// All levels in ascending order
    pub const ALL: [Self; 6] = [
        Self::Ok,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    /// Combine two outcomes. Associative, commutative, `Ok` is the identity.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    /// Process exit status for this level when it is not tolerated.
    ///
    /// Values match the historical bit flags so existing scripts keep working.
    #[must_use]
    pub const fn exit_bits(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warn => 4,
            Self::Error => 8,
            Self::Fatal => 16,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Fold any number of outcomes into one
pub fn combine_all(levels: impl IntoIterator<Item = Severity>) -> Severity {
    levels.into_iter().fold(Severity::Ok, Severity::combine)
}

/// Caller selected threshold deciding which outcomes fail a run
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    /// Never fail
    Any,
    /// Tolerate errors, fail only on Fatal
    Error,
    /// Tolerate warnings, fail on Error or above
    Warn,
    /// Tolerate info, fail on Warn or above
    #[default]
    Info,
    /// Tolerate debug, fail on Info or above
    Debug,
    /// Tolerate nothing, fail on any finding including Debug
    None,
}

impl Tolerance {
    /// Lowest severity that fails the run, `None` when nothing does
    #[must_use]
    pub const fn fails_from(self) -> Option<Severity> {
        match self {
            Self::Any => None,
            Self::Error => Some(Severity::Fatal),
            Self::Warn => Some(Severity::Error),
            Self::Info => Some(Severity::Warn),
            Self::Debug => Some(Severity::Info),
            Self::None => Some(Severity::Debug),
        }
    }

    /// Map a combined run outcome to a process exit status
    #[must_use]
    pub fn exit_status(self, combined: Severity) -> u8 {
        match self.fails_from() {
            Some(threshold) if combined >= threshold => combined.exit_bits(),
            _ => 0,
        }
    }
}

impl FromStr for Tolerance {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "none" => Ok(Self::None),
            other => Err(LintError::Config(format!(
                "unknown tolerance '{other}', expected one of: any error warn info debug none"
            ))),
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::None => write!(f, "none"),
        }
    }
}
