//! dctlint - Domain Connect template linter
//!
//! Checks service provider templates against the Domain Connect
//! protocol and the restrictions of individual DNS providers, and
//! renders them in a canonical form.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod probe;
pub mod template;
pub mod utils;

pub use error::{LintError, Result};
