//! Template linting framework.
//!
//! - [`TemplateRule`] and [`RecordRule`] for template-wide and per-record checks
//! - [`LintEngine`] for running the built-in rules over a stream of templates
//! - [`Diagnostic`] and [`Report`] for collecting coded findings
//! - [`ValidationConfig`] for the switches that change rule behavior
//!
//! # Example
//!
//! ```
//! use dctlint::lint::{Code, LintEngine, Severity, ValidationConfig};
//!
//! let source = br#"{
//!     "providerId": "example.com",
//!     "providerName": "Example",
//!     "serviceId": "web",
//!     "serviceName": "Web",
//!     "version": 1,
//!     "records": []
//! }"#;
//!
//! let mut engine = LintEngine::new(ValidationConfig::new());
//! let outcome = engine.check_source(source, None);
//!
//! assert!(outcome.report.has(Code::NoRecords));
//! assert_eq!(outcome.report.severity(), Severity::Error);
//! ```

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod rule;
pub mod rules;
pub mod severity;

// Re-export main types for convenience
pub use config::{RecordContext, TemplateContext, ValidationConfig};
pub use diagnostic::{Code, Diagnostic, Report, RuleCategory};
pub use engine::{CheckOutcome, LintEngine, RuleInfo};
pub use rule::{BoxedRecordRule, BoxedTemplateRule, RecordRule, TemplateRule};
pub use severity::{Severity, Tolerance};
