//! Built-in validation rules.
//!
//! - **Structural rules** (`structural`): template-wide metadata
//! - **Record rules** (`record`): per-record contract, with the reserved
//!   label (`underscore`), placeholder and SPF checks it relies on
//! - **Provider rules** (`provider`): Cloudflare restrictions
//!
//! Cross-record state (CNAME exclusivity, duplicates) lives in
//! [`record::CnameTracker`] and [`duplicates::DuplicateDetector`], which the
//! engine creates per template.

pub mod duplicates;
pub mod placeholder;
pub mod provider;
pub mod record;
pub mod spf;
pub mod structural;
pub mod underscore;

use crate::lint::rule::{BoxedRecordRule, BoxedTemplateRule};

pub use duplicates::DuplicateDetector;
pub use provider::{CloudflareRecordRule, CloudflareTemplateRule};
pub use record::CnameTracker;

/// Returns all template-level rules, provider rules last.
#[must_use]
pub fn template_rules() -> Vec<BoxedTemplateRule> {
    let mut rules = structural::structural_rules();
    rules.push(Box::new(CloudflareTemplateRule));
    rules
}

/// Returns all record-level rules, provider rules last.
#[must_use]
pub fn record_rules() -> Vec<BoxedRecordRule> {
    let mut rules = record::record_rules();
    rules.push(Box::new(CloudflareRecordRule));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_unique() {
        let templates = template_rules();
        let records = record_rules();
        let mut ids: Vec<&str> = templates
            .iter()
            .map(|r| r.id())
            .chain(records.iter().map(|r| r.id()))
            .collect();
        let original_len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), original_len, "All rule IDs must be unique");
    }

    #[test]
    fn test_rule_counts() {
        assert_eq!(template_rules().len(), 12);
        assert_eq!(record_rules().len(), 8);
    }
}
