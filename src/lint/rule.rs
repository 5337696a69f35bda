//! Validation rule traits.

use super::config::{RecordContext, TemplateContext, ValidationConfig};
use super::diagnostic::{Report, RuleCategory};
use crate::template::Template;

/// A rule that inspects the template as a whole.
///
/// Rules are stateless and never fail: every finding goes into the
/// `Report`. All state needed for validation is passed through the context.
pub trait TemplateRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "id-chars")
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule checks
    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    /// Whether the rule runs under this configuration
    fn applies(&self, _config: &ValidationConfig) -> bool {
        true
    }

    /// Run the validation check
    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report);

    /// Does this rule normalize the template?
    fn can_fix(&self) -> bool {
        false
    }

    /// Normalize the template so canonical output is self-consistent
    fn fix(&self, _template: &mut Template) {}
}

/// A rule that inspects one record in the context of its template
pub trait RecordRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    fn applies(&self, _config: &ValidationConfig) -> bool {
        true
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report);
}

pub type BoxedTemplateRule = Box<dyn TemplateRule>;
pub type BoxedRecordRule = Box<dyn RecordRule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::diagnostic::{Code, Diagnostic};
    use crate::lint::severity::Severity;

    struct EmptyProviderRule;

    impl TemplateRule for EmptyProviderRule {
        fn id(&self) -> &'static str {
            "test-rule"
        }

        fn name(&self) -> &'static str {
            "Test Rule"
        }

        fn description(&self) -> &'static str {
            "A test rule for unit testing"
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Structure
        }

        fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
            if ctx.template.provider_id.is_empty() {
                report.push(Diagnostic::warn(Code::FieldValidation).with("field", "providerId"));
            }
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = EmptyProviderRule;
        assert_eq!(rule.id(), "test-rule");
        assert_eq!(rule.category(), RuleCategory::Structure);
        assert!(rule.applies(&ValidationConfig::new()));
        assert!(!rule.can_fix());
    }

    #[test]
    fn test_rule_check() {
        let rule = EmptyProviderRule;
        let config = ValidationConfig::new();

        let template = Template::default();
        let mut report = Report::new();
        rule.check(&TemplateContext::new(&template, &config), &mut report);
        assert_eq!(report.severity(), Severity::Warn);

        let template = Template {
            provider_id: "example.com".into(),
            ..Default::default()
        };
        let mut report = Report::new();
        rule.check(&TemplateContext::new(&template, &config), &mut report);
        assert!(report.is_empty());
    }
}
