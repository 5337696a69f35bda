//! `%name%` placeholder syntax checks.

use crate::lint::config::RecordContext;
use crate::lint::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use crate::lint::rule::RecordRule;
use crate::template::{Numeric, Record};

/// Outcome of scanning one text for placeholders
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Scan {
    Clean,
    /// A character outside `[A-Za-z0-9_-]` inside a placeholder
    InvalidChar(char),
    /// An opening `%` without its closing partner
    Unterminated,
}

/// Walk `value` toggling on every `%`; stops at the first bad character
#[must_use]
pub fn scan(value: &str) -> Scan {
    let mut inside = false;
    for c in value.chars() {
        if c == '%' {
            inside = !inside;
            continue;
        }
        if inside && !is_name_char(c) {
            return Scan::InvalidChar(c);
        }
    }
    if inside { Scan::Unterminated } else { Scan::Clean }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// `%host%` shadows the record's own host semantics
#[must_use]
pub fn mentions_host_variable(value: &str) -> bool {
    value.to_ascii_lowercase().contains("%host%")
}

/// Findings for one free-text value
#[must_use]
pub fn check_text(value: &str) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    match scan(value) {
        Scan::Clean => {}
        Scan::InvalidChar(c) => {
            found.push(
                Diagnostic::warn(Code::VariableChar)
                    .with("value", value)
                    .with("char", c),
            );
            return found;
        }
        Scan::Unterminated => {
            found.push(Diagnostic::error(Code::VariableUnterminated).with("value", value));
        }
    }
    if mentions_host_variable(value) {
        found.push(Diagnostic::info(Code::HostVariable).with("value", value));
    }
    found
}

/// Findings for a placeholder standing in for a number.
///
/// The whole value must be one `%name%`; anything around it would not
/// survive substitution as an integer.
#[must_use]
pub fn check_numeric(value: &str) -> Vec<Diagnostic> {
    let found = check_text(value);
    if !found.is_empty() || is_lone_placeholder(value) {
        return found;
    }
    vec![Diagnostic::warn(Code::InvalidValue).with("value", value)]
}

/// `%name%` with nothing before or after it
#[must_use]
pub fn is_lone_placeholder(value: &str) -> bool {
    value
        .strip_prefix('%')
        .and_then(|rest| rest.strip_suffix('%'))
        .is_some_and(|name| !name.is_empty() && name.chars().all(is_name_char))
}

/// The numeric fields of a record holding a placeholder
pub fn numeric_placeholders(record: &Record) -> impl Iterator<Item = (&'static str, &str)> {
    [
        ("ttl", record.ttl.as_ref()),
        ("priority", record.priority.as_ref()),
        ("weight", record.weight.as_ref()),
        ("port", record.port.as_ref()),
    ]
    .into_iter()
    .filter_map(|(field, value)| match value {
        Some(Numeric::Placeholder(text)) => Some((field, text.as_str())),
        _ => None,
    })
}

/// The free-text fields a placeholder may appear in
pub fn text_fields(record: &Record) -> [(&'static str, &str); 9] {
    [
        ("host", record.host.as_str()),
        ("name", record.name.as_str()),
        ("pointsTo", record.points_to.as_str()),
        ("data", record.data.as_str()),
        ("txtConflictMatchingPrefix", record.txt_conflict_matching_prefix.as_str()),
        ("service", record.service.as_str()),
        ("protocol", record.protocol.as_str()),
        ("target", record.target.as_str()),
        ("spfRules", record.spf_rules.as_str()),
    ]
}

/// Placeholder grammar over every free-text record field.
pub struct PlaceholderSyntaxRule;

impl RecordRule for PlaceholderSyntaxRule {
    fn id(&self) -> &'static str {
        "placeholder-syntax"
    }

    fn name(&self) -> &'static str {
        "Placeholder Syntax"
    }

    fn description(&self) -> &'static str {
        "Placeholders must be terminated and use only letters, digits, '_' and '-'"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        for (field, value) in text_fields(ctx.record) {
            for diagnostic in check_text(value) {
                report.push(ctx.locate(diagnostic.with("field", field)));
            }
        }
        for (field, value) in numeric_placeholders(ctx.record) {
            for diagnostic in check_numeric(value) {
                report.push(ctx.locate(diagnostic.with("field", field)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::severity::{Severity, combine_all};

    fn severity(value: &str) -> Severity {
        combine_all(check_text(value).iter().map(|d| d.severity))
    }

    #[test]
    fn test_scan() {
        assert_eq!(scan("%hostname%"), Scan::Clean);
        assert_eq!(scan("plain.example.com"), Scan::Clean);
        assert_eq!(scan("%host-name!%"), Scan::InvalidChar('!'));
        assert_eq!(scan("%unterminated"), Scan::Unterminated);
        assert_eq!(scan("%a%.%b%"), Scan::Clean);
    }

    #[test]
    fn test_severities() {
        assert_eq!(severity("%hostname%"), Severity::Ok);
        assert_eq!(severity("%host-name!%"), Severity::Warn);
        assert_eq!(severity("%unterminated"), Severity::Error);
        assert_eq!(severity("prefix%host%suffix"), Severity::Info);
        assert_eq!(severity("%HOST%"), Severity::Info);
    }

    #[test]
    fn test_invalid_char_short_circuits() {
        let found = check_text("%a b% %unterminated");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, Code::VariableChar);
        assert_eq!(found[0].get("char"), Some(" "));

        let found = check_text("%host% %bad!%");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, Code::VariableChar);
    }

    #[test]
    fn test_lone_placeholder() {
        assert!(is_lone_placeholder("%ttl%"));
        assert!(is_lone_placeholder("%srv-port_2%"));
        assert!(!is_lone_placeholder("1%x%"));
        assert!(!is_lone_placeholder("%a%%b%"));
        assert!(!is_lone_placeholder("%%"));
        assert!(check_numeric("%ttl%").is_empty());
    }

    #[test]
    fn test_numeric_and_protocol_placeholders() {
        let template = crate::template::Template::default();
        let record = Record {
            record_type: "SRV".into(),
            service: "_sip".into(),
            protocol: "%proto".into(),
            target: "sip.example.com".into(),
            priority: Some(Numeric::Placeholder("%bad name!%".into())),
            weight: Some(Numeric::Placeholder("%a%%b".into())),
            port: Some(Numeric::Placeholder("%port%".into())),
            ttl: Some(Numeric::Placeholder("1%x%".into())),
            ..Default::default()
        };
        let config = crate::lint::config::ValidationConfig::new();
        let ctx = RecordContext::new(&template, &record, 0, &config);
        let mut report = Report::new();
        PlaceholderSyntaxRule.check(&ctx, &mut report);

        let field_of = |code| {
            report
                .with_code(code)
                .filter_map(|d| d.get("field"))
                .collect::<Vec<_>>()
        };
        assert_eq!(field_of(Code::VariableUnterminated), vec!["protocol", "weight"]);
        assert_eq!(field_of(Code::VariableChar), vec!["priority"]);
        assert_eq!(field_of(Code::InvalidValue), vec!["ttl"]);
        assert_eq!(report.severity(), Severity::Error);
    }

    #[test]
    fn test_rule_reports_field() {
        let template = crate::template::Template::default();
        let record = Record {
            record_type: "CNAME".into(),
            host: "www".into(),
            points_to: "%target".into(),
            ..Default::default()
        };
        let config = crate::lint::config::ValidationConfig::new();
        let ctx = RecordContext::new(&template, &record, 0, &config);
        let mut report = Report::new();
        PlaceholderSyntaxRule.check(&ctx, &mut report);

        assert_eq!(report.severity(), Severity::Error);
        assert_eq!(report.diagnostics()[0].get("field"), Some("pointsTo"));
    }
}
