//! SPF rule text grammar for SPFM records.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{Code, Diagnostic};
use crate::template::is_variable;

static MODIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9_.-]*)=(.*)").expect("valid regex"));

const MECHANISMS: [&str; 7] = ["include", "a", "mx", "ptr", "ip4", "ip6", "exists"];

fn strip_qualifier(field: &str) -> &str {
    field
        .strip_prefix(['+', '-', '~', '?'])
        .unwrap_or(field)
}

fn mechanism_keyword(field: &str) -> &str {
    let field = strip_qualifier(field);
    field.find([':', '/']).map_or(field, |end| &field[..end])
}

#[derive(Default)]
struct Seen {
    redirect: bool,
    exp: bool,
}

/// Check SPF rule text, returning the findings in field order
#[must_use]
pub fn check_rules(rules: &str) -> Vec<Diagnostic> {
    let rules = rules.to_lowercase();
    let mut found = Vec::new();

    let fields: Vec<&str> = rules.split_whitespace().collect();
    let Some((&last, _)) = fields.split_last() else {
        found.push(Diagnostic::error(Code::EmptyKey).with("key", "spfRules"));
        return found;
    };

    let leading_version = rules.starts_with("v=spf1");
    if leading_version {
        found.push(Diagnostic::error(Code::SpfInvalid).with("data", "v=spf1"));
    }
    let trailing_all = strip_qualifier(last) == "all";
    if trailing_all {
        found.push(Diagnostic::error(Code::SpfInvalid).with("data", last));
    }

    let mut seen = Seen::default();
    for (index, field) in fields.iter().copied().enumerate() {
        if (index == 0 && leading_version) || (index == fields.len() - 1 && trailing_all) {
            continue;
        }
        if is_variable(field) {
            continue;
        }

        if let Some(captures) = MODIFIER_REGEX.captures(field) {
            let name = captures.get(1).map_or("", |m| m.as_str());
            let flag = match name {
                "redirect" => &mut seen.redirect,
                "exp" => &mut seen.exp,
                _ => {
                    found.push(Diagnostic::error(Code::SpfInvalid).with("modifier", name));
                    continue;
                }
            };
            if *flag {
                found.push(Diagnostic::error(Code::SpfDuplicate).with("field", name));
            }
            *flag = true;
            continue;
        }

        let keyword = mechanism_keyword(field);
        if !MECHANISMS.contains(&keyword) {
            found.push(Diagnostic::error(Code::SpfInvalid).with("mechanism", field));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::severity::{Severity, combine_all};

    fn severity(rules: &str) -> Severity {
        combine_all(check_rules(rules).iter().map(|d| d.severity))
    }

    #[test]
    fn test_valid_rules() {
        assert_eq!(severity("include:_spf.example.com"), Severity::Ok);
        assert_eq!(
            severity("a mx ip4:192.0.2.0/24 ip6:2001:db8::/32 ~include:%spf%"),
            Severity::Ok
        );
        assert_eq!(severity("a/24 exp=explain.example.com"), Severity::Ok);
        assert_eq!(severity("%rules%"), Severity::Ok);
    }

    #[test]
    fn test_trailing_all_rejected() {
        let found = check_rules("include:_spf.example.com ~all");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, Code::SpfInvalid);
        assert_eq!(found[0].get("data"), Some("~all"));
    }

    #[test]
    fn test_version_prefix_rejected() {
        let found = check_rules("v=spf1 include:_spf.example.com");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("data"), Some("v=spf1"));
    }

    #[test]
    fn test_duplicate_modifier() {
        let found = check_rules("redirect=_spf.example.com redirect=_spf2.example.com");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, Code::SpfDuplicate);
        assert_eq!(found[0].get("field"), Some("redirect"));
    }

    #[test]
    fn test_unknown_modifier_and_mechanism() {
        let found = check_rules("foo=bar include:x.example.com bogus");
        let codes: Vec<Code> = found.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![Code::SpfInvalid, Code::SpfInvalid]);
        assert_eq!(found[0].get("modifier"), Some("foo"));
        assert_eq!(found[1].get("mechanism"), Some("bogus"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(severity("INCLUDE:_SPF.Example.COM"), Severity::Ok);
        assert_eq!(severity("V=SPF1 a"), Severity::Error);
    }

    #[test]
    fn test_empty_rules() {
        let found = check_rules("   ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, Code::EmptyKey);
    }
}
