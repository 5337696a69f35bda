//! Template decoding.
//!
//! Decoding is all-or-nothing: malformed JSON, an unknown key or a wrongly
//! typed field fails the whole document. Quoted integers are accepted and
//! come back as explicit advisories next to the decoded template.

use serde_json::Value;

use super::Template;
use super::numeric::Numeric;
use crate::error::{LintError, Result};
use crate::lint::diagnostic::{Code, Diagnostic};

const RECORD_NUMERIC_FIELDS: [&str; 4] = ["ttl", "priority", "weight", "port"];

/// A decoded template plus the advisories raised while decoding it
#[derive(Debug, Clone)]
pub struct Decoded {
    pub template: Template,
    pub advisories: Vec<Diagnostic>,
}

/// Decode a template from raw JSON bytes
pub fn decode(input: &[u8]) -> Result<Decoded> {
    let value: Value = serde_json::from_slice(input)?;
    let advisories = quoted_integers(&value);
    let template = serde_json::from_value::<Template>(value)
        .map_err(|err| LintError::Decode(err.to_string()))?;
    Ok(Decoded {
        template,
        advisories,
    })
}

fn quoted_integers(value: &Value) -> Vec<Diagnostic> {
    let mut advisories = Vec::new();

    if let Some(raw) = value.get("version").and_then(Value::as_str) {
        if Numeric::is_quoted_integer(raw) {
            advisories.push(
                Diagnostic::warn(Code::QuotedInteger)
                    .with("field", "version")
                    .with("value", raw),
            );
        }
    }

    let records = value
        .get("records")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (index, record) in records.iter().enumerate() {
        for field in RECORD_NUMERIC_FIELDS {
            if let Some(raw) = record.get(field).and_then(Value::as_str) {
                if Numeric::is_quoted_integer(raw) {
                    advisories.push(
                        Diagnostic::warn(Code::QuotedInteger)
                            .with("record", index)
                            .with("field", field)
                            .with("value", raw),
                    );
                }
            }
        }
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::severity::Severity;

    #[test]
    fn test_decode_minimal() {
        let decoded = decode(
            br#"{"providerId":"example.com","providerName":"Example","serviceId":"web",
                "serviceName":"Web","records":[{"type":"A","host":"@","pointsTo":"192.0.2.1","ttl":3600}]}"#,
        )
        .unwrap();

        assert!(decoded.advisories.is_empty());
        assert_eq!(decoded.template.provider_id, "example.com");
        assert_eq!(decoded.template.records.len(), 1);
        assert_eq!(decoded.template.records[0].ttl, Some(Numeric::Concrete(3600)));
    }

    #[test]
    fn test_quoted_integers_are_advisories() {
        let decoded = decode(
            br#"{"providerId":"p","serviceId":"s","version":"3",
                "records":[{"type":"MX","host":"@","pointsTo":"mx.example.com","ttl":"600","priority":"10"}]}"#,
        )
        .unwrap();

        assert_eq!(decoded.template.version, Some(Numeric::Concrete(3)));
        assert_eq!(decoded.template.records[0].priority, Some(Numeric::Concrete(10)));
        assert_eq!(decoded.advisories.len(), 3);
        assert!(
            decoded
                .advisories
                .iter()
                .all(|d| d.code == Code::QuotedInteger && d.severity == Severity::Warn)
        );
        assert_eq!(decoded.advisories[1].get("record"), Some("0"));
        assert_eq!(decoded.advisories[1].get("field"), Some("ttl"));
    }

    #[test]
    fn test_placeholder_is_not_an_advisory() {
        let decoded = decode(br#"{"records":[{"type":"TXT","ttl":"%ttl%"}]}"#).unwrap();
        assert!(decoded.advisories.is_empty());
        assert_eq!(
            decoded.template.records[0].ttl,
            Some(Numeric::Placeholder("%ttl%".to_string()))
        );
    }

    #[test]
    fn test_unknown_top_level_key_fails() {
        let err = decode(br#"{"providerId":"p","bogus":true,"records":[]}"#).unwrap_err();
        assert!(matches!(err, LintError::Decode(_)));
    }

    #[test]
    fn test_unknown_record_key_fails() {
        let err = decode(br#"{"records":[{"type":"A","colour":"blue"}]}"#).unwrap_err();
        assert!(matches!(err, LintError::Decode(_)));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(decode(b"{\"records\":["), Err(LintError::Json(_))));
    }

    #[test]
    fn test_wrong_type_fails() {
        assert!(decode(br#"{"providerId":42}"#).is_err());
        assert!(decode(br#"{"records":[{"type":"A","ttl":"soon"}]}"#).is_err());
    }
}
