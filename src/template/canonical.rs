//! Canonical re-serialization.
//!
//! Output uses struct field order, drops empty optional fields and ends with
//! a newline. Serializing the decoded canonical form again yields the same
//! bytes.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::Template;
use crate::error::{LintError, Result};

/// Render a template with `indent` spaces per nesting level
pub fn to_canonical(template: &Template, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    template.serialize(&mut serializer)?;
    out.push(b'\n');
    String::from_utf8(out).map_err(|err| LintError::Serialization(err.to_string()))
}
