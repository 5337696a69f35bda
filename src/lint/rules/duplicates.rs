//! Field-for-field duplicate records within one template.

use std::collections::HashSet;

use crate::lint::config::RecordContext;
use crate::lint::diagnostic::{Code, Diagnostic, Report};

/// Per-template set of record fingerprints.
///
/// Create one per template; the first occurrence of a record is recorded,
/// later identical ones are reported.
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    seen: HashSet<[u8; 32]>,
}

impl DuplicateDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ctx: &RecordContext<'_>, report: &mut Report) {
        let fingerprint = ctx.record.fingerprint();
        if !self.seen.insert(fingerprint) {
            report.push(
                ctx.locate(Diagnostic::warn(Code::DuplicateRecord))
                    .with("fingerprint", &hex::encode(&fingerprint[..8])),
            );
        }
    }
}
