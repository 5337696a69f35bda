//! Validation configuration and rule contexts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use crate::probe::LogoProbe;
use crate::template::{Record, Template};

/// Configuration for validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Layer the Cloudflare restrictions on top of the base rules
    #[serde(default)]
    pub cloudflare: bool,

    /// Ask the logo probe about `logoUrl`
    #[serde(default)]
    pub check_logos: bool,

    /// The checked document will be written back
    #[serde(default)]
    pub write_back: bool,

    /// TTL substituted for placeholder TTLs on write-back, 0 disables
    #[serde(default)]
    pub ttl_default: u32,
}

impl ValidationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the Cloudflare rule set
    #[must_use]
    pub const fn cloudflare(mut self) -> Self {
        self.cloudflare = true;
        self
    }

    /// Enable logo reachability checks
    #[must_use]
    pub const fn check_logos(mut self) -> Self {
        self.check_logos = true;
        self
    }

    /// Mark the run as writing canonical output
    #[must_use]
    pub const fn write_back(mut self) -> Self {
        self.write_back = true;
        self
    }

    #[must_use]
    pub const fn with_ttl_default(mut self, ttl: u32) -> Self {
        self.ttl_default = ttl;
        self
    }

    /// TTL to backfill placeholder TTLs with, if any
    #[must_use]
    pub const fn backfill_ttl(&self) -> Option<u32> {
        if self.write_back && self.ttl_default > 0 {
            Some(self.ttl_default)
        } else {
            None
        }
    }
}

/// Context provided to template-level rules
pub struct TemplateContext<'a> {
    /// The template being validated
    pub template: &'a Template,

    /// Configuration for validation
    pub config: &'a ValidationConfig,

    /// Path of the template file; `None` for streams
    pub file_path: Option<&'a Path>,

    /// Logo reachability collaborator
    pub probe: Option<&'a dyn LogoProbe>,
}

impl<'a> TemplateContext<'a> {
    #[must_use]
    pub const fn new(template: &'a Template, config: &'a ValidationConfig) -> Self {
        Self {
            template,
            config,
            file_path: None,
            probe: None,
        }
    }

    #[must_use]
    pub const fn with_file_path(mut self, path: &'a Path) -> Self {
        self.file_path = Some(path);
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: &'a dyn LogoProbe) -> Self {
        self.probe = Some(probe);
        self
    }
}

/// Context provided to record-level rules
pub struct RecordContext<'a> {
    /// The template owning the record
    pub template: &'a Template,

    pub record: &'a Record,

    /// Position of the record in `records`
    pub index: usize,

    pub config: &'a ValidationConfig,
}

impl<'a> RecordContext<'a> {
    #[must_use]
    pub const fn new(
        template: &'a Template,
        record: &'a Record,
        index: usize,
        config: &'a ValidationConfig,
    ) -> Self {
        Self {
            template,
            record,
            index,
            config,
        }
    }

    /// Attach the record location to a finding
    #[must_use]
    pub fn locate(&self, diagnostic: Diagnostic) -> Diagnostic {
        let mut located = diagnostic
            .with("record", self.index)
            .with("type", &self.record.record_type);
        if !self.record.group_id.is_empty() {
            located = located.with("groupId", &self.record.group_id);
        }
        located.with("host", &self.record.host)
    }
}
