//! Validation engine for running rules against templates.

use std::collections::HashSet;
use std::path::Path;

use crate::probe::LogoProbe;
use crate::template::{Numeric, Template, decode};

use super::config::{RecordContext, TemplateContext, ValidationConfig};
use super::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use super::rule::{BoxedRecordRule, BoxedTemplateRule};
use super::rules::{self, CnameTracker, DuplicateDetector};

/// Result of checking one template source
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// The decoded and normalized template; `None` when decoding failed
    pub template: Option<Template>,
    /// All findings for this template
    pub report: Report,
}

/// Information about a registered rule
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    /// Runs per record rather than per template
    pub per_record: bool,
    /// Whether the rule runs under the engine's configuration
    pub enabled: bool,
}

/// The validation engine.
///
/// One engine spans a whole run: it owns the `(providerId, serviceId)`
/// collision set, which only grows. Per-template state (CNAME map and
/// duplicate fingerprints) is created fresh for every template.
pub struct LintEngine {
    config: ValidationConfig,
    template_rules: Vec<BoxedTemplateRule>,
    record_rules: Vec<BoxedRecordRule>,
    probe: Option<Box<dyn LogoProbe>>,
    collisions: HashSet<(String, String)>,
}

impl LintEngine {
    /// Create an engine with every built-in rule registered
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            template_rules: rules::template_rules(),
            record_rules: rules::record_rules(),
            probe: None,
            collisions: HashSet::new(),
        }
    }

    /// Create a new engine with default config
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Attach the logo reachability collaborator
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn LogoProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Decode and validate one template source.
    ///
    /// `path` is `None` for streams, which skips the file name check. A
    /// decode failure yields a single Fatal finding and no template.
    pub fn check_source(&mut self, source: &[u8], path: Option<&Path>) -> CheckOutcome {
        let name = path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let span = tracing::info_span!("template", template = %name);
        let _guard = span.enter();
        tracing::debug!("starting template check");

        let mut report = Report::new();
        let decoded = match decode(source) {
            Ok(decoded) => decoded,
            Err(err) => {
                report.push(Diagnostic::fatal(Code::JsonError).with("error", err));
                return CheckOutcome {
                    template: None,
                    report,
                };
            }
        };
        for advisory in decoded.advisories {
            report.push(advisory);
        }

        let mut template = decoded.template;
        report.absorb(self.validate(&mut template, path));
        tracing::debug!(severity = %report.severity(), "template check done");
        CheckOutcome {
            template: Some(template),
            report,
        }
    }

    /// Validate a decoded template.
    ///
    /// Afterwards the template carries the normalizations the rules apply
    /// (sharing flags, sync whitespace) and, on write-back, backfilled TTLs.
    pub fn validate(&mut self, template: &mut Template, path: Option<&Path>) -> Report {
        let mut report = Report::new();
        self.check_collision(template, &mut report);

        let mut ctx = TemplateContext::new(template, &self.config);
        if let Some(path) = path {
            ctx = ctx.with_file_path(path);
        }
        if let Some(probe) = self.probe.as_deref() {
            ctx = ctx.with_probe(probe);
        }
        for rule in self.active_template_rules() {
            rule.check(&ctx, &mut report);
        }
        self.check_records(template, &mut report);

        for rule in self.active_template_rules().filter(|rule| rule.can_fix()) {
            rule.fix(template);
        }
        self.backfill_ttl(template);
        report
    }

    fn active_template_rules(&self) -> impl Iterator<Item = &BoxedTemplateRule> {
        self.template_rules
            .iter()
            .filter(|rule| rule.applies(&self.config))
    }

    fn check_collision(&mut self, template: &Template, report: &mut Report) {
        let key = (
            template.provider_id.to_lowercase(),
            template.service_id.to_lowercase(),
        );
        if !self.collisions.insert(key) {
            report.push(
                Diagnostic::error(Code::DuplicateId)
                    .with("providerId", &template.provider_id)
                    .with("serviceId", &template.service_id),
            );
        }
    }

    fn check_records(&self, template: &Template, report: &mut Report) {
        let mut cnames = CnameTracker::new();
        let mut duplicates = DuplicateDetector::new();

        for (index, record) in template.records.iter().enumerate() {
            let span = tracing::debug_span!(
                "record",
                record = index,
                kind = %record.record_type,
                group_id = %record.group_id,
            );
            let _guard = span.enter();
            tracing::trace!(host = %record.host, "check record");

            let ctx = RecordContext::new(template, record, index, &self.config);
            duplicates.check(&ctx, report);
            cnames.check(&ctx, report);
            for rule in self
                .record_rules
                .iter()
                .filter(|rule| rule.applies(&self.config))
            {
                rule.check(&ctx, report);
            }
        }
    }

    fn backfill_ttl(&self, template: &mut Template) {
        let Some(ttl) = self.config.backfill_ttl() else {
            return;
        };
        for (index, record) in template.records.iter_mut().enumerate() {
            let placeholder = record.ttl.as_ref().is_some_and(Numeric::is_placeholder);
            if placeholder && record.kind().requires_ttl() {
                tracing::info!(record = index, ttl, "adding ttl to the record");
                record.ttl = Some(Numeric::Concrete(i64::from(ttl)));
            }
        }
    }

    /// List all registered rules
    #[must_use]
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        let templates = self.template_rules.iter().map(|r| RuleInfo {
            id: r.id(),
            name: r.name(),
            description: r.description(),
            category: r.category(),
            per_record: false,
            enabled: r.applies(&self.config),
        });
        let records = self.record_rules.iter().map(|r| RuleInfo {
            id: r.id(),
            name: r.name(),
            description: r.description(),
            category: r.category(),
            per_record: true,
            enabled: r.applies(&self.config),
        });
        templates.chain(records).collect()
    }
}
