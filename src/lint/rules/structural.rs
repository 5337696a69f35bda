//! Structural validation rules for templates.
//!
//! These rules check template-wide metadata: identifiers, file naming,
//! versioning, sharing flags and sync settings. None of them look inside
//! individual records except to count or compare their group ids.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lint::config::{TemplateContext, ValidationConfig};
use crate::lint::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use crate::lint::rule::TemplateRule;
use crate::template::{Numeric, Template, is_variable, strip_whitespace};

static FQDN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.?$")
        .expect("valid regex")
});

/// Fully qualified name with at least one label separator
#[must_use]
pub fn is_fqdn(name: &str) -> bool {
    name.len() <= 253 && FQDN_REGEX.is_match(name)
}

fn has_invalid_id_chars(id: &str) -> bool {
    !id.chars().all(|c| {
        let c = c.to_ascii_lowercase();
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_')
    })
}

/// Rule that checks identifier characters.
pub struct IdCharsRule;

impl TemplateRule for IdCharsRule {
    fn id(&self) -> &'static str {
        "id-chars"
    }

    fn name(&self) -> &'static str {
        "Identifier Characters"
    }

    fn description(&self) -> &'static str {
        "providerId and serviceId use only [a-z0-9_.-]"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        for (field, value) in [
            ("providerId", &template.provider_id),
            ("serviceId", &template.service_id),
        ] {
            if has_invalid_id_chars(value) {
                report.push(
                    Diagnostic::error(Code::InvalidIdChars)
                        .with("field", field)
                        .with("value", value),
                );
            }
        }
    }
}

/// Rule that checks the published file name.
pub struct FileNameRule;

impl TemplateRule for FileNameRule {
    fn id(&self) -> &'static str {
        "file-name"
    }

    fn name(&self) -> &'static str {
        "File Name"
    }

    fn description(&self) -> &'static str {
        "Template files are named <providerId>.<serviceId>.json in lower case"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let Some(path) = ctx.file_path else {
            return;
        };
        let expected = ctx.template.expected_file_name();
        let actual = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        if actual != expected {
            report.push(
                Diagnostic::error(Code::FileName)
                    .with("expected", &expected)
                    .with("found", actual),
            );
        }
    }
}

/// Rule that checks field lengths.
pub struct FieldConstraintsRule;

impl TemplateRule for FieldConstraintsRule {
    fn id(&self) -> &'static str {
        "field-constraints"
    }

    fn name(&self) -> &'static str {
        "Field Constraints"
    }

    fn description(&self) -> &'static str {
        "Identifiers and names are present and within their length limits"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        let limits = [
            ("providerId", template.provider_id.as_str(), 1, 64),
            ("providerName", template.provider_name.as_str(), 1, 64),
            ("serviceId", template.service_id.as_str(), 1, 64),
            ("serviceName", template.service_name.as_str(), 1, 255),
            ("syncPubKeyDomain", template.sync_pub_key_domain.as_str(), 0, 255),
        ];
        for (field, value, min, max) in limits {
            let len = value.chars().count();
            if !(min..=max).contains(&len) {
                report.push(
                    Diagnostic::warn(Code::FieldValidation)
                        .with("field", field)
                        .with("constraint", format!("length {min}..{max}"))
                        .with("length", len),
                );
            }
        }
    }
}

/// Rule that recommends explicit positive versions.
pub struct VersionRule;

impl TemplateRule for VersionRule {
    fn id(&self) -> &'static str {
        "version"
    }

    fn name(&self) -> &'static str {
        "Version"
    }

    fn description(&self) -> &'static str {
        "Templates should carry a positive integer version"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        match &ctx.template.version {
            Some(Numeric::Concrete(value)) if *value > 0 => {}
            Some(version) => report.push(Diagnostic::info(Code::Version).with("version", version)),
            None => report.push(Diagnostic::info(Code::Version).with("version", "unset")),
        }
    }
}

/// Rule that keeps `shared` and `sharedProviderName` in step.
pub struct SharedFlagsRule;

impl TemplateRule for SharedFlagsRule {
    fn id(&self) -> &'static str {
        "shared-flags"
    }

    fn name(&self) -> &'static str {
        "Shared Flags"
    }

    fn description(&self) -> &'static str {
        "The deprecated shared flag must be paired with sharedProviderName"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        match (template.shared, template.shared_provider_name) {
            (true, false) => report.push(Diagnostic::error(Code::SharedDeprecated)),
            (false, true) => report.push(Diagnostic::info(Code::SharedCompat)),
            _ => {}
        }
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, template: &mut Template) {
        template.normalize_shared_flags();
    }
}

/// Rule that rejects placeholders in display names.
pub struct DisplayNamesRule;

impl TemplateRule for DisplayNamesRule {
    fn id(&self) -> &'static str {
        "display-names"
    }

    fn name(&self) -> &'static str {
        "Display Names"
    }

    fn description(&self) -> &'static str {
        "providerName and serviceName must not be variable"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        for (field, value) in [
            ("providerName", &template.provider_name),
            ("serviceName", &template.service_name),
        ] {
            if is_variable(value) {
                report.push(
                    Diagnostic::error(Code::VariableContext)
                        .with("field", field)
                        .with("value", value),
                );
            }
        }
    }
}

/// Rule that asks the logo probe about `logoUrl`.
pub struct LogoRule;

impl TemplateRule for LogoRule {
    fn id(&self) -> &'static str {
        "logo-url"
    }

    fn name(&self) -> &'static str {
        "Logo URL"
    }

    fn description(&self) -> &'static str {
        "logoUrl should be reachable"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn applies(&self, config: &ValidationConfig) -> bool {
        config.check_logos
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let url = ctx.template.logo_url.as_str();
        let Some(probe) = ctx.probe else {
            return;
        };
        if url.is_empty() {
            return;
        }
        if let Err(err) = probe.check(url) {
            report.push(
                Diagnostic::warn(Code::LogoCheck)
                    .with("logoUrl", url)
                    .with("error", err),
            );
        }
    }
}

/// Rule that checks the sync domain fields.
pub struct SyncDomainsRule;

impl TemplateRule for SyncDomainsRule {
    fn id(&self) -> &'static str {
        "sync-domains"
    }

    fn name(&self) -> &'static str {
        "Sync Domains"
    }

    fn description(&self) -> &'static str {
        "syncPubKeyDomain and syncRedirectDomain hold whitespace free host names"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        for (field, raw) in [
            ("syncPubKeyDomain", &template.sync_pub_key_domain),
            ("syncRedirectDomain", &template.sync_redirect_domain),
        ] {
            if raw.chars().any(char::is_whitespace) {
                report.push(
                    Diagnostic::warn(Code::SyncWhitespace)
                        .with("field", field)
                        .with("value", raw),
                );
            }
        }

        let pub_key = strip_whitespace(&template.sync_pub_key_domain);
        if !pub_key.is_empty() && !is_fqdn(&pub_key) {
            report.push(
                Diagnostic::error(Code::InvalidHostname)
                    .with("field", "syncPubKeyDomain")
                    .with("value", &pub_key),
            );
        }
        let redirects = strip_whitespace(&template.sync_redirect_domain);
        for domain in redirects.split(',').filter(|d| !d.is_empty()) {
            if !is_fqdn(domain) {
                report.push(
                    Diagnostic::error(Code::InvalidHostname)
                        .with("field", "syncRedirectDomain")
                        .with("value", domain),
                );
            }
        }
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, template: &mut Template) {
        template.strip_sync_whitespace();
    }
}

/// Rule that flags redundant or under-specified sync flag combinations.
pub struct SyncCombinationRule;

impl TemplateRule for SyncCombinationRule {
    fn id(&self) -> &'static str {
        "sync-combination"
    }

    fn name(&self) -> &'static str {
        "Sync Combination"
    }

    fn description(&self) -> &'static str {
        "syncBlock, syncPubKeyDomain and warnPhishing should agree"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        let has_pub_key = !template.sync_pub_key_domain.trim().is_empty();
        if template.warn_phishing && has_pub_key {
            report.push(Diagnostic::info(Code::PhishingRedundant));
        }
        if !template.sync_block && !has_pub_key {
            report.push(Diagnostic::info(Code::SyncPubKeyMissing));
        }
    }
}

/// Rule that requires at least one record.
pub struct NoRecordsRule;

impl TemplateRule for NoRecordsRule {
    fn id(&self) -> &'static str {
        "no-records"
    }

    fn name(&self) -> &'static str {
        "Records Present"
    }

    fn description(&self) -> &'static str {
        "A template must define at least one record"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        if ctx.template.records.is_empty() {
            report.push(Diagnostic::error(Code::NoRecords));
        }
    }
}

/// Rule that compares group ids across records.
pub struct GroupIdsRule;

impl TemplateRule for GroupIdsRule {
    fn id(&self) -> &'static str {
        "group-ids"
    }

    fn name(&self) -> &'static str {
        "Group IDs"
    }

    fn description(&self) -> &'static str {
        "groupId is set on all records or none, and distinguishes something when set"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let records = &ctx.template.records;
        let unset = records.iter().filter(|r| r.group_id.is_empty()).count();
        let distinct: HashSet<&str> = records
            .iter()
            .filter(|r| !r.group_id.is_empty())
            .map(|r| r.group_id.as_str())
            .collect();

        if unset > 0 && !distinct.is_empty() {
            report.push(Diagnostic::warn(Code::MixedGroupIds).with("unset", unset));
        } else if records.len() > 1 && distinct.len() == 1 {
            let group = distinct.iter().next().copied().unwrap_or_default();
            report.push(Diagnostic::info(Code::SameGroupIds).with("groupId", group));
        }
    }
}

/// Returns all structural validation rules.
#[must_use]
pub fn structural_rules() -> Vec<Box<dyn TemplateRule>> {
    vec![
        Box::new(IdCharsRule),
        Box::new(FileNameRule),
        Box::new(FieldConstraintsRule),
        Box::new(VersionRule),
        Box::new(SharedFlagsRule),
        Box::new(DisplayNamesRule),
        Box::new(LogoRule),
        Box::new(SyncDomainsRule),
        Box::new(SyncCombinationRule),
        Box::new(NoRecordsRule),
        Box::new(GroupIdsRule),
    ]
}
