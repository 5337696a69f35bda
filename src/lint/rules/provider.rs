//! Cloudflare restrictions.
//!
//! Enabled with the `cloudflare` switch. These rules only add findings on
//! top of the base rule set.

use crate::lint::config::{RecordContext, TemplateContext, ValidationConfig};
use crate::lint::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use crate::lint::rule::{RecordRule, TemplateRule};
use crate::template::RecordType;

/// Template flags Cloudflare rejects or ignores.
pub struct CloudflareTemplateRule;

impl TemplateRule for CloudflareTemplateRule {
    fn id(&self) -> &'static str {
        "cloudflare-template"
    }

    fn name(&self) -> &'static str {
        "Cloudflare Template"
    }

    fn description(&self) -> &'static str {
        "Cloudflare requires syncPubKeyDomain and supports a subset of the template flags"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Provider
    }

    fn applies(&self, config: &ValidationConfig) -> bool {
        config.cloudflare
    }

    fn check(&self, ctx: &TemplateContext<'_>, report: &mut Report) {
        let template = ctx.template;
        if template.sync_block {
            report.push(Diagnostic::error(Code::CfSyncBlock));
        }
        if template.sync_pub_key_domain.is_empty() {
            report.push(Diagnostic::error(Code::CfSyncPubKey));
        }

        let unsupported = [
            (template.shared_service_name, Code::CfSharedServiceName),
            (!template.sync_redirect_domain.is_empty(), Code::CfSyncRedirect),
            (template.multi_instance, Code::CfMultiInstance),
            (template.warn_phishing, Code::CfWarnPhishing),
            (template.host_required, Code::CfHostRequired),
        ];
        for (set, code) in unsupported {
            if set {
                report.push(Diagnostic::info(code));
            }
        }
    }
}

/// Record features Cloudflare handles differently.
pub struct CloudflareRecordRule;

impl RecordRule for CloudflareRecordRule {
    fn id(&self) -> &'static str {
        "cloudflare-record"
    }

    fn name(&self) -> &'static str {
        "Cloudflare Record"
    }

    fn description(&self) -> &'static str {
        "Apex CNAMEs, conflict matching, zero TTLs and essential are not honoured by Cloudflare"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Provider
    }

    fn applies(&self, config: &ValidationConfig) -> bool {
        config.cloudflare
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let record = ctx.record;
        let kind = record.kind();
        match kind {
            RecordType::Cname | RecordType::Ns if record.host == "@" => {
                report.push(ctx.locate(Diagnostic::info(Code::CfFlattening)));
            }
            RecordType::Txt => {
                if !record.txt_conflict_matching_mode.is_empty() {
                    report.push(
                        ctx.locate(Diagnostic::info(Code::CfConflictMatching))
                            .with("key", "txtConflictMatchingMode"),
                    );
                }
                if !record.txt_conflict_matching_prefix.is_empty() {
                    report.push(
                        ctx.locate(Diagnostic::info(Code::CfConflictMatching))
                            .with("key", "txtConflictMatchingPrefix"),
                    );
                }
            }
            RecordType::ApexCname => report.push(ctx.locate(Diagnostic::info(Code::CfApexCname))),
            _ => {}
        }

        let zero_ttl = record.ttl.as_ref().and_then(|ttl| ttl.concrete()) == Some(0);
        if zero_ttl && kind.requires_ttl() {
            report.push(ctx.locate(Diagnostic::info(Code::CfZeroTtl)));
        }
        if !record.essential.is_empty() {
            report.push(ctx.locate(Diagnostic::info(Code::CfEssential)));
        }
    }
}
