//! Underscore-prefixed host labels (RFC 8552 attribute leaves).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::lint::config::RecordContext;
use crate::lint::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use crate::lint::rule::RecordRule;

/// DNS types that may appear in the registry
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RegistryType {
    Ns,
    Cname,
    Null,
    Txt,
    Srv,
    Tlsa,
    Smimea,
    OpenPgpKey,
    Svcb,
    Https,
    Uri,
}

impl RegistryType {
    /// Map a template record type, compared case-insensitively
    #[must_use]
    pub fn from_record_type(raw: &str) -> Option<Self> {
        let kind = match raw.to_ascii_uppercase().as_str() {
            "NS" => Self::Ns,
            "CNAME" => Self::Cname,
            "NULL" => Self::Null,
            "TXT" => Self::Txt,
            "SRV" => Self::Srv,
            "TLSA" => Self::Tlsa,
            "SMIMEA" => Self::Smimea,
            "OPENPGPKEY" => Self::OpenPgpKey,
            "SVCB" => Self::Svcb,
            "HTTPS" => Self::Https,
            "URI" => Self::Uri,
            _ => return None,
        };
        Some(kind)
    }

    /// Delegation types are allowed under every registered label
    #[must_use]
    pub const fn is_delegation(self) -> bool {
        matches!(self, Self::Ns | Self::Cname)
    }
}

use RegistryType::{Https, Null, OpenPgpKey, Smimea, Srv, Svcb, Tlsa, Txt, Uri};

const REGISTRY: &[(&str, &[RegistryType])] = &[
    ("_acct", &[Uri]),
    ("_acme-challenge", &[Txt]),
    ("_dane", &[Tlsa]),
    ("_dccp", &[Srv, Uri]),
    ("_dmarc", &[Txt]),
    ("_dns", &[Svcb]),
    ("_domainkey", &[Txt]),
    ("_email", &[Uri]),
    ("_ems", &[Uri]),
    ("_fax", &[Uri]),
    ("_ft", &[Uri]),
    ("_h323", &[Uri]),
    ("_https", &[Https]),
    ("_http", &[Srv]),
    ("_iax", &[Uri]),
    ("_ical-access", &[Uri]),
    ("_ical-sched", &[Uri]),
    ("_ifax", &[Uri]),
    ("_im", &[Uri]),
    ("_ipv6", &[Srv]),
    ("_ldap", &[Srv]),
    ("_mms", &[Uri]),
    ("_mta-sts", &[Txt]),
    ("_ocsp", &[Srv]),
    ("_openpgpkey", &[OpenPgpKey]),
    ("_pres", &[Uri]),
    ("_pstn", &[Uri]),
    ("_sctp", &[Srv, Tlsa, Uri]),
    ("_sip", &[Srv, Uri]),
    ("_smimecert", &[Smimea]),
    ("_sms", &[Uri]),
    ("_spf", &[Txt]),
    ("_sztp", &[Txt]),
    ("_ta-*", &[Null]),
    ("_tcp", &[Txt, Srv, Tlsa, Uri]),
    ("_udp", &[Txt, Srv, Tlsa, Uri]),
    ("_unifmsg", &[Uri]),
    ("_validation-contactemail", &[Txt]),
    ("_validation-contactphone", &[Txt]),
    ("_vcard", &[Uri]),
    ("_videomsg", &[Uri]),
    ("_voicemsg", &[Uri]),
    ("_voice", &[Uri]),
    ("_vouch", &[Txt]),
    ("_vpim", &[Uri]),
    ("_web", &[Uri]),
    ("_xmpp", &[Srv, Uri]),
];

/// Registered underscored labels and the types allowed beneath them
pub static RESERVED_LABELS: LazyLock<HashMap<&'static str, &'static [RegistryType]>> =
    LazyLock::new(|| REGISTRY.iter().copied().collect());

/// Registry entry for a label, `_ta-<key tag>` included
#[must_use]
pub fn lookup(label: &str) -> Option<&'static [RegistryType]> {
    let label = label.to_ascii_lowercase();
    let key = if label.starts_with("_ta-") { "_ta-*" } else { label.as_str() };
    RESERVED_LABELS.get(key).copied()
}

/// Underscore outside any `%placeholder%` span
#[must_use]
pub fn has_literal_underscore(label: &str) -> bool {
    let mut inside = false;
    for c in label.chars() {
        if c == '%' {
            inside = !inside;
        } else if c == '_' && !inside {
            return true;
        }
    }
    false
}

/// Findings for every label of `host` under a record of type `record_type`
#[must_use]
pub fn check_host(record_type: &str, host: &str) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for label in host.split('.') {
        if !label.starts_with('_') {
            if has_literal_underscore(label) {
                found.push(Diagnostic::info(Code::UnderscoreLabel).with("label", label));
            }
            continue;
        }

        let Some(allowed) = lookup(label) else {
            found.push(Diagnostic::debug(Code::ReservedLabel).with("label", label));
            continue;
        };
        let permitted = RegistryType::from_record_type(record_type)
            .is_some_and(|kind| kind.is_delegation() || allowed.contains(&kind));
        if !permitted {
            found.push(Diagnostic::info(Code::ReservedLabel).with("label", label));
        }
    }
    found
}

/// Reserved-label registry check on the record host.
pub struct ReservedLabelRule;

impl RecordRule for ReservedLabelRule {
    fn id(&self) -> &'static str {
        "reserved-label"
    }

    fn name(&self) -> &'static str {
        "Reserved Label"
    }

    fn description(&self) -> &'static str {
        "Underscored host labels must carry a record type their registration allows"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        for diagnostic in check_host(&ctx.record.record_type, &ctx.record.host) {
            report.push(ctx.locate(diagnostic));
        }
    }
}
