//! Domain Connect service provider template model.
//!
//! The structs mirror the wire format one to one. Field order here is the
//! field order of the canonical output.

pub mod canonical;
pub mod decode;
pub mod numeric;

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use canonical::to_canonical;
pub use decode::{Decoded, decode};
pub use numeric::Numeric;

/// Largest TTL, priority and weight a template may carry (2^31 - 1)
pub const MAX_31BIT: i64 = (1 << 31) - 1;

/// Largest SRV port (2^16 - 1)
pub const MAX_PORT: i64 = (1 << 16) - 1;

/// A text holds a placeholder when it has at least two `%` characters
#[must_use]
pub fn is_variable(s: &str) -> bool {
    s.bytes().filter(|&b| b == b'%').count() > 1
}

/// Top-level template document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Template {
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Numeric>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variable_description: String,
    /// Deprecated, kept in sync with `shared_provider_name`
    #[serde(default, skip_serializing_if = "is_false")]
    pub shared: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sync_block: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub shared_provider_name: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub shared_service_name: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sync_pub_key_domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sync_redirect_domain: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multi_instance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub warn_phishing: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub host_required: bool,
    #[serde(default)]
    pub records: Vec<Record>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl Template {
    /// File name the template must be published under
    #[must_use]
    pub fn expected_file_name(&self) -> String {
        format!(
            "{}.{}.json",
            self.provider_id.to_lowercase(),
            self.service_id.to_lowercase()
        )
    }

    /// Increase a literal version by one; an unset version becomes 1
    pub fn bump_version(&mut self) {
        match &mut self.version {
            Some(Numeric::Concrete(value)) => *value = value.saturating_add(1),
            Some(Numeric::Placeholder(_)) => {}
            None => self.version = Some(Numeric::Concrete(1)),
        }
    }

    /// Set both sharing flags, the deprecated one included
    pub fn normalize_shared_flags(&mut self) {
        if self.shared || self.shared_provider_name {
            self.shared = true;
            self.shared_provider_name = true;
        }
    }

    /// Remove whitespace from the sync domain fields
    pub fn strip_sync_whitespace(&mut self) {
        self.sync_pub_key_domain = strip_whitespace(&self.sync_pub_key_domain);
        self.sync_redirect_domain = strip_whitespace(&self.sync_redirect_domain);
    }
}

/// Drop every whitespace character, inner ones included
#[must_use]
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One DNS record template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Record {
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub essential: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub points_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Numeric>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub txt_conflict_matching_mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub txt_conflict_matching_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Numeric>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spf_rules: String,
}

impl Record {
    #[must_use]
    pub fn kind(&self) -> RecordType {
        RecordType::classify(&self.record_type)
    }

    /// Content fingerprint over every field of the record
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        // Serializing a plain struct into a Vec cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        Sha256::digest(&bytes).into()
    }
}

/// Record type vocabulary, compared case-sensitively
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Ns,
    Txt,
    Mx,
    Srv,
    Spfm,
    ApexCname,
    Redir301,
    Redir302,
    /// Anything else; provider support unverified
    Other,
}

impl RecordType {
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "NS" => Self::Ns,
            "TXT" => Self::Txt,
            "MX" => Self::Mx,
            "SRV" => Self::Srv,
            "SPFM" => Self::Spfm,
            "APEXCNAME" => Self::ApexCname,
            "REDIR301" => Self::Redir301,
            "REDIR302" => Self::Redir302,
            _ => Self::Other,
        }
    }

    /// Types that end up as a DNS resource record with its own TTL
    #[must_use]
    pub const fn requires_ttl(self) -> bool {
        matches!(
            self,
            Self::A
                | Self::Aaaa
                | Self::Cname
                | Self::Ns
                | Self::Txt
                | Self::Mx
                | Self::Srv
        )
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Ns => "NS",
            Self::Txt => "TXT",
            Self::Mx => "MX",
            Self::Srv => "SRV",
            Self::Spfm => "SPFM",
            Self::ApexCname => "APEXCNAME",
            Self::Redir301 => "REDIR301",
            Self::Redir302 => "REDIR302",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}
