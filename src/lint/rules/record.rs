//! Per-record validation rules.
//!
//! Field requirements live in a static table keyed by record type; the
//! rules below consult it with ordinary conditionals.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::spf;
use crate::lint::config::RecordContext;
use crate::lint::diagnostic::{Code, Diagnostic, Report, RuleCategory};
use crate::lint::rule::RecordRule;
use crate::template::{MAX_31BIT, MAX_PORT, Numeric, Record, RecordType, is_variable};

/// A record field the requirement table can name
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Field {
    Host,
    Name,
    PointsTo,
    Data,
    Target,
    Service,
    SpfRules,
    Priority,
    Weight,
    Port,
}

impl Field {
    /// Wire name of the field
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Name => "name",
            Self::PointsTo => "pointsTo",
            Self::Data => "data",
            Self::Target => "target",
            Self::Service => "service",
            Self::SpfRules => "spfRules",
            Self::Priority => "priority",
            Self::Weight => "weight",
            Self::Port => "port",
        }
    }

    #[must_use]
    pub fn is_set(self, record: &Record) -> bool {
        match self {
            Self::Host => !record.host.is_empty(),
            Self::Name => !record.name.is_empty(),
            Self::PointsTo => !record.points_to.is_empty(),
            Self::Data => !record.data.is_empty(),
            Self::Target => !record.target.is_empty(),
            Self::Service => !record.service.is_empty(),
            Self::SpfRules => !record.spf_rules.is_empty(),
            Self::Priority => record.priority.is_some(),
            Self::Weight => record.weight.is_some(),
            Self::Port => record.port.is_some(),
        }
    }
}

/// Mutually exclusive target fields; a type uses at most one of them
pub const TARGET_FIELDS: [Field; 4] = [Field::Data, Field::Name, Field::PointsTo, Field::Target];

/// Field contract of one record type
#[derive(Debug)]
pub struct Requirement {
    pub kind: RecordType,
    /// Fields that must be present besides the target
    pub required: &'static [Field],
    /// The one target field this type uses; other target fields are extra
    pub target: Option<Field>,
}

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement {
        kind: RecordType::A,
        required: &[Field::Host],
        target: Some(Field::PointsTo),
    },
    Requirement {
        kind: RecordType::Aaaa,
        required: &[Field::Host],
        target: Some(Field::PointsTo),
    },
    Requirement {
        kind: RecordType::Cname,
        required: &[Field::Host],
        target: Some(Field::PointsTo),
    },
    Requirement {
        kind: RecordType::Ns,
        required: &[Field::Host],
        target: Some(Field::PointsTo),
    },
    Requirement {
        kind: RecordType::Txt,
        required: &[Field::Host],
        target: Some(Field::Data),
    },
    Requirement {
        kind: RecordType::Mx,
        required: &[Field::Host, Field::Priority],
        target: Some(Field::PointsTo),
    },
    Requirement {
        kind: RecordType::Srv,
        required: &[Field::Service, Field::Priority, Field::Weight, Field::Port],
        target: Some(Field::Target),
    },
    Requirement {
        kind: RecordType::Spfm,
        required: &[Field::Host, Field::SpfRules],
        target: None,
    },
    Requirement {
        kind: RecordType::ApexCname,
        required: &[],
        target: None,
    },
    Requirement {
        kind: RecordType::Redir301,
        required: &[Field::Target],
        target: None,
    },
    Requirement {
        kind: RecordType::Redir302,
        required: &[Field::Target],
        target: None,
    },
];

/// Table entry for a record type; `None` for types outside the vocabulary
#[must_use]
pub fn requirement(kind: RecordType) -> Option<&'static Requirement> {
    REQUIREMENTS.iter().find(|req| req.kind == kind)
}

fn check_fields(ctx: &RecordContext<'_>, req: &Requirement, report: &mut Report) {
    let record = ctx.record;
    if let Some(target) = req.target {
        if !target.is_set(record) {
            report.push(ctx.locate(Diagnostic::error(Code::MissingField).with("field", target.key())));
        }
        for extra in TARGET_FIELDS {
            // the SRV owner name is not a target
            if extra == target || (req.kind == RecordType::Srv && extra == Field::Name) {
                continue;
            }
            if extra.is_set(record) {
                report.push(ctx.locate(Diagnostic::info(Code::UnnecessaryField).with("field", extra.key())));
            }
        }
    }
    for field in req.required {
        if !field.is_set(record) {
            report.push(ctx.locate(Diagnostic::error(Code::EmptyKey).with("key", field.key())));
        }
    }
}

fn check_range(
    ctx: &RecordContext<'_>,
    report: &mut Report,
    field: &str,
    value: Option<&Numeric>,
    min: i64,
    max: i64,
) {
    if let Some(concrete) = value.and_then(Numeric::concrete) {
        if !(min..=max).contains(&concrete) {
            report.push(
                ctx.locate(Diagnostic::error(Code::InvalidValue))
                    .with("field", field)
                    .with("value", concrete),
            );
        }
    }
}

fn is_valid_protocol(protocol: &str) -> bool {
    matches!(
        protocol.to_ascii_lowercase().as_str(),
        "_tcp" | "_udp" | "_tls"
    ) || protocol.contains('%')
}

/// Type table plus the per-type rules of the record.
pub struct RecordTypeRule;

impl RecordRule for RecordTypeRule {
    fn id(&self) -> &'static str {
        "record-type"
    }

    fn name(&self) -> &'static str {
        "Record Type Contract"
    }

    fn description(&self) -> &'static str {
        "Each record type needs its required fields, a single target and values in range"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let record = ctx.record;
        let kind = record.kind();
        let Some(req) = requirement(kind) else {
            report.push(ctx.locate(Diagnostic::info(Code::UnexpectedType)));
            return;
        };
        check_fields(ctx, req, report);

        match kind {
            RecordType::Cname | RecordType::Ns => {
                if record.host == "@" && !ctx.config.cloudflare && !ctx.template.host_required {
                    report.push(ctx.locate(Diagnostic::error(Code::ApexHost)));
                }
            }
            RecordType::Txt => {
                if !ctx.config.cloudflare
                    && record.txt_conflict_matching_mode == "Prefix"
                    && record.txt_conflict_matching_prefix.is_empty()
                {
                    report.push(
                        ctx.locate(Diagnostic::warn(Code::EmptyKey))
                            .with("key", "txtConflictMatchingPrefix"),
                    );
                }
                if record.data.to_ascii_lowercase().contains("v=spf1") {
                    report.push(ctx.locate(Diagnostic::info(Code::BareSpf)));
                }
            }
            RecordType::Mx => {
                check_range(ctx, report, "priority", record.priority.as_ref(), 0, MAX_31BIT);
            }
            RecordType::Srv => {
                if !is_valid_protocol(&record.protocol) {
                    report.push(
                        ctx.locate(Diagnostic::warn(Code::InvalidValue))
                            .with("field", "protocol")
                            .with("value", &record.protocol),
                    );
                }
                check_range(ctx, report, "priority", record.priority.as_ref(), 0, MAX_31BIT);
                check_range(ctx, report, "weight", record.weight.as_ref(), 0, MAX_31BIT);
                check_range(ctx, report, "port", record.port.as_ref(), 1, MAX_PORT);
            }
            // an empty spfRules is already reported by the field table
            RecordType::Spfm if !record.spf_rules.is_empty() => {
                for diagnostic in spf::check_rules(&record.spf_rules) {
                    report.push(ctx.locate(diagnostic));
                }
            }
            _ => {}
        }
    }
}

/// Running `(groupId, host)` to first seen type map of one template.
///
/// DNS forbids a CNAME next to any other record at the same name.
#[derive(Debug, Default)]
pub struct CnameTracker {
    first_types: HashMap<(String, String), String>,
}

impl CnameTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ctx: &RecordContext<'_>, report: &mut Report) {
        let record = ctx.record;
        let key = (record.group_id.clone(), record.host.clone());
        match self.first_types.entry(key) {
            Entry::Occupied(first) => {
                let other = first.get();
                if other == "CNAME" || record.record_type == "CNAME" {
                    report.push(ctx.locate(Diagnostic::error(Code::CnameMixed)).with("othertype", other));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(record.record_type.clone());
            }
        }
    }
}

/// Characters a host may use besides letters and digits
fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '%')
}

/// Denied characters in `host`.
pub struct HostCharsRule;

impl RecordRule for HostCharsRule {
    fn id(&self) -> &'static str {
        "host-chars"
    }

    fn name(&self) -> &'static str {
        "Host Characters"
    }

    fn description(&self) -> &'static str {
        "Hosts use letters, digits, '-', '_', '.', placeholders, '*' or '@'"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let host = ctx.record.host.as_str();
        if host == "@" {
            return;
        }
        let denied = host
            .split('.')
            .filter(|label| *label != "*")
            .any(|label| !label.chars().all(is_host_char));
        if denied {
            report.push(ctx.locate(Diagnostic::error(Code::HostChars)));
        }
    }
}

/// Fields that would hand the applying party unbounded authority if variable.
pub struct VariableContextRule;

impl RecordRule for VariableContextRule {
    fn id(&self) -> &'static str {
        "variable-context"
    }

    fn name(&self) -> &'static str {
        "Variable Context"
    }

    fn description(&self) -> &'static str {
        "type, groupId and txtConflictMatchingPrefix must not be placeholders"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let record = ctx.record;
        let fields = [
            ("type", record.record_type.as_str()),
            ("groupId", record.group_id.as_str()),
            ("txtConflictMatchingPrefix", record.txt_conflict_matching_prefix.as_str()),
        ];
        for (field, value) in fields {
            if is_variable(value) {
                report.push(
                    ctx.locate(Diagnostic::error(Code::VariableContext))
                        .with("field", field)
                        .with("value", value),
                );
            }
        }
    }
}

/// TTL presence and range.
pub struct TtlRule;

impl RecordRule for TtlRule {
    fn id(&self) -> &'static str {
        "ttl"
    }

    fn name(&self) -> &'static str {
        "TTL Range"
    }

    fn description(&self) -> &'static str {
        "DNS types need a ttl within 1 to 2^31-1"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let kind = ctx.record.kind();
        let Some(ttl) = &ctx.record.ttl else {
            if kind.requires_ttl() {
                report.push(ctx.locate(Diagnostic::error(Code::EmptyKey)).with("key", "ttl"));
            }
            return;
        };
        let Some(value) = ttl.concrete() else {
            return;
        };

        if value > MAX_31BIT {
            report.push(ctx.locate(Diagnostic::error(Code::TtlExceedsMax)).with("ttl", value));
        } else if value < 0 || (value == 0 && kind.requires_ttl() && !ctx.config.cloudflare) {
            report.push(
                ctx.locate(Diagnostic::error(Code::InvalidValue))
                    .with("field", "ttl")
                    .with("value", value),
            );
        }
    }
}

const ESSENTIAL_VALUES: [&str; 2] = ["Always", "OnApply"];
const CONFLICT_MODES: [&str; 3] = ["None", "All", "Prefix"];

/// Length and vocabulary constraints on record fields.
pub struct RecordFieldsRule;

impl RecordRule for RecordFieldsRule {
    fn id(&self) -> &'static str {
        "record-fields"
    }

    fn name(&self) -> &'static str {
        "Record Field Constraints"
    }

    fn description(&self) -> &'static str {
        "Record fields stay within their documented lengths and vocabularies"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Record
    }

    fn check(&self, ctx: &RecordContext<'_>, report: &mut Report) {
        let record = ctx.record;
        let mut violation = |field: &str, constraint: &str| {
            report.push(
                ctx.locate(Diagnostic::warn(Code::FieldValidation))
                    .with("field", field)
                    .with("constraint", constraint),
            );
        };

        if !(1..=16).contains(&record.record_type.chars().count()) {
            violation("type", "length 1..16");
        }
        if record.host.chars().count() > 255 {
            violation("host", "length ..255");
        }
        if record.points_to.chars().count() > 255 {
            violation("pointsTo", "length ..255");
        }
        if !record.essential.is_empty() && !ESSENTIAL_VALUES.contains(&record.essential.as_str()) {
            violation("essential", "one of Always OnApply");
        }
        if !record.txt_conflict_matching_mode.is_empty()
            && !CONFLICT_MODES.contains(&record.txt_conflict_matching_mode.as_str())
        {
            violation("txtConflictMatchingMode", "one of None All Prefix");
        }
    }
}

/// Record rules in evaluation order
#[must_use]
pub fn record_rules() -> Vec<Box<dyn RecordRule>> {
    vec![
        Box::new(RecordTypeRule),
        Box::new(RecordFieldsRule),
        Box::new(super::underscore::ReservedLabelRule),
        Box::new(HostCharsRule),
        Box::new(VariableContextRule),
        Box::new(TtlRule),
        Box::new(super::placeholder::PlaceholderSyntaxRule),
    ]
}
