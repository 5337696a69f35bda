//! Diagnostic types for template validation.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::severity::Severity;
use crate::error::{LintError, Result};

/// Category of a diagnostic code
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Operating system and library failures
    System,
    /// Template-wide structure and metadata
    Structure,
    /// Per-record contents
    Record,
    /// Cloudflare specific restrictions
    Provider,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Structure => write!(f, "structure"),
            Self::Record => write!(f, "record"),
            Self::Provider => write!(f, "provider"),
        }
    }
}

macro_rules! codes {
    ($($variant:ident = $num:literal, $category:ident, $note:literal;)+) => {
        /// Stable identifier of a finding, rendered as `DCTLnnnn`
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub enum Code {
            $($variant,)+
        }

        impl Code {
            /// Every code in catalogue order
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Numeric part of the code
            #[must_use]
            pub const fn number(self) -> u16 {
                match self {
                    $(Self::$variant => $num,)+
                }
            }

            /// Fixed human readable note
            #[must_use]
            pub const fn note(self) -> &'static str {
                match self {
                    $(Self::$variant => $note,)+
                }
            }

            #[must_use]
            pub const fn category(self) -> RuleCategory {
                match self {
                    $(Self::$variant => RuleCategory::$category,)+
                }
            }
        }
    };
}

// 0001 - 0999  operating system and library errors
// 1000 - 3999  Domain Connect messages
// 5000 - 5200  Cloudflare messages
codes! {
    CannotOpen = 1, System, "cannot open file";
    JsonError = 3, System, "json error";
    WriteFailed = 4, System, "write failed";
    TempFileFailed = 5, System, "could not create temporary file";
    MoveFailed = 6, System, "file move failed";
    MissingField = 8, Record, "required field is missing";
    UnnecessaryField = 9, Record, "unnecessary field found";

    TtlExceedsMax = 1000, Structure, "ttl value exceeds maximum";
    QuotedInteger = 1001, Structure, "do not quote an integer, it makes it a string";
    InvalidIdChars = 1002, Structure, "id contains invalid characters";
    FileName = 1003, Structure, "file name does not use required pattern";
    DuplicateId = 1004, Structure, "duplicate providerId + serviceId detected";
    FieldValidation = 1005, Structure, "template field validation";
    Version = 1006, Structure, "version should be a positive integer";
    SharedDeprecated = 1007, Structure, "shared flag is deprecated, use sharedProviderName";
    SharedCompat = 1008, Structure, "sharedProviderName is in use without 'shared' compatibility";
    VariableContext = 1009, Structure, "variable in invalid context";
    LogoCheck = 1010, Structure, "logo check failed";
    CnameMixed = 1011, Record, "CNAME cannot be mixed with other record types";
    ApexHost = 1012, Record, "record host must not be @ when template hostRequired is false";
    EmptyKey = 1013, Record, "key must not be empty";
    BareSpf = 1014, Record, "use SPFM instead of bare SPF record";
    InvalidValue = 1015, Record, "invalid value";
    UnexpectedType = 1016, Record, "unexpected record type";
    SpfInvalid = 1017, Record, "spfRules contain invalid data";
    SpfDuplicate = 1018, Record, "spfRules contain duplicate fields";
    VariableChar = 1019, Record, "variable contains invalid character";
    VariableUnterminated = 1020, Record, "variable is not terminated";
    ReservedLabel = 1021, Record, "missing from iana definitions";
    InvalidHostname = 1022, Structure, "invalid hostname";
    DuplicateRecord = 1023, Record, "duplicate record entry";
    HostVariable = 1024, Record, "use of %host% variable name is problematic";
    UnderscoreLabel = 1025, Record, "use of underscore detected in a host element";
    SyncWhitespace = 1026, Structure, "sync domains must be comma separated values without whitespace";
    HostChars = 1027, Record, "record host contains illegal character(s)";
    PhishingRedundant = 1028, Structure, "warnPhishing together with syncPubKeyDomain has no practical relevance";
    SyncPubKeyMissing = 1029, Structure, "syncPubKeyDomain not defined while syncBlock gives impression it should be";
    NoRecords = 1030, Structure, "template does not have any records";
    SameGroupIds = 1031, Structure, "all record groupId values are the same";
    MixedGroupIds = 1032, Structure, "mix of defined empty and record groupId values";

    CfSyncBlock = 5000, Provider, "syncBlock is not supported";
    CfSyncPubKey = 5001, Provider, "syncPubKeyDomain is required";
    CfSharedServiceName = 5002, Provider, "sharedServiceName is not supported";
    CfSyncRedirect = 5003, Provider, "syncRedirectDomain is not supported";
    CfMultiInstance = 5004, Provider, "multiInstance is not supported";
    CfWarnPhishing = 5005, Provider, "warnPhishing is omitted";
    CfHostRequired = 5006, Provider, "hostRequired is not supported";
    CfFlattening = 5007, Provider, "domains must use Cloudflare CNAME flattening setting";
    CfConflictMatching = 5008, Provider, "conflict matching is not supported";
    CfApexCname = 5009, Provider, "APEXCNAME is not supported";
    CfZeroTtl = 5010, Provider, "zero ttl is not honoured";
    CfEssential = 5011, Provider, "essential is not supported";
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DCTL{:04}", self.number())
    }
}

impl FromStr for Code {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("dctl"))
            .map_or(s, |_| &s[4..]);
        let number: u16 = digits
            .parse()
            .map_err(|_| LintError::NotFound(format!("code '{s}'")))?;
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.number() == number)
            .ok_or_else(|| LintError::NotFound(format!("code '{s}'")))
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single finding
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Stable code of the finding
    pub code: Code,
    /// Severity level
    pub severity: Severity,
    /// Human readable note
    pub note: &'static str,
    /// Key/value pairs locating the offending element
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<(String, String)>,
}

impl Diagnostic {
    /// Create a new diagnostic
    #[must_use]
    pub const fn new(code: Code, severity: Severity) -> Self {
        Self {
            code,
            severity,
            note: code.note(),
            context: Vec::new(),
        }
    }

    #[must_use]
    pub const fn fatal(code: Code) -> Self {
        Self::new(code, Severity::Fatal)
    }

    #[must_use]
    pub const fn error(code: Code) -> Self {
        Self::new(code, Severity::Error)
    }

    #[must_use]
    pub const fn warn(code: Code) -> Self {
        Self::new(code, Severity::Warn)
    }

    #[must_use]
    pub const fn info(code: Code) -> Self {
        Self::new(code, Severity::Info)
    }

    #[must_use]
    pub const fn debug(code: Code) -> Self {
        Self::new(code, Severity::Debug)
    }

    /// Attach a context value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.context.push((key.into(), value.to_string()));
        self
    }

    /// Look up a context value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn context_line(&self) -> String {
        self.context_line_without(&[])
    }

    /// Context pairs other than `skip`, rendered as `key="value"`
    fn context_line_without(&self, skip: &[&str]) -> String {
        self.context
            .iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v:?}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.note)?;
        if !self.context.is_empty() {
            write!(f, " ({})", self.context_line())?;
        }
        Ok(())
    }
}

/// Findings sink passed into every validator.
///
/// Keeps the findings in the order they were reported and the running
/// combined severity. Every finding is also emitted as a tracing event, so
/// the enclosing template and record spans locate it in the log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
    severity: Severity,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding
    pub fn push(&mut self, diagnostic: Diagnostic) {
        emit(&diagnostic);
        self.severity = self.severity.combine(diagnostic.severity);
        self.diagnostics.push(diagnostic);
    }

    /// Move all findings of `other` into this report
    pub fn absorb(&mut self, other: Self) {
        self.severity = self.severity.combine(other.severity);
        self.diagnostics.extend(other.diagnostics);
    }

    /// Combined severity of everything reported so far
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Findings at exactly the given level
    pub fn at(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Findings carrying the given code
    pub fn with_code(&self, code: Code) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    #[must_use]
    pub fn has(&self, code: Code) -> bool {
        self.with_code(code).next().is_some()
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.at(severity).count()
    }
}

/// Context keys logged as their own event fields
const LOCATION_KEYS: [&str; 3] = ["record", "type", "host"];

fn emit(diagnostic: &Diagnostic) {
    let code = diagnostic.code;
    let note = diagnostic.note;
    let record = diagnostic.get("record");
    let kind = diagnostic.get("type");
    let host = diagnostic.get("host");
    let context = diagnostic.context_line_without(&LOCATION_KEYS);

    macro_rules! event {
        ($level:expr $(, $extra:ident = $value:expr)?) => {
            tracing::event!(
                $level,
                %code,
                record,
                kind,
                host,
                context = %context,
                $($extra = $value,)?
                "{note}"
            )
        };
    }

    match diagnostic.severity {
        Severity::Ok => {}
        Severity::Debug => event!(tracing::Level::DEBUG),
        Severity::Info => event!(tracing::Level::INFO),
        Severity::Warn => event!(tracing::Level::WARN),
        Severity::Error => event!(tracing::Level::ERROR),
        Severity::Fatal => event!(tracing::Level::ERROR, fatal = true),
    }
}
