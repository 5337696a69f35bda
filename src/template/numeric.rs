//! Integer-or-placeholder field values.
//!
//! TTL, priority, weight, port and version accept a JSON number, a quoted
//! number, or a `%variable%` placeholder. A quoted number decodes to the
//! same value as the bare number; [`super::decode`] reports the quoting.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::is_variable;

/// A numeric template field
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Numeric {
    /// A literal integer
    Concrete(i64),
    /// A placeholder resolved when the template is applied
    Placeholder(String),
}

impl Numeric {
    /// The literal value, if this is not a placeholder
    #[must_use]
    pub const fn concrete(&self) -> Option<i64> {
        match self {
            Self::Concrete(value) => Some(*value),
            Self::Placeholder(_) => None,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Whether a JSON string would decode as a quoted integer
    #[must_use]
    pub fn is_quoted_integer(raw: &str) -> bool {
        raw.trim().parse::<i64>().is_ok()
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(value) => write!(f, "{value}"),
            Self::Placeholder(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self::Concrete(value)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Concrete(value) => serializer.serialize_i64(*value),
            Self::Placeholder(name) => serializer.serialize_str(name),
        }
    }
}

struct NumericVisitor;

impl Visitor<'_> for NumericVisitor {
    type Value = Numeric;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, a quoted integer, or a %variable% placeholder")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Numeric, E> {
        Ok(Numeric::Concrete(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Numeric, E> {
        i64::try_from(value)
            .map(Numeric::Concrete)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Numeric, E> {
        if let Ok(parsed) = value.trim().parse::<i64>() {
            return Ok(Numeric::Concrete(parsed));
        }
        if is_variable(value) {
            return Ok(Numeric::Placeholder(value.to_string()));
        }
        Err(E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericVisitor)
    }
}
