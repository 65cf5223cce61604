//! Variable values for mocked requests.
//!
//! A mocked request declares its expected variables as [`VariableValue`]s.
//! Most are literals compared by deep equality; [`VariableValue::Wildcard`]
//! marks a key whose live value is irrelevant to matching.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::value::{Tag, TaggedValue};
use std::collections::BTreeMap;

/// Variables of a live operation, or of a mock after sanitization.
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// Variables declared on a mocked request, possibly containing wildcards.
pub type MockVariables = BTreeMap<String, VariableValue>;

/// YAML tag used to write a wildcard in configuration files (`id: !any`).
pub const WILDCARD_TAG: &str = "any";

/// An expected variable value on a mocked request.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    /// Must equal the live value exactly.
    Literal(serde_json::Value),
    /// Matches any live value, including an absent one.
    Wildcard,
}

/// Returns the wildcard marker for use in mocked request variables.
pub fn match_any() -> VariableValue {
    VariableValue::Wildcard
}

impl VariableValue {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, VariableValue::Wildcard)
    }
}

impl From<serde_json::Value> for VariableValue {
    fn from(value: serde_json::Value) -> Self {
        VariableValue::Literal(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Literal(value.into())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Literal(value.into())
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Literal(value.into())
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        VariableValue::Literal(value.into())
    }
}

impl Serialize for VariableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VariableValue::Literal(value) => value.serialize(serializer),
            VariableValue::Wildcard => TaggedValue {
                tag: Tag::new(WILDCARD_TAG),
                value: serde_yaml::Value::Null,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for VariableValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::Tagged(tagged) if tagged.tag == WILDCARD_TAG => {
                Ok(VariableValue::Wildcard)
            }
            other => serde_json::to_value(other)
                .map(VariableValue::Literal)
                .map_err(D::Error::custom),
        }
    }
}
