//! Live operations and their results.
//!
//! An [`Operation`] is what client code sends down the link chain. Its
//! operation name is read from the document with a small scanner that only
//! looks at top-level definition headers; selection sets are skipped.

use crate::variables::Variables;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DEFINITION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(query|mutation|subscription|fragment)\b\s*([_A-Za-z][_0-9A-Za-z]*)?")
        .expect("definition header pattern is valid")
});

/// Kind of an executable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// Header of the first operation definition in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHeader {
    pub kind: OperationKind,
    pub name: Option<String>,
}

/// Find the first operation definition of a GraphQL document.
///
/// Fragment definitions are skipped. The query shorthand (`{ ... }`) yields an
/// anonymous query. Returns `None` when the document has no operation.
pub fn first_operation(document: &str) -> Option<OperationHeader> {
    let mut header = String::new();
    let mut braces = 0usize;
    let mut parens = 0usize;
    let mut in_string = false;
    let mut chars = document.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_string {
            match ch {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '#' => {
                while chars.next_if(|c| *c != '\n').is_some() {}
            }
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '{' if parens == 0 => {
                if braces == 0 {
                    if let Some(found) = parse_header(&header) {
                        return Some(found);
                    }
                    header.clear();
                }
                braces += 1;
            }
            '}' if parens == 0 => braces = braces.saturating_sub(1),
            _ if braces == 0 && parens == 0 => header.push(ch),
            _ => {}
        }
    }

    None
}

/// Returns `None` for fragments so the scan continues to the next definition.
fn parse_header(header: &str) -> Option<OperationHeader> {
    if header.trim().is_empty() {
        return Some(OperationHeader {
            kind: OperationKind::Query,
            name: None,
        });
    }

    let captures = DEFINITION_HEADER.captures(header)?;
    let kind = match &captures[1] {
        "query" => OperationKind::Query,
        "mutation" => OperationKind::Mutation,
        "subscription" => OperationKind::Subscription,
        _ => return None,
    };

    Some(OperationHeader {
        kind,
        name: captures.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Name of the first operation in a document, if it has one.
pub fn operation_name(document: &str) -> Option<String> {
    first_operation(document).and_then(|header| header.name)
}

/// An operation issued by client code.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Operation name from the document (`None` for anonymous operations)
    pub operation_name: Option<String>,
    pub kind: OperationKind,
    /// The raw document
    pub query: String,
    /// Variables sent with the operation
    pub variables: Variables,
    /// Variables omitted by the wildcard stage, kept for response templates
    pub stripped: Variables,
}

impl Operation {
    /// Build an operation from a GraphQL document.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let header = first_operation(&query);

        Self {
            operation_name: header.as_ref().and_then(|h| h.name.clone()),
            kind: header.map(|h| h.kind).unwrap_or(OperationKind::Query),
            query,
            variables: Variables::new(),
            stripped: Variables::new(),
        }
    }

    /// Replace all variables. Anything but a JSON object means no variables.
    pub fn with_variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = match variables {
            serde_json::Value::Object(map) => map,
            _ => Variables::new(),
        };
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Name used in logs and errors.
    pub fn display_name(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("<anonymous>")
    }
}

/// Result delivered for an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchResult {
    /// Response data
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// GraphQL errors returned alongside the data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl FetchResult {
    pub fn data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }
}
