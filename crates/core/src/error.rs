use serde::{Deserialize, Serialize};
use std::fmt;

/// A syntax error from the grammar interpreter. Anchored to the line of the
/// offending token; `None` when the input ran out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub line: Option<u32>,
    pub message: String,
}

impl ParseError {
    pub fn at(line: u32, message: impl Into<String>) -> Self {
        ParseError {
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn eof(message: impl Into<String>) -> Self {
        ParseError {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while building a grammar table.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("rule '{rule}' references unknown rule '{missing}'")]
    UnknownRule { rule: String, missing: String },

    #[error("rule '{0}' is defined twice")]
    DuplicateRule(String),

    #[error("rule '{rule}' has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{rule}' references '{reference}' more than once")]
    RepeatedReference { rule: String, reference: String },
}

/// Errors raised by type hierarchy queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("unknown type '{0}'")]
    UnknownType(String),
}

/// Why an adapter named in a `using` clause cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplicitAdapterError {
    #[error("adapter '{0}' not found")]
    UnknownAdapter(String),

    #[error("adapter '{adapter}' cannot adapt '{from}' to '{to}'")]
    NotEligible {
        adapter: String,
        from: String,
        to: String,
    },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A declaration-level problem, reported as `<file>:<line> <message>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn error(file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn warning(file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    /// Lift a syntax error into a file diagnostic. Errors at end of input
    /// are anchored at line 0.
    pub fn syntax(file: &str, err: &ParseError) -> Self {
        Diagnostic::error(file, err.line.unwrap_or(0), err.message.clone())
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Serialize with every field present, for `--output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":     self.file,
            "line":     self.line,
            "message":  self.message,
            "severity": self.severity,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.message)
    }
}
