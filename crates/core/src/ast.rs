//! Declarations produced by the specification parser.
//!
//! Every declaration carries provenance (file, line of its first operand)
//! and every clause keeps the line of its own operand, so later checks can
//! anchor diagnostics precisely.

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Clause operands
// ──────────────────────────────────────────────

/// A qualified class name as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    pub name: String,
    pub line: u32,
}

/// `class.member`, split at the last dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub class: String,
    pub member: String,
    pub line: u32,
}

impl MemberRef {
    /// Split `pkg.Class.member`. Returns `None` if there is no dot.
    pub fn split(qualified: &str, line: u32) -> Option<Self> {
        let (class, member) = qualified.rsplit_once('.')?;
        if class.is_empty() || member.is_empty() {
            return None;
        }
        Some(MemberRef {
            class: class.to_owned(),
            member: member.to_owned(),
            line,
        })
    }
}

impl MemberRef {
    /// Same class and member, wherever each was written.
    pub fn same_member(&self, other: &MemberRef) -> bool {
        self.class == other.class && self.member == other.member
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.member)
    }
}

// ──────────────────────────────────────────────
// Clauses
// ──────────────────────────────────────────────

/// Where an object is injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WhereClause {
    Field(MemberRef),
}

/// What gets injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WhatClause {
    /// The value of a static field.
    Field(MemberRef),
    /// A fresh instance.
    New(ClassRef),
    /// The result of a zero-argument static method.
    Call(MemberRef),
    /// One shared instance per class.
    Single(ClassRef),
}

impl WhereClause {
    pub fn line(&self) -> u32 {
        match self {
            WhereClause::Field(m) => m.line,
        }
    }

    /// Whether both clauses inject into the same place. Unlike `==`, this
    /// ignores source lines.
    pub fn same_target(&self, other: &WhereClause) -> bool {
        match (self, other) {
            (WhereClause::Field(a), WhereClause::Field(b)) => a.same_member(b),
        }
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereClause::Field(m) => write!(f, "field {}", m),
        }
    }
}

impl WhatClause {
    pub fn line(&self) -> u32 {
        match self {
            WhatClause::Field(m) | WhatClause::Call(m) => m.line,
            WhatClause::New(c) | WhatClause::Single(c) => c.line,
        }
    }
}

impl fmt::Display for WhatClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhatClause::Field(m) => write!(f, "field {}", m),
            WhatClause::New(c) => write!(f, "new {}", c.name),
            WhatClause::Call(m) => write!(f, "call {}()", m),
            WhatClause::Single(c) => write!(f, "single {}", c.name),
        }
    }
}

// ──────────────────────────────────────────────
// Declarations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub where_clause: WhereClause,
    pub what_clause: WhatClause,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<ClassRef>,
    pub prov: Provenance,
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "associate {} with {}", self.where_clause, self.what_clause)?;
        if let Some(using) = &self.using {
            write!(f, " using {}", using.name)?;
        }
        Ok(())
    }
}

/// `declare precedence <higher> over <lower>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precedence {
    pub higher: ClassRef,
    pub lower: ClassRef,
    pub prov: Provenance,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declare precedence {} over {}",
            self.higher.name, self.lower.name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Association(Association),
    Precedence(Precedence),
}

impl Declaration {
    pub fn prov(&self) -> &Provenance {
        match self {
            Declaration::Association(a) => &a.prov,
            Declaration::Precedence(p) => &p.prov,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Association(a) => fmt::Display::fmt(a, f),
            Declaration::Precedence(p) => fmt::Display::fmt(p, f),
        }
    }
}
