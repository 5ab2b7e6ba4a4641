//! Per-clause-kind behavior: semantic checks and type resolution.
//!
//! The class structure a clause refers to comes from a [`ClassModel`]
//! supplied by the caller. Adding a clause kind means adding a variant in
//! `ast` and an arm in each match here.

use crate::ast::{ClassRef, MemberRef, WhatClause, WhereClause};
use crate::hierarchy::TypeOracle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub ty: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub returns: String,
    pub is_static: bool,
    pub arity: usize,
}

/// Structural facts about classes, beyond their supertypes.
pub trait ClassModel: TypeOracle {
    fn has_class(&self, name: &str) -> bool {
        self.direct_supertypes(name).is_some()
    }

    fn field_type(&self, class: &str, member: &str) -> Option<FieldInfo>;

    fn method_return_type(&self, class: &str, member: &str) -> Option<MethodInfo>;
}

/// A clause problem: line of the offending operand plus message.
pub type ClauseProblem = (u32, String);

impl WhereClause {
    pub fn check(&self, model: &dyn ClassModel) -> Vec<ClauseProblem> {
        match self {
            WhereClause::Field(m) => check_field(m, model, false),
        }
    }

    /// The type expected at the injection point.
    pub fn resolve_type(&self, model: &dyn ClassModel) -> Option<String> {
        match self {
            WhereClause::Field(m) => model.field_type(&m.class, &m.member).map(|f| f.ty),
        }
    }
}

impl WhatClause {
    pub fn check(&self, model: &dyn ClassModel) -> Vec<ClauseProblem> {
        match self {
            WhatClause::Field(m) => check_field(m, model, true),
            WhatClause::New(c) | WhatClause::Single(c) => check_class(c, model),
            WhatClause::Call(m) => check_call(m, model),
        }
    }

    /// The type of the object the clause produces.
    pub fn resolve_type(&self, model: &dyn ClassModel) -> Option<String> {
        match self {
            WhatClause::Field(m) => model.field_type(&m.class, &m.member).map(|f| f.ty),
            WhatClause::New(c) | WhatClause::Single(c) => {
                model.has_class(&c.name).then(|| c.name.clone())
            }
            WhatClause::Call(m) => model
                .method_return_type(&m.class, &m.member)
                .map(|i| i.returns),
        }
    }
}

fn check_class(c: &ClassRef, model: &dyn ClassModel) -> Vec<ClauseProblem> {
    if model.has_class(&c.name) {
        Vec::new()
    } else {
        vec![(c.line, format!("class '{}' not found", c.name))]
    }
}

fn check_field(m: &MemberRef, model: &dyn ClassModel, must_be_static: bool) -> Vec<ClauseProblem> {
    if !model.has_class(&m.class) {
        return vec![(m.line, format!("class '{}' not found", m.class))];
    }
    match model.field_type(&m.class, &m.member) {
        None => vec![(
            m.line,
            format!("field '{}' not found in class '{}'", m.member, m.class),
        )],
        Some(f) if must_be_static && !f.is_static => {
            vec![(m.line, format!("field '{}' is not static", m))]
        }
        Some(_) => Vec::new(),
    }
}

fn check_call(m: &MemberRef, model: &dyn ClassModel) -> Vec<ClauseProblem> {
    if !model.has_class(&m.class) {
        return vec![(m.line, format!("class '{}' not found", m.class))];
    }
    let Some(method) = model.method_return_type(&m.class, &m.member) else {
        return vec![(
            m.line,
            format!("method '{}' not found in class '{}'", m.member, m.class),
        )];
    };
    let mut problems = Vec::new();
    if !method.is_static {
        problems.push((m.line, format!("method '{}' is not static", m)));
    }
    if method.arity != 0 {
        problems.push((
            m.line,
            format!("method '{}' takes {} argument(s), expected none", m, method.arity),
        ));
    }
    problems
}
