//! The fixed declaration grammar and the conversion from parse trees to
//! [`Declaration`]s.
//!
//! ```text
//! associate <where-clause> with <what-clause> [using <adapter>]
//! declare precedence <higher> over <lower>
//! ```
//!
//! Each clause kind is its own alternative in the table (`where-clause-*`,
//! `what-clause-*`), and conversion dispatches on the alternative's tag.

use crate::ast::*;
use crate::error::ParseError;
use crate::grammar::{Grammar, Node};
use crate::lexer::{tokenize, Token};
use std::sync::OnceLock;

const IDENT: &str = r"[A-Za-z_$][\w$]*";

/// Start symbol of the declaration grammar.
pub const START: &str = "declarations";

/// The declaration grammar, built on first use.
pub fn declaration_grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| build_grammar().expect("declaration grammar is well-formed"))
}

fn build_grammar() -> Result<Grammar, crate::error::GrammarError> {
    let class_name = format!(r"(?:{IDENT}\.)*{IDENT}");
    let member_name = format!(r"(?:{IDENT}\.)+{IDENT}");
    let method_call = format!(r"(?:{IDENT}\.)+{IDENT}\(\)");

    Grammar::builder()
        .sequence(START, &["<declaration>*"])
        .alternation("declaration", &["association", "precedence"])
        .sequence(
            "association",
            &[
                "associate",
                "<where-clause>",
                "with",
                "<what-clause>",
                "<using-clause>?",
            ],
        )
        .sequence(
            "precedence",
            &["declare", "precedence", "<higher>", "over", "<lower>"],
        )
        .sequence("using-clause", &["using", "<adapter-name>"])
        // where clauses
        .alternation("where-clause", &["where-clause-field"])
        .sequence("where-clause-field", &["field", "<field-name>"])
        // what clauses
        .alternation(
            "what-clause",
            &[
                "what-clause-field",
                "what-clause-new",
                "what-clause-call",
                "what-clause-single",
            ],
        )
        .sequence("what-clause-field", &["field", "<field-name>"])
        .sequence("what-clause-new", &["new", "<class-name>"])
        .sequence("what-clause-call", &["call", "<method-call>"])
        .sequence("what-clause-single", &["single", "<class-name>"])
        // operands
        .pattern("field-name", &member_name)
        .pattern("method-call", &method_call)
        .pattern("class-name", &class_name)
        .pattern("adapter-name", &class_name)
        .pattern("higher", &class_name)
        .pattern("lower", &class_name)
        .build()
}

/// Parse one specification text.
pub fn parse_spec(src: &str, file: &str) -> Result<Vec<Declaration>, ParseError> {
    parse(&tokenize(src), file)
}

pub fn parse(tokens: &[Token], file: &str) -> Result<Vec<Declaration>, ParseError> {
    let tree = declaration_grammar().parse(START, tokens)?;
    let list = tree
        .field("declaration")
        .ok_or_else(|| shape("declaration list"))?;
    list.items()
        .iter()
        .map(|node| to_declaration(node, file))
        .collect()
}

fn to_declaration(node: &Node, file: &str) -> Result<Declaration, ParseError> {
    match node.choice() {
        Some(("association", fields)) => {
            to_association(fields, file).map(Declaration::Association)
        }
        Some(("precedence", fields)) => to_precedence(fields, file).map(Declaration::Precedence),
        _ => Err(shape("declaration")),
    }
}

fn to_association(node: &Node, file: &str) -> Result<Association, ParseError> {
    let where_clause = to_where_clause(child(node, "where-clause")?)?;
    let what_clause = to_what_clause(child(node, "what-clause")?)?;
    let using = match child(node, "using-clause")? {
        Node::Absent => None,
        clause => Some(class_ref(clause, "adapter-name")?),
    };
    let prov = Provenance {
        file: file.to_owned(),
        line: where_clause.line(),
    };
    Ok(Association {
        where_clause,
        what_clause,
        using,
        prov,
    })
}

fn to_precedence(node: &Node, file: &str) -> Result<Precedence, ParseError> {
    let higher = class_ref(node, "higher")?;
    let lower = class_ref(node, "lower")?;
    let prov = Provenance {
        file: file.to_owned(),
        line: higher.line,
    };
    Ok(Precedence {
        higher,
        lower,
        prov,
    })
}

fn to_where_clause(node: &Node) -> Result<WhereClause, ParseError> {
    match node.choice() {
        Some(("where-clause-field", fields)) => {
            member_ref(fields, "field-name").map(WhereClause::Field)
        }
        _ => Err(shape("where clause")),
    }
}

fn to_what_clause(node: &Node) -> Result<WhatClause, ParseError> {
    match node.choice() {
        Some(("what-clause-field", fields)) => {
            member_ref(fields, "field-name").map(WhatClause::Field)
        }
        Some(("what-clause-new", fields)) => class_ref(fields, "class-name").map(WhatClause::New),
        Some(("what-clause-call", fields)) => {
            let token = leaf(fields, "method-call")?;
            let target = token.word.trim_end_matches("()");
            MemberRef::split(target, token.line)
                .map(WhatClause::Call)
                .ok_or_else(|| shape("method call"))
        }
        Some(("what-clause-single", fields)) => {
            class_ref(fields, "class-name").map(WhatClause::Single)
        }
        _ => Err(shape("what clause")),
    }
}

fn child<'n>(node: &'n Node, name: &str) -> Result<&'n Node, ParseError> {
    node.field(name).ok_or_else(|| shape(name))
}

fn leaf<'n>(node: &'n Node, name: &str) -> Result<&'n Token, ParseError> {
    child(node, name)?.token().ok_or_else(|| shape(name))
}

fn class_ref(node: &Node, name: &str) -> Result<ClassRef, ParseError> {
    let token = leaf(node, name)?;
    Ok(ClassRef {
        name: token.word.clone(),
        line: token.line,
    })
}

fn member_ref(node: &Node, name: &str) -> Result<MemberRef, ParseError> {
    let token = leaf(node, name)?;
    MemberRef::split(&token.word, token.line).ok_or_else(|| shape(name))
}

fn shape(what: &str) -> ParseError {
    ParseError::eof(format!("Malformed {} in parse tree.", what))
}
