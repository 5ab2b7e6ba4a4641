//! A small table-driven grammar interpreter.
//!
//! Rules are declared once in a [`Grammar`] table keyed by name and are
//! read-only afterwards. Parsing a start symbol against a token slice yields
//! a [`Node`] tree whose shape follows the rule kinds: sequences produce
//! [`Node::Fields`] keyed by the referenced rule names, alternations produce
//! a [`Node::Choice`] tagged with the winning alternative, repetitions
//! produce [`Node::List`], and patterns produce the matched [`Token`].
//!
//! Alternatives are tried in the order they were declared and the first
//! success wins. Grammars must be written so that at most one alternative
//! can match a given input; overlapping alternatives are an authoring bug.

use crate::error::{GrammarError, ParseError};
use crate::lexer::Token;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

/// One element of a sequence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Literal(String),
    Ref { rule: String, repeat: Repeat },
}

impl Element {
    /// Read the compact element notation: `<name>` is a rule reference,
    /// optionally followed by `?`, `*` or `+`; anything else is a literal.
    pub fn parse(spec: &str) -> Element {
        let (body, repeat) = match spec.chars().last() {
            Some('?') if spec.len() > 1 => (&spec[..spec.len() - 1], Repeat::Optional),
            Some('*') if spec.len() > 1 => (&spec[..spec.len() - 1], Repeat::ZeroOrMore),
            Some('+') if spec.len() > 1 => (&spec[..spec.len() - 1], Repeat::OneOrMore),
            _ => (spec, Repeat::One),
        };
        match body.strip_prefix('<').and_then(|b| b.strip_suffix('>')) {
            Some(rule) if !rule.is_empty() => Element::Ref {
                rule: rule.to_owned(),
                repeat,
            },
            _ => Element::Literal(spec.to_owned()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    Literal(String),
    /// Matches a whole token word.
    Pattern(Regex),
    Sequence(Vec<Element>),
    Alternation(Vec<String>),
}

/// Parse tree produced by [`Grammar::parse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// A bare literal rule matched; carries no data.
    Literal,
    Token(Token),
    Fields(BTreeMap<String, Node>),
    Choice { rule: String, value: Box<Node> },
    List(Vec<Node>),
    /// An optional reference that did not match.
    Absent,
}

impl Node {
    pub fn field(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Fields(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Node::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn choice(&self) -> Option<(&str, &Node)> {
        match self {
            Node::Choice { rule, value } => Some((rule.as_str(), value)),
            _ => None,
        }
    }

    pub fn items(&self) -> &[Node] {
        match self {
            Node::List(items) => items,
            _ => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }
}

type Parsed<'t> = Result<(Node, &'t [Token]), ParseError>;

/// An immutable rule table.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: BTreeMap<String, Rule>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Parse `tokens` as `start`. Tokens left over after the start symbol
    /// is complete are an error.
    pub fn parse(&self, start: &str, tokens: &[Token]) -> Result<Node, ParseError> {
        let (node, rest) = self.parse_rule(start, tokens)?;
        match rest.first() {
            None => Ok(node),
            Some(t) => {
                let mut message = format!("Trailing input from line {}.", t.line);
                if let Some(cause) = self.stopped_repetition(start, rest) {
                    message.push(' ');
                    message.push_str(&cause.message);
                }
                Err(ParseError::at(t.line, message))
            }
        }
    }

    /// When `start` ends in a `*`/`+` repetition, the error that stopped it
    /// at `rest`.
    fn stopped_repetition(&self, start: &str, rest: &[Token]) -> Option<ParseError> {
        let Some(Rule::Sequence(elements)) = self.rules.get(start) else {
            return None;
        };
        match elements.last()? {
            Element::Ref {
                rule,
                repeat: Repeat::ZeroOrMore | Repeat::OneOrMore,
            } => self.parse_rule(rule, rest).err(),
            _ => None,
        }
    }

    fn parse_rule<'t>(&self, name: &str, tokens: &'t [Token]) -> Parsed<'t> {
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| ParseError::eof(format!("Unknown rule '{}'.", name)))?;
        trace!(rule = name, remaining = tokens.len(), "parse rule");
        match rule {
            Rule::Literal(word) => {
                let rest = expect_literal(word, tokens)?;
                Ok((Node::Literal, rest))
            }
            Rule::Pattern(re) => match tokens.split_first() {
                Some((t, rest)) if re.is_match(&t.word) => Ok((Node::Token(t.clone()), rest)),
                Some((t, _)) => Err(ParseError::at(
                    t.line,
                    format!(
                        "Unexpected token '{}' on line {}, expected {}.",
                        t.word, t.line, name
                    ),
                )),
                None => Err(ParseError::eof(format!("Unexpected EOF, expected {}.", name))),
            },
            Rule::Sequence(elements) => self.parse_sequence(elements, tokens),
            Rule::Alternation(alternatives) => self.parse_alternation(alternatives, tokens),
        }
    }

    fn parse_sequence<'t>(&self, elements: &[Element], mut tokens: &'t [Token]) -> Parsed<'t> {
        let mut fields = BTreeMap::new();
        for element in elements {
            match element {
                Element::Literal(word) => {
                    tokens = expect_literal(word, tokens)?;
                }
                Element::Ref { rule, repeat } => {
                    let (value, rest) = self.parse_repeated(rule, *repeat, tokens)?;
                    fields.insert(rule.clone(), value);
                    tokens = rest;
                }
            }
        }
        Ok((Node::Fields(fields), tokens))
    }

    fn parse_repeated<'t>(&self, rule: &str, repeat: Repeat, tokens: &'t [Token]) -> Parsed<'t> {
        match repeat {
            Repeat::One => self.parse_rule(rule, tokens),
            Repeat::Optional => match self.parse_rule(rule, tokens) {
                Ok(parsed) => Ok(parsed),
                Err(_) => Ok((Node::Absent, tokens)),
            },
            Repeat::ZeroOrMore => Ok(self.parse_many(rule, Vec::new(), tokens)),
            Repeat::OneOrMore => {
                let (first, rest) = self.parse_rule(rule, tokens)?;
                Ok(self.parse_many(rule, vec![first], rest))
            }
        }
    }

    fn parse_many<'t>(
        &self,
        rule: &str,
        mut items: Vec<Node>,
        mut tokens: &'t [Token],
    ) -> (Node, &'t [Token]) {
        while let Ok((value, rest)) = self.parse_rule(rule, tokens) {
            let progressed = rest.len() < tokens.len();
            items.push(value);
            tokens = rest;
            if !progressed {
                break;
            }
        }
        (Node::List(items), tokens)
    }

    fn parse_alternation<'t>(&self, alternatives: &[String], tokens: &'t [Token]) -> Parsed<'t> {
        let mut failures = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            match self.parse_rule(alt, tokens) {
                Ok((value, rest)) => {
                    return Ok((
                        Node::Choice {
                            rule: alt.clone(),
                            value: Box::new(value),
                        },
                        rest,
                    ))
                }
                Err(e) => failures.push(e),
            }
        }
        let line = failures.iter().filter_map(|e| e.line).min();
        let message = failures
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Err(ParseError { line, message })
    }
}

fn expect_literal<'t>(word: &str, tokens: &'t [Token]) -> Result<&'t [Token], ParseError> {
    match tokens.split_first() {
        Some((t, rest)) if t.word == word => Ok(rest),
        Some((t, _)) => Err(ParseError::at(
            t.line,
            format!(
                "Unexpected token '{}' on line {}, expected '{}'.",
                t.word, t.line, word
            ),
        )),
        None => Err(ParseError::eof(format!("Unexpected EOF, expected '{}'.", word))),
    }
}

enum PendingRule {
    Literal(String),
    Pattern(String),
    Sequence(Vec<Element>),
    Alternation(Vec<String>),
}

/// Collects rule definitions; [`GrammarBuilder::build`] validates them.
#[derive(Default)]
pub struct GrammarBuilder {
    rules: Vec<(String, PendingRule)>,
}

impl GrammarBuilder {
    pub fn literal(mut self, name: &str, word: &str) -> Self {
        self.rules
            .push((name.to_owned(), PendingRule::Literal(word.to_owned())));
        self
    }

    pub fn pattern(mut self, name: &str, pattern: &str) -> Self {
        self.rules
            .push((name.to_owned(), PendingRule::Pattern(pattern.to_owned())));
        self
    }

    pub fn sequence(mut self, name: &str, elements: &[&str]) -> Self {
        let elements = elements.iter().map(|e| Element::parse(e)).collect();
        self.rules
            .push((name.to_owned(), PendingRule::Sequence(elements)));
        self
    }

    pub fn alternation(mut self, name: &str, alternatives: &[&str]) -> Self {
        let alternatives = alternatives.iter().map(|a| (*a).to_owned()).collect();
        self.rules
            .push((name.to_owned(), PendingRule::Alternation(alternatives)));
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut names = BTreeSet::new();
        for (name, _) in &self.rules {
            if !names.insert(name.as_str()) {
                return Err(GrammarError::DuplicateRule(name.clone()));
            }
        }

        let mut rules = BTreeMap::new();
        for (name, pending) in &self.rules {
            let rule = match pending {
                PendingRule::Literal(word) => Rule::Literal(word.clone()),
                PendingRule::Pattern(src) => {
                    let re = Regex::new(&format!("^(?:{})$", src)).map_err(|source| {
                        GrammarError::InvalidPattern {
                            rule: name.clone(),
                            source,
                        }
                    })?;
                    Rule::Pattern(re)
                }
                PendingRule::Sequence(elements) => {
                    let mut seen = BTreeSet::new();
                    for element in elements {
                        if let Element::Ref { rule, .. } = element {
                            check_ref(name, rule, &names)?;
                            if !seen.insert(rule.as_str()) {
                                return Err(GrammarError::RepeatedReference {
                                    rule: name.clone(),
                                    reference: rule.clone(),
                                });
                            }
                        }
                    }
                    Rule::Sequence(elements.clone())
                }
                PendingRule::Alternation(alternatives) => {
                    for alt in alternatives {
                        check_ref(name, alt, &names)?;
                    }
                    Rule::Alternation(alternatives.clone())
                }
            };
            rules.insert(name.clone(), rule);
        }
        Ok(Grammar { rules })
    }
}

fn check_ref(rule: &str, reference: &str, names: &BTreeSet<&str>) -> Result<(), GrammarError> {
    if names.contains(reference) {
        Ok(())
    } else {
        Err(GrammarError::UnknownRule {
            rule: rule.to_owned(),
            missing: reference.to_owned(),
        })
    }
}
