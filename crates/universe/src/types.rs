//! Typed structs for the type universe JSON document.
//!
//! ```json
//! { "classes": { "app.Main": { "supertypes": ["java.lang.Object"],
//!                              "fields": { "store": { "type": "app.Store" } } } } }
//! ```
//!
//! Every collection defaults to empty, so a class with nothing to say is
//! written as `{}`. Unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The whole document: classes keyed by qualified name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniverseDoc {
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDecl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassDecl {
    /// Direct supertypes. A class with none is a root.
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDecl>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDecl>,
    /// Parameter type lists, one per constructor.
    #[serde(default)]
    pub constructors: Vec<Vec<String>>,
    /// Marked as an adapter.
    #[serde(default)]
    pub adapter: bool,
}

impl ClassDecl {
    /// Parameter types of the constructors taking exactly one argument.
    pub fn single_arg_constructors(&self) -> impl Iterator<Item = &str> {
        self.constructors
            .iter()
            .filter_map(|params| match params.as_slice() {
                [only] => Some(only.as_str()),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDecl {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodDecl {
    pub returns: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<String>,
}
