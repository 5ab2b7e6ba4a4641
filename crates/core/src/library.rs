//! Adapter descriptors, the precedence map, and the adapter library that
//! resolution reads from.

use crate::ast::Declaration;
use crate::error::HierarchyError;
use crate::hierarchy::{Hierarchy, Levels};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What an adapter can be built from and what it can stand in for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    pub name: String,
    /// Parameter types of the adapter's single-argument constructors.
    pub adapts_from: BTreeSet<String>,
    /// Leveled supertypes of the adapter's own type.
    pub adapts_to: Levels,
}

impl AdapterDescriptor {
    pub fn new(name: impl Into<String>, adapts_from: BTreeSet<String>, adapts_to: Levels) -> Self {
        AdapterDescriptor {
            name: name.into(),
            adapts_from,
            adapts_to,
        }
    }

    /// Describe adapter `name` given its single-argument constructor
    /// parameter types, taking `adapts_to` from the hierarchy.
    pub fn discover<I, S>(
        name: &str,
        constructor_params: I,
        hierarchy: &Hierarchy<'_>,
    ) -> Result<Self, HierarchyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adapts_to = hierarchy.leveled_supertypes(name)?.as_ref().clone();
        Ok(AdapterDescriptor::new(
            name,
            constructor_params.into_iter().map(Into::into).collect(),
            adapts_to,
        ))
    }

    pub fn accepts_any(&self, types: &BTreeSet<String>) -> bool {
        !self.adapts_from.is_disjoint(types)
    }

    pub fn provides(&self, to: &str) -> bool {
        self.adapts_to.iter().any(|level| level.contains(to))
    }

    pub fn provides_at(&self, depth: usize, to: &str) -> bool {
        self.adapts_to
            .get(depth)
            .is_some_and(|level| level.contains(to))
    }
}

/// For each adapter, the adapters declared to take precedence over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecedenceMap(BTreeMap<String, BTreeSet<String>>);

impl PrecedenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `higher` over `lower`.
    pub fn declare(&mut self, higher: &str, lower: &str) {
        self.0
            .entry(lower.to_owned())
            .or_default()
            .insert(higher.to_owned());
    }

    /// The adapters declared to precede `name`.
    pub fn preceding(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.0.get(name)
    }

    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut map = PrecedenceMap::new();
        for d in declarations {
            if let Declaration::Precedence(p) = d {
                map.declare(&p.higher.name, &p.lower.name);
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(lower, highers)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterLibrary {
    adapters: BTreeMap<String, AdapterDescriptor>,
    #[serde(default)]
    precedence: PrecedenceMap,
}

impl AdapterLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, adapter: AdapterDescriptor) {
        self.adapters.insert(adapter.name.clone(), adapter);
    }

    pub fn with_precedence(mut self, precedence: PrecedenceMap) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn set_precedence(&mut self, precedence: PrecedenceMap) {
        self.precedence = precedence;
    }

    pub fn get(&self, name: &str) -> Option<&AdapterDescriptor> {
        self.adapters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    pub fn adapters(&self) -> impl Iterator<Item = &AdapterDescriptor> {
        self.adapters.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn precedence(&self) -> &PrecedenceMap {
        &self.precedence
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl FromIterator<AdapterDescriptor> for AdapterLibrary {
    fn from_iter<T: IntoIterator<Item = AdapterDescriptor>>(iter: T) -> Self {
        let mut library = AdapterLibrary::new();
        for adapter in iter {
            library.insert(adapter);
        }
        library
    }
}
