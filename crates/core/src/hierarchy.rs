//! Type hierarchy access.
//!
//! A [`TypeOracle`] answers "what are the immediate supertypes of this
//! type". [`Hierarchy`] sits on top of an oracle for the length of one
//! session and memoizes both the direct answers and the derived leveled
//! ancestor sets. The caches fill once per key, so a `Hierarchy` can be
//! shared by reference between threads resolving in parallel.

use crate::error::HierarchyError;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Leveled ancestor sets: level 0 holds the direct supertypes, each later
/// level only names not seen at an earlier one.
pub type Levels = Vec<BTreeSet<String>>;

/// Source of immediate supertypes.
pub trait TypeOracle {
    /// `None` for a type the oracle does not know; `Some` of an empty set
    /// for the root type.
    fn direct_supertypes(&self, name: &str) -> Option<BTreeSet<String>>;
}

/// Session-scoped, memoizing view of a [`TypeOracle`].
pub struct Hierarchy<'a> {
    oracle: &'a (dyn TypeOracle + Sync),
    direct: DashMap<String, Arc<BTreeSet<String>>>,
    leveled: DashMap<String, Arc<Levels>>,
}

impl<'a> Hierarchy<'a> {
    pub fn new(oracle: &'a (dyn TypeOracle + Sync)) -> Self {
        Hierarchy {
            oracle,
            direct: DashMap::new(),
            leveled: DashMap::new(),
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.supertypes(name).is_ok()
    }

    pub fn supertypes(&self, name: &str) -> Result<Arc<BTreeSet<String>>, HierarchyError> {
        if let Some(hit) = self.direct.get(name) {
            return Ok(Arc::clone(hit.value()));
        }
        let supers = self
            .oracle
            .direct_supertypes(name)
            .ok_or_else(|| HierarchyError::UnknownType(name.to_owned()))?;
        let entry = self
            .direct
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(supers));
        Ok(Arc::clone(entry.value()))
    }

    /// Breadth-first ancestor levels of `name`. Names reached along several
    /// paths are kept only at the earliest level; empty levels are dropped.
    pub fn leveled_supertypes(&self, name: &str) -> Result<Arc<Levels>, HierarchyError> {
        if let Some(hit) = self.leveled.get(name) {
            return Ok(Arc::clone(hit.value()));
        }

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut levels: Levels = Vec::new();
        let mut frontier: BTreeSet<String> = self.supertypes(name)?.as_ref().clone();
        while !frontier.is_empty() {
            let mut next = BTreeSet::new();
            for ty in &frontier {
                next.extend(self.supertypes(ty)?.iter().cloned());
            }
            seen.extend(frontier.iter().cloned());
            levels.push(frontier);
            next.retain(|ty| !seen.contains(ty));
            frontier = next;
        }
        debug!(ty = name, depth = levels.len(), "computed leveled supertypes");

        let entry = self
            .leveled
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(levels));
        Ok(Arc::clone(entry.value()))
    }

    /// Every ancestor of `name`, across all levels.
    pub fn ancestors(&self, name: &str) -> Result<BTreeSet<String>, HierarchyError> {
        Ok(self
            .leveled_supertypes(name)?
            .iter()
            .flat_map(|level| level.iter().cloned())
            .collect())
    }

    /// `[{name}]` followed by the leveled supertypes of `name`: the search
    /// order used when looking for the most specific accepted type.
    pub fn self_and_levels(&self, name: &str) -> Result<Levels, HierarchyError> {
        let mut levels = vec![BTreeSet::from([name.to_owned()])];
        levels.extend(self.leveled_supertypes(name)?.iter().cloned());
        Ok(levels)
    }

    /// `a == b`, or `b` is an ancestor of `a`.
    pub fn is_subtype_or_equal(&self, a: &str, b: &str) -> Result<bool, HierarchyError> {
        if a == b {
            return Ok(true);
        }
        Ok(self
            .leveled_supertypes(a)?
            .iter()
            .any(|level| level.contains(b)))
    }
}
