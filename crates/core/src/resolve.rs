//! Adapter resolution: pick the single best adapter for a (from, to) pair.
//!
//! 1. Eligibility: the adapter accepts `from` or one of its ancestors, and
//!    provides `to` at some level of its own ancestry.
//! 2. Closest from: keep the adapters accepting the most specific type in
//!    `[{from}] ++ leveled_supertypes(from)`.
//! 3. Closest to: keep the adapters providing `to` at the shallowest level.
//! 4. Precedence: drop every tied adapter that another tied adapter is
//!    declared to precede. Nothing left means the tie is a precedence cycle.

use crate::error::{ExplicitAdapterError, HierarchyError};
use crate::hierarchy::Hierarchy;
use crate::library::{AdapterDescriptor, AdapterLibrary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Resolved { adapter: String },
    Ambiguous { candidates: BTreeSet<String> },
    NotFound,
    CyclicPrecedence { involved: BTreeSet<String> },
}

impl Verdict {
    pub fn adapter(&self) -> Option<&str> {
        match self {
            Verdict::Resolved { adapter } => Some(adapter),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Resolved { adapter } => write!(f, "resolved to {}", adapter),
            Verdict::Ambiguous { candidates } => write!(
                f,
                "ambiguous adapters: {}",
                candidates.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
            Verdict::NotFound => f.write_str("no suitable adapter found"),
            Verdict::CyclicPrecedence { involved } => write!(
                f,
                "cyclic precedence between adapters: {}",
                involved.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// Adapters that can turn a `from` into something assignable to `to`.
pub fn eligible<'l>(
    from: &str,
    to: &str,
    library: &'l AdapterLibrary,
    hierarchy: &Hierarchy<'_>,
) -> Result<Vec<&'l AdapterDescriptor>, HierarchyError> {
    let mut accepted = hierarchy.ancestors(from)?;
    accepted.insert(from.to_owned());
    Ok(library
        .adapters()
        .filter(|a| a.accepts_any(&accepted) && a.provides(to))
        .collect())
}

/// Validate an adapter chosen by the user instead of by resolution.
pub fn check_explicit(
    adapter: &str,
    from: &str,
    to: &str,
    library: &AdapterLibrary,
    hierarchy: &Hierarchy<'_>,
) -> Result<(), ExplicitAdapterError> {
    if !library.contains(adapter) {
        return Err(ExplicitAdapterError::UnknownAdapter(adapter.to_owned()));
    }
    if eligible(from, to, library, hierarchy)?
        .iter()
        .any(|a| a.name == adapter)
    {
        Ok(())
    } else {
        Err(ExplicitAdapterError::NotEligible {
            adapter: adapter.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
        })
    }
}

pub fn resolve(
    from: &str,
    to: &str,
    library: &AdapterLibrary,
    hierarchy: &Hierarchy<'_>,
) -> Result<Verdict, HierarchyError> {
    let candidates = eligible(from, to, library, hierarchy)?;
    debug!(from, to, eligible = candidates.len(), "adapter eligibility");
    if let Some(verdict) = settled(&candidates) {
        return Ok(verdict);
    }

    let candidates = closest_from(candidates, &hierarchy.self_and_levels(from)?);
    debug!(from, to, remaining = candidates.len(), "closest accepted type");
    if let Some(verdict) = settled(&candidates) {
        return Ok(verdict);
    }

    let candidates = closest_to(candidates, to);
    debug!(from, to, remaining = candidates.len(), "closest provided type");
    if let Some(verdict) = settled(&candidates) {
        return Ok(verdict);
    }

    Ok(by_precedence(&candidates, library))
}

fn settled(candidates: &[&AdapterDescriptor]) -> Option<Verdict> {
    match candidates {
        [] => Some(Verdict::NotFound),
        [only] => Some(Verdict::Resolved {
            adapter: only.name.clone(),
        }),
        _ => None,
    }
}

fn closest_from<'l>(
    candidates: Vec<&'l AdapterDescriptor>,
    from_levels: &[BTreeSet<String>],
) -> Vec<&'l AdapterDescriptor> {
    for level in from_levels {
        let hits: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|a| a.accepts_any(level))
            .collect();
        if !hits.is_empty() {
            return hits;
        }
    }
    candidates
}

fn closest_to<'l>(candidates: Vec<&'l AdapterDescriptor>, to: &str) -> Vec<&'l AdapterDescriptor> {
    let depth = candidates
        .iter()
        .map(|a| a.adapts_to.len())
        .max()
        .unwrap_or(0);
    for d in 0..depth {
        let hits: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|a| a.provides_at(d, to))
            .collect();
        if !hits.is_empty() {
            return hits;
        }
    }
    candidates
}

fn by_precedence(candidates: &[&AdapterDescriptor], library: &AdapterLibrary) -> Verdict {
    let closest: BTreeSet<String> = candidates.iter().map(|a| a.name.clone()).collect();
    let survivors: BTreeSet<String> = closest
        .iter()
        .filter(|name| {
            library
                .precedence()
                .preceding(name)
                .map_or(true, |higher| higher.is_disjoint(&closest))
        })
        .cloned()
        .collect();
    debug!(tied = closest.len(), survivors = survivors.len(), "precedence");

    match survivors.len() {
        0 => Verdict::CyclicPrecedence { involved: closest },
        1 => Verdict::Resolved {
            adapter: survivors.into_iter().next().unwrap_or_default(),
        },
        _ => Verdict::Ambiguous {
            candidates: survivors,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::Table;
    use crate::library::PrecedenceMap;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    /// The A/B hierarchy plus the adapters that bridge it.
    fn table() -> Table {
        Table::new(&[
            ("Object", &[]),
            ("SuperSuperA", &["Object"]),
            ("SuperA", &["SuperSuperA"]),
            ("A", &["SuperA"]),
            ("SubA", &["A"]),
            ("SuperB", &["Object"]),
            ("B", &["SuperB"]),
            ("SubB", &["B"]),
            ("SubSubB", &["SubB"]),
            ("TwiceB", &["B"]),
            ("BtoA", &["Object", "A"]),
            ("SubBtoA", &["Object", "A"]),
            ("BtoSuperA", &["Object", "SuperA"]),
            ("TwiceBtoA1", &["Object", "A"]),
            ("TwiceBtoA2", &["Object", "A"]),
            ("TwiceBtoA3", &["Object", "A"]),
        ])
    }

    fn library(h: &Hierarchy<'_>, names: &[(&str, &[&str])]) -> AdapterLibrary {
        names
            .iter()
            .map(|(name, from)| AdapterDescriptor::discover(name, from.iter().copied(), h).unwrap())
            .collect()
    }

    #[test]
    fn single_adapter_resolves() {
        let lib = AdapterLibrary::from_iter([AdapterDescriptor::new(
            "X",
            set(&["From"]),
            vec![set(&["To"])],
        )]);
        let table = Table::new(&[("From", &[]), ("To", &[])]);
        let h = Hierarchy::new(&table);
        assert_eq!(
            resolve("From", "To", &lib, &h).unwrap(),
            Verdict::Resolved {
                adapter: "X".into()
            }
        );
    }

    #[test]
    fn nothing_eligible_is_not_found() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("BtoA", &["B"])]);
        // Wrong direction.
        assert_eq!(resolve("A", "B", &lib, &h).unwrap(), Verdict::NotFound);
        // BtoA accepts B, not its supertype.
        assert_eq!(resolve("SuperB", "A", &lib, &h).unwrap(), Verdict::NotFound);
        // BtoA is an A, not a SubA.
        assert_eq!(resolve("B", "SubA", &lib, &h).unwrap(), Verdict::NotFound);
    }

    #[test]
    fn eligibility_is_contravariant_in_from_and_covariant_in_to() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("BtoA", &["B"])]);
        assert_eq!(
            resolve("SubSubB", "SuperSuperA", &lib, &h).unwrap().adapter(),
            Some("BtoA")
        );
    }

    #[test]
    fn most_specific_accepted_type_wins() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("BtoA", &["B"]), ("SubBtoA", &["SubB", "SubSubB"])]);
        assert_eq!(
            resolve("SubSubB", "A", &lib, &h).unwrap().adapter(),
            Some("SubBtoA")
        );
        assert_eq!(resolve("SubB", "A", &lib, &h).unwrap().adapter(), Some("SubBtoA"));
        assert_eq!(resolve("B", "A", &lib, &h).unwrap().adapter(), Some("BtoA"));
    }

    #[test]
    fn most_specific_provided_type_wins() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("BtoA", &["B"]), ("BtoSuperA", &["B"])]);
        assert_eq!(
            resolve("B", "SuperA", &lib, &h).unwrap().adapter(),
            Some("BtoSuperA")
        );
        assert_eq!(resolve("B", "A", &lib, &h).unwrap().adapter(), Some("BtoA"));
    }

    #[test]
    fn equal_distance_is_ambiguous() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("TwiceBtoA1", &["B"]), ("TwiceBtoA2", &["B"])]);
        assert_eq!(
            resolve("B", "A", &lib, &h).unwrap(),
            Verdict::Ambiguous {
                candidates: set(&["TwiceBtoA1", "TwiceBtoA2"])
            }
        );
    }

    #[test]
    fn precedence_breaks_the_tie() {
        let t = table();
        let h = Hierarchy::new(&t);
        let mut precedence = PrecedenceMap::new();
        precedence.declare("TwiceBtoA1", "TwiceBtoA2");
        let lib = library(&h, &[("TwiceBtoA1", &["B"]), ("TwiceBtoA2", &["B"])])
            .with_precedence(precedence);
        assert_eq!(
            resolve("B", "A", &lib, &h).unwrap().adapter(),
            Some("TwiceBtoA1")
        );
    }

    #[test]
    fn precedence_outside_the_tie_is_ignored() {
        let t = table();
        let h = Hierarchy::new(&t);
        let mut precedence = PrecedenceMap::new();
        precedence.declare("BtoA", "TwiceBtoA2");
        let lib = library(&h, &[("TwiceBtoA1", &["B"]), ("TwiceBtoA2", &["B"])])
            .with_precedence(precedence);
        assert!(matches!(
            resolve("B", "A", &lib, &h).unwrap(),
            Verdict::Ambiguous { .. }
        ));
    }

    #[test]
    fn partial_precedence_leaves_remaining_ambiguity() {
        let t = table();
        let h = Hierarchy::new(&t);
        let mut precedence = PrecedenceMap::new();
        precedence.declare("TwiceBtoA1", "TwiceBtoA3");
        let lib = library(
            &h,
            &[
                ("TwiceBtoA1", &["B"]),
                ("TwiceBtoA2", &["B"]),
                ("TwiceBtoA3", &["B"]),
            ],
        )
        .with_precedence(precedence);
        assert_eq!(
            resolve("B", "A", &lib, &h).unwrap(),
            Verdict::Ambiguous {
                candidates: set(&["TwiceBtoA1", "TwiceBtoA2"])
            }
        );
    }

    #[test]
    fn mutual_precedence_is_cyclic() {
        let t = table();
        let h = Hierarchy::new(&t);
        let mut precedence = PrecedenceMap::new();
        precedence.declare("TwiceBtoA1", "TwiceBtoA2");
        precedence.declare("TwiceBtoA2", "TwiceBtoA1");
        let lib = library(&h, &[("TwiceBtoA1", &["B"]), ("TwiceBtoA2", &["B"])])
            .with_precedence(precedence);
        assert_eq!(
            resolve("B", "A", &lib, &h).unwrap(),
            Verdict::CyclicPrecedence {
                involved: set(&["TwiceBtoA1", "TwiceBtoA2"])
            }
        );
    }

    #[test]
    fn specific_adapter_beats_tied_generic_ones() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(
            &h,
            &[
                ("TwiceBtoA1", &["B"]),
                ("TwiceBtoA2", &["B"]),
                ("TwiceBtoA3", &["TwiceB"]),
            ],
        );
        assert_eq!(
            resolve("TwiceB", "A", &lib, &h).unwrap().adapter(),
            Some("TwiceBtoA3")
        );
    }

    #[test]
    fn widening_adapts_from_only_adds_eligibility() {
        let t = table();
        let h = Hierarchy::new(&t);
        let narrow = library(&h, &[("BtoA", &["B"]), ("SubBtoA", &["SubSubB"])]);
        let wide = library(&h, &[("BtoA", &["B"]), ("SubBtoA", &["SubSubB", "SuperB"])]);
        let before: BTreeSet<_> = eligible("SubB", "A", &narrow, &h)
            .unwrap()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        let after: BTreeSet<_> = eligible("SubB", "A", &wide, &h)
            .unwrap()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        assert!(before.is_subset(&after));
        assert_eq!(after, set(&["BtoA", "SubBtoA"]));
    }

    #[test]
    fn unknown_from_type_is_an_error() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("BtoA", &["B"])]);
        assert_eq!(
            resolve("Ghost", "A", &lib, &h).unwrap_err(),
            HierarchyError::UnknownType("Ghost".into())
        );
    }

    #[test]
    fn explicit_adapter_must_exist_and_fit() {
        let t = table();
        let h = Hierarchy::new(&t);
        let lib = library(&h, &[("TwiceBtoA1", &["B"]), ("TwiceBtoA2", &["B"])]);
        assert_eq!(check_explicit("TwiceBtoA2", "SubB", "SuperA", &lib, &h), Ok(()));
        assert_eq!(
            check_explicit("BtoA", "B", "A", &lib, &h),
            Err(ExplicitAdapterError::UnknownAdapter("BtoA".into()))
        );
        assert_eq!(
            check_explicit("TwiceBtoA1", "SuperB", "A", &lib, &h)
                .unwrap_err()
                .to_string(),
            "adapter 'TwiceBtoA1' cannot adapt 'SuperB' to 'A'"
        );
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let v = Verdict::Resolved {
            adapter: "X".into(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["verdict"], "resolved");
        assert_eq!(json["adapter"], "X");
        assert_eq!(
            serde_json::to_value(Verdict::NotFound).unwrap()["verdict"],
            "not_found"
        );
    }
}
