//! Precedence cycle detection over the whole declared precedence map.
//!
//! Edges run from a lower adapter to each adapter declared over it. Each
//! depth-first traversal starts at the smallest not-yet-visited name and
//! records a cycle whenever it reaches a name already on its path. Nodes a
//! traversal touched are never used again, cycle or not.

use crate::library::PrecedenceMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::warn;

/// A precedence cycle, in path order, without repeating its first member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub members: Vec<String>,
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = self.members.clone();
        if let Some(first) = self.members.first() {
            path.push(first.clone());
        }
        f.write_str(&path.join(" \u{2192} "))
    }
}

pub fn detect_cycles(precedence: &PrecedenceMap) -> Vec<Cycle> {
    let mut nodes: BTreeSet<&str> = BTreeSet::new();
    for (lower, highers) in precedence.iter() {
        nodes.insert(lower.as_str());
        nodes.extend(highers.iter().map(String::as_str));
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();
    for &start in &nodes {
        if visited.contains(start) {
            continue;
        }
        let mut path = Vec::new();
        dfs(start, precedence, &mut visited, &mut path, &mut cycles);
    }

    for cycle in &cycles {
        warn!(cycle = %cycle, "precedence cycle");
    }
    cycles
}

fn dfs<'a>(
    node: &'a str,
    precedence: &'a PrecedenceMap,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Cycle>,
) {
    visited.insert(node);
    path.push(node);
    if let Some(highers) = precedence.preceding(node) {
        for next in highers {
            if let Some(pos) = path.iter().position(|&p| p == next.as_str()) {
                cycles.push(Cycle {
                    members: path[pos..].iter().map(|s| (*s).to_owned()).collect(),
                });
            } else if !visited.contains(next.as_str()) {
                dfs(next.as_str(), precedence, visited, path, cycles);
            }
        }
    }
    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> PrecedenceMap {
        let mut m = PrecedenceMap::new();
        for (higher, lower) in pairs {
            m.declare(higher, lower);
        }
        m
    }

    #[test]
    fn no_declarations_no_cycles() {
        assert!(detect_cycles(&PrecedenceMap::new()).is_empty());
    }

    #[test]
    fn chain_is_acyclic() {
        let m = map(&[("A", "B"), ("B", "C"), ("A", "C")]);
        assert!(detect_cycles(&m).is_empty());
    }

    #[test]
    fn two_cycle_reported_once() {
        let m = map(&[("A", "B"), ("B", "A")]);
        let cycles = detect_cycles(&m);
        assert_eq!(cycles.len(), 1);
        let members: BTreeSet<&str> = cycles[0].members.iter().map(String::as_str).collect();
        assert_eq!(members, BTreeSet::from(["A", "B"]));
    }

    #[test]
    fn three_cycle_in_path_order() {
        // C over B, B over A, A over C: A -> B -> C -> A
        let m = map(&[("C", "B"), ("B", "A"), ("A", "C")]);
        let cycles = detect_cycles(&m);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["A", "B", "C"]);
        assert_eq!(cycles[0].to_string(), "A \u{2192} B \u{2192} C \u{2192} A");
    }

    #[test]
    fn self_precedence_is_a_cycle() {
        let m = map(&[("A", "A")]);
        let cycles = detect_cycles(&m);
        assert_eq!(cycles, vec![Cycle { members: vec!["A".into()] }]);
    }

    #[test]
    fn independent_cycles_are_all_reported() {
        let m = map(&[("A", "B"), ("B", "A"), ("X", "Y"), ("Y", "X"), ("P", "Q")]);
        assert_eq!(detect_cycles(&m).len(), 2);
    }

    #[test]
    fn cycle_reached_from_a_tail() {
        // T -> A -> B -> A
        let m = map(&[("A", "T"), ("B", "A"), ("A", "B")]);
        let cycles = detect_cycles(&m);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["A", "B"]);
    }
}
