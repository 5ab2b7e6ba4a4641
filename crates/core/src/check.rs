//! The checking pipeline: every loaded declaration against the class model
//! and the adapter library.
//!
//! 1. Precedence declarations must name known adapters; the valid ones form
//!    the library's precedence map.
//! 2. Each precedence cycle is reported as a warning.
//! 3. Each association is checked clause by clause, then wired: directly
//!    when the produced type already fits, through its `using` adapter, or
//!    through resolution.
//! 4. Associations are compared pairwise for overlaps.
//!
//! Problems never stop the pipeline. Everything found across all files ends
//! up in one [`CheckReport`].

use crate::ast::{Association, Declaration, Precedence};
use crate::clause::ClassModel;
use crate::error::{Diagnostic, Severity};
use crate::hierarchy::Hierarchy;
use crate::library::{AdapterLibrary, PrecedenceMap};
use crate::loader::LoadedSpecs;
use crate::precedence::{detect_cycles, Cycle};
use crate::resolve::{check_explicit, resolve, Verdict};
use serde::Serialize;
use tracing::{debug, info};

/// Decides whether two associations inject into the same place.
///
/// Clauses carry the line they were written on, so `==` on clauses from
/// different declarations is false even for the same member. Compare
/// targets with [`WhereClause::same_target`] instead.
///
/// [`WhereClause::same_target`]: crate::ast::WhereClause::same_target
pub trait OverlapCheck {
    /// A message describing the overlap, or `None` if there is none.
    fn overlaps(&self, first: &Association, second: &Association) -> Option<String>;
}

/// Reports no overlaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlapCheck;

impl OverlapCheck for NoOverlapCheck {
    fn overlaps(&self, _: &Association, _: &Association) -> Option<String> {
        None
    }
}

/// How an association gets its object into place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "wiring", rename_all = "snake_case")]
pub enum Wiring {
    /// The produced type is already assignable.
    Direct,
    /// Through the adapter named in the `using` clause.
    Explicit { adapter: String },
    /// Through the adapter resolution picked.
    Resolved { adapter: String },
}

impl Wiring {
    pub fn adapter(&self) -> Option<&str> {
        match self {
            Wiring::Direct => None,
            Wiring::Explicit { adapter } | Wiring::Resolved { adapter } => Some(adapter),
        }
    }
}

/// An association that passed every check.
#[derive(Debug, Clone, Serialize)]
pub struct AssociationOutcome {
    pub association: Association,
    pub where_type: String,
    pub what_type: String,
    #[serde(flatten)]
    pub wiring: Wiring,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub associations: Vec<AssociationOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

pub struct Checker<'a> {
    model: &'a (dyn ClassModel + Sync),
    hierarchy: &'a Hierarchy<'a>,
    library: AdapterLibrary,
    overlap: Box<dyn OverlapCheck + 'a>,
}

impl<'a> Checker<'a> {
    /// `hierarchy` must be built over the same classes as `model`.
    pub fn new(
        model: &'a (dyn ClassModel + Sync),
        hierarchy: &'a Hierarchy<'a>,
        library: AdapterLibrary,
    ) -> Self {
        Checker {
            model,
            hierarchy,
            library,
            overlap: Box::new(NoOverlapCheck),
        }
    }

    pub fn with_overlap_check(mut self, overlap: impl OverlapCheck + 'a) -> Self {
        self.overlap = Box::new(overlap);
        self
    }

    pub fn check(&self, loaded: &LoadedSpecs) -> CheckReport {
        let mut report = CheckReport {
            associations: Vec::new(),
            diagnostics: loaded.diagnostics.clone(),
        };

        let precedences: Vec<&Precedence> = loaded
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Precedence(p) => Some(p),
                Declaration::Association(_) => None,
            })
            .collect();
        let map = self.precedence_map(&precedences, &mut report.diagnostics);
        for cycle in detect_cycles(&map) {
            report.diagnostics.push(cycle_warning(&cycle, &precedences));
        }
        let library = self.library.clone().with_precedence(map);

        let associations: Vec<&Association> = loaded
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Association(a) => Some(a),
                Declaration::Precedence(_) => None,
            })
            .collect();
        for association in &associations {
            match self.wire(association, &library) {
                Ok(outcome) => {
                    debug!(association = %association, wiring = ?outcome.wiring, "wired");
                    report.associations.push(outcome);
                }
                Err(mut problems) => report.diagnostics.append(&mut problems),
            }
        }

        for (i, first) in associations.iter().enumerate() {
            for second in &associations[i + 1..] {
                if let Some(message) = self.overlap.overlaps(first, second) {
                    report.diagnostics.push(Diagnostic::error(
                        &second.prov.file,
                        second.prov.line,
                        message,
                    ));
                }
            }
        }

        info!(
            declarations = loaded.declarations.len(),
            wired = report.associations.len(),
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            "check finished"
        );
        report
    }

    fn precedence_map(
        &self,
        precedences: &[&Precedence],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> PrecedenceMap {
        let mut map = PrecedenceMap::new();
        for p in precedences {
            let mut valid = true;
            for class in [&p.higher, &p.lower] {
                if self.library.contains(&class.name) {
                    continue;
                }
                valid = false;
                let message = if self.model.has_class(&class.name) {
                    format!("class '{}' is not an adapter", class.name)
                } else {
                    format!("class '{}' not found", class.name)
                };
                diagnostics.push(Diagnostic::error(&p.prov.file, class.line, message));
            }
            if valid {
                map.declare(&p.higher.name, &p.lower.name);
            }
        }
        map
    }

    fn wire(
        &self,
        association: &Association,
        library: &AdapterLibrary,
    ) -> Result<AssociationOutcome, Vec<Diagnostic>> {
        let file = association.prov.file.as_str();
        let at = |line: u32, message: String| Diagnostic::error(file, line, message);

        let mut problems = association.where_clause.check(self.model);
        problems.extend(association.what_clause.check(self.model));
        if !problems.is_empty() {
            return Err(problems.into_iter().map(|(l, m)| at(l, m)).collect());
        }

        let where_type = association
            .where_clause
            .resolve_type(self.model)
            .ok_or_else(|| {
                vec![at(
                    association.where_clause.line(),
                    format!("cannot determine the type of {}", association.where_clause),
                )]
            })?;
        let what_type = association
            .what_clause
            .resolve_type(self.model)
            .ok_or_else(|| {
                vec![at(
                    association.what_clause.line(),
                    format!("cannot determine the type of {}", association.what_clause),
                )]
            })?;

        let wiring = if let Some(using) = &association.using {
            check_explicit(&using.name, &what_type, &where_type, library, self.hierarchy)
                .map_err(|e| vec![at(using.line, e.to_string())])?;
            Wiring::Explicit {
                adapter: using.name.clone(),
            }
        } else if self
            .hierarchy
            .is_subtype_or_equal(&what_type, &where_type)
            .map_err(|e| vec![at(association.prov.line, e.to_string())])?
        {
            Wiring::Direct
        } else {
            let verdict = resolve(&what_type, &where_type, library, self.hierarchy)
                .map_err(|e| vec![at(association.prov.line, e.to_string())])?;
            match verdict {
                Verdict::Resolved { adapter } => Wiring::Resolved { adapter },
                other => {
                    return Err(vec![at(
                        association.prov.line,
                        format!("{} from '{}' to '{}'", other, what_type, where_type),
                    )])
                }
            }
        };

        Ok(AssociationOutcome {
            association: association.clone(),
            where_type,
            what_type,
            wiring,
        })
    }
}

/// Anchored at the first precedence declaration linking two cycle members.
fn cycle_warning(cycle: &Cycle, precedences: &[&Precedence]) -> Diagnostic {
    let message = format!("cyclic precedence: {}", cycle);
    let member = |name: &str| cycle.members.iter().any(|m| m == name);
    match precedences
        .iter()
        .find(|p| member(&p.higher.name) && member(&p.lower.name))
    {
        Some(p) => Diagnostic::warning(&p.prov.file, p.prov.line, message),
        None => Diagnostic::warning("", 0, message),
    }
}
