//! gluer-core: parsing and checking of adapter-aware association
//! declarations.
//!
//! A specification file holds two kinds of declaration:
//!
//! ```text
//! associate field app.Main.store with new app.DiskStore using app.StoreAdapter
//! declare precedence app.FastAdapter over app.SlowAdapter
//! ```
//!
//! The pipeline runs tokenizer → grammar interpreter → declaration model →
//! checker. The checker asks a [`ClassModel`] about classes and members and
//! an [`AdapterLibrary`] about adapters; both are supplied by the caller.
//!
//! # Public API
//!
//! - [`load_specs()`] / [`parse_spec()`] -- read declarations
//! - [`Checker`] -- run every semantic check, collecting a [`CheckReport`]
//! - [`resolve()`] -- pick the adapter for one (from, to) pair
//! - [`detect_cycles()`] -- find precedence cycles
//! - [`Grammar`] -- the table-driven interpreter behind the parser

pub mod ast;
pub mod check;
pub mod clause;
pub mod error;
pub mod grammar;
pub mod hierarchy;
pub mod lexer;
pub mod library;
pub mod loader;
pub mod precedence;
pub mod resolve;
pub mod source;
pub mod syntax;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Association, ClassRef, Declaration, MemberRef, Precedence, Provenance};
pub use check::{AssociationOutcome, CheckReport, Checker, NoOverlapCheck, OverlapCheck, Wiring};
pub use clause::{ClassModel, FieldInfo, MethodInfo};
pub use error::{
    Diagnostic, ExplicitAdapterError, GrammarError, HierarchyError, ParseError, Severity,
};
pub use grammar::{Grammar, Node};
pub use hierarchy::{Hierarchy, Levels, TypeOracle};
pub use lexer::{tokenize, Token};
pub use library::{AdapterDescriptor, AdapterLibrary, PrecedenceMap};
pub use loader::LoadedSpecs;
pub use precedence::Cycle;
pub use resolve::Verdict;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use loader::{load_spec_files, load_specs};
pub use precedence::detect_cycles;
pub use resolve::{check_explicit, eligible, resolve};
pub use syntax::parse_spec;
