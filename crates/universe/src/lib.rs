//! gluer-universe: the classes a specification is checked against.
//!
//! A universe is a JSON document describing classes: their supertypes,
//! fields, methods, constructors, and whether they are adapters. Loading
//! one yields a [`Universe`], which serves as the core's type oracle and
//! class model and builds the adapter library.

pub mod types;
pub mod universe;

pub use types::*;
pub use universe::{Universe, UniverseError};
