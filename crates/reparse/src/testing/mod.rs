//! # Testing Utilities
//!
//! Helpers for testing grammars and the incremental engine.
//!
//! ## Property-Based Testing
//!
//! [`SubjectGenerator`] walks a grammar's rules to produce subjects, and
//! [`EditMutation`] sequences drive a [`Parsing`](crate::Parsing) through
//! random edits, so an incrementally updated parsing can be compared against
//! a fresh one.

pub mod generators;

pub use generators::*;
