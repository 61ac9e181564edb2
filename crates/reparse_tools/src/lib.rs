//! reparse tools: developer utilities for reparse grammars
//!
//! The `reparse` binary compiles grammar files, draws their rule graphs and
//! runs (incremental) parses from the command line.

pub mod cli;
pub mod report;
pub mod visualize;

pub use visualize::generate_dot;
