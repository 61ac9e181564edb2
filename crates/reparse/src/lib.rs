//! # reparse
//!
//! Packrat PEG parsing whose memo chart survives edits to the text.
//!
//! ## Overview
//!
//! - **Grammars**: compile grammar text with [`Grammar::compile`] or build
//!   rules with [`GrammarBuilder`]; a grammar is immutable and shared.
//! - **Parsings**: a [`Parsing`] owns a subject and its memo chart.
//!   [`Parsing::replace`] edits the subject and drops only the memo entries
//!   that inspected the edited text.
//! - **Semantics**: a parse records an op stream; [`ParseOutcome::interpret`]
//!   replays it through a [`Semantics`] to build values.
//!
//! ## Quick Start
//!
//! ```rust
//! use reparse::semantics::{base_semantics, operator_semantics, ComboSemantics};
//! use reparse::{Grammar, Value};
//!
//! let grammar = Grammar::compile(
//!     "
//!     start = exp0.
//!     exp0  : exp1 ('+' exp1 :add | '-' exp1 :sub)*.
//!     exp1  : exp2 ('*' exp2 :mul | '/' exp2 :truediv)*.
//!     exp2  : '(' exp0 ')' | {digit+} :int.
//!     digit = '0'..'9'.
//!     ",
//! )?;
//! let calc = ComboSemantics::new()
//!     .with(operator_semantics())
//!     .with(base_semantics());
//!
//! let mut parsing = grammar.parsing("2*8-5/2");
//! assert_eq!(parsing.parse("start")?.interpret(&calc)?, [Value::Float(13.5)]);
//!
//! // Edit the subject; only memo entries that looked at position 1 are redone.
//! parsing.replace(1, 2, "0")?;
//! assert_eq!(parsing.subject(), "208-5/2");
//! assert_eq!(parsing.parse("start")?.interpret(&calc)?, [Value::Float(205.5)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Surface expressions, compiled combinators, grammar text
//! - [`parsing`] - The memo chart and the incremental [`Parsing`]
//! - [`outcome`] - Parse results and semantic replay
//! - [`semantics`] - Values, actions and the built-in action sets
//! - [`ops`] - Match results and op streams
//! - [`error`] - Error types and diagnostics
//! - [`testing`] - Generators for property tests and fuzzing

pub mod error;
pub mod grammar;
pub mod line_col;
pub mod ops;
pub mod outcome;
pub mod parsing;
pub mod semantics;
pub mod testing;

// Re-export commonly used types
pub use error::{GrammarError, ParseError};
pub use grammar::{Expr, Grammar, GrammarBuilder, Parser, RuleId};
pub use line_col::{LineCol, LineIndex};
pub use ops::{MatchResult, Op, OpStream};
pub use outcome::ParseOutcome;
pub use parsing::{ChartStats, Invalidation, InvalidationStrategy, Parsing, ParsingConfig};
pub use semantics::{
    ActionError, AstSemantics, ComboSemantics, DictSemantics, Semantics, Value,
};
