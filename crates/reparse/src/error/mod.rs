//! # Error Types
//!
//! Errors raised while compiling grammars, parsing subjects and interpreting
//! outcomes.
//!
//! ## Overview
//!
//! - [`GrammarError`]: the grammar text or builder input is malformed.
//! - [`ParseError`]: everything that can go wrong once a grammar exists:
//!   total failure ([`ParseError::Unparsable`]), prefix-only matches
//!   ([`ParseError::Incomplete`]), the fatal left-recursion and
//!   stuck-repetition guards, bad edits, and semantic action failures.
//!
//! Nothing is recovered inside the engine; every error surfaces to the caller
//! of `parse`, `replace` or `interpret`. Positions are `char` offsets into the
//! subject, and [`diagnostics::render_context`] turns them into a
//! line/column report.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, both enums implement
//! [`miette::Diagnostic`] with stable error codes.

pub mod diagnostics;

use crate::semantics::ActionError;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors raised by a [`Parsing`](crate::Parsing) or a
/// [`ParseOutcome`](crate::ParseOutcome).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// No alternative matched; `far` is the deepest position any attempt reached.
    #[error("Unparsable: no match (farthest position reached: {far})")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(reparse::unparsable),
            help("the syntax error is most likely near the farthest position")
        )
    )]
    Unparsable { far: usize, subject: String },

    /// The rule matched a strict prefix of the subject.
    #[error("Incomplete parse: matched {advance} of {len} characters (farthest position reached: {far})", len = subject.chars().count())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::incomplete)))]
    Incomplete {
        advance: usize,
        far: usize,
        subject: String,
    },

    #[error("Left-recursive rule `{rule}` re-entered at position {position}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(reparse::left_recursion),
            help("rewrite the rule with repetition, e.g. `e = t ('+' t)*`")
        )
    )]
    LeftRecursion { rule: String, position: usize },

    #[error("Stuck on repeat: repeated expression matched the empty string at position {position}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::stuck_on_repeat)))]
    StuckOnRepeat { position: usize },

    /// Rule calls nested deeper than [`ParsingConfig::max_depth`](crate::ParsingConfig::max_depth).
    #[error("Nesting too deep: more than {limit} nested rule calls at position {position}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(reparse::depth_exceeded),
            help("raise `ParsingConfig::max_depth` and run the parse on a thread with a larger stack")
        )
    )]
    DepthExceeded { position: usize, limit: usize },

    #[error("Unknown rule `{name}`{}", suggestion.as_ref().map(|s| format!(" (did you mean `{s}`?)")).unwrap_or_default())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::unknown_rule)))]
    UnknownRule {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Unknown semantic action `{name}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::unknown_action)))]
    UnknownAction { name: String },

    #[error("Semantic action `{name}` failed: {source}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::action_failed)))]
    ActionFailed {
        name: String,
        #[source]
        source: ActionError,
    },

    #[error("Unbalanced scope brackets in op stream")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::unbalanced_scope)))]
    UnbalancedScope,

    #[error("Edit {lo}..{hi} is out of bounds for a subject of length {len}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::edit_out_of_bounds)))]
    EditOutOfBounds { lo: usize, hi: usize, len: usize },
}

impl ParseError {
    /// Best position to report for this error, if it has one.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Unparsable { far, .. } | Self::Incomplete { far, .. } => Some(*far),
            Self::LeftRecursion { position, .. }
            | Self::StuckOnRepeat { position }
            | Self::DepthExceeded { position, .. } => Some(*position),
            Self::EditOutOfBounds { lo, .. } => Some(*lo),
            _ => None,
        }
    }

    /// Subject text carried by the error, for rendering context.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Unparsable { subject, .. } | Self::Incomplete { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Whether the error is one of the fatal engine guards rather than an
    /// ordinary syntax error in the subject.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LeftRecursion { .. }
                | Self::StuckOnRepeat { .. }
                | Self::DepthExceeded { .. }
                | Self::UnknownRule { .. }
        )
    }
}

/// Errors raised while building a [`Grammar`](crate::Grammar).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("Grammar syntax error at line {line}, column {column}: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::grammar::syntax)))]
    Syntax {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Rule `{name}` referenced by `{referenced_by}` is not defined{}", suggestion.as_ref().map(|s| format!(" (did you mean `{s}`?)")).unwrap_or_default())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::grammar::undefined_rule)))]
    UndefinedRule {
        name: String,
        referenced_by: String,
        suggestion: Option<String>,
    },

    #[error("Rule `{name}` is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::grammar::duplicate_rule)))]
    DuplicateRule { name: String },

    #[error("Invalid character range '{lo}'..'{hi}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::grammar::invalid_range)))]
    InvalidRange { lo: char, hi: char },

    #[error("Grammar defines no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reparse::grammar::empty)))]
    Empty,
}
