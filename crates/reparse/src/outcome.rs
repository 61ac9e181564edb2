//! # Parse outcomes
//!
//! A [`ParseOutcome`] is a read-only view of one top-level rule match. It
//! borrows the [`Parsing`] it came from, so the subject cannot change while
//! the outcome is alive.

use crate::error::ParseError;
use crate::grammar::RuleId;
use crate::ops::{MatchResult, Op, OpStream};
use crate::parsing::Parsing;
use crate::semantics::{Semantics, Value};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// The result of [`Parsing::parse`].
#[derive(Debug, Clone)]
pub struct ParseOutcome<'p> {
    parsing: &'p Parsing,
    rule: RuleId,
    result: MatchResult,
}

impl<'p> ParseOutcome<'p> {
    pub(crate) const fn new(parsing: &'p Parsing, rule: RuleId, result: MatchResult) -> Self {
        Self {
            parsing,
            rule,
            result,
        }
    }

    /// The rule matched the entire subject.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.result.advance == Some(self.parsing.len())
    }

    /// The rule matched some prefix of the subject, possibly all of it.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Length of the matched prefix.
    #[must_use]
    pub const fn prefix(&self) -> Option<usize> {
        self.result.advance
    }

    /// One past the furthest position examined.
    #[must_use]
    pub const fn inspected(&self) -> usize {
        self.result.far
    }

    #[must_use]
    pub const fn rule(&self) -> RuleId {
        self.rule
    }

    #[must_use]
    pub fn rule_name(&self) -> &'p str {
        self.parsing.grammar().rule_name(self.rule)
    }

    #[must_use]
    pub const fn ops(&self) -> &OpStream {
        &self.result.ops
    }

    #[must_use]
    pub const fn result(&self) -> &MatchResult {
        &self.result
    }

    #[must_use]
    pub const fn parsing(&self) -> &'p Parsing {
        self.parsing
    }

    /// Require a match of the whole subject.
    ///
    /// # Errors
    ///
    /// [`ParseError::Unparsable`] if nothing matched, or
    /// [`ParseError::Incomplete`] if only a strict prefix did.
    pub fn assert_full(&self) -> Result<(), ParseError> {
        match self.result.advance {
            None => Err(ParseError::Unparsable {
                far: self.result.far,
                subject: self.parsing.subject(),
            }),
            Some(advance) if advance < self.parsing.len() => Err(ParseError::Incomplete {
                advance,
                far: self.result.far,
                subject: self.parsing.subject(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Replay the ops of a full match through `semantics`.
    ///
    /// # Errors
    ///
    /// Anything [`assert_full`](Self::assert_full) reports, plus the
    /// errors of [`replay`].
    pub fn interpret(&self, semantics: &dyn Semantics) -> Result<Vec<Value>, ParseError> {
        self.assert_full()?;
        replay(&self.result.ops, semantics)
    }

    /// Like [`interpret`](Self::interpret), but a successful match of a
    /// strict prefix is enough.
    ///
    /// # Errors
    ///
    /// [`ParseError::Unparsable`] if nothing matched, plus the errors of
    /// [`replay`].
    pub fn interpret_prefix(&self, semantics: &dyn Semantics) -> Result<Vec<Value>, ParseError> {
        if !self.is_success() {
            return Err(ParseError::Unparsable {
                far: self.result.far,
                subject: self.parsing.subject(),
            });
        }
        replay(&self.result.ops, semantics)
    }
}

impl fmt::Display for ParseOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rule_name(), self.result)
    }
}

/// Run an op stream against `semantics` and return the values left in the
/// outermost frame.
///
/// # Errors
///
/// [`ParseError::UnknownAction`] for an action `semantics` does not define,
/// [`ParseError::ActionFailed`] when an action returns an error, and
/// [`ParseError::UnbalancedScope`] if `Open`/`Close` do not pair up.
pub fn replay(ops: &OpStream, semantics: &dyn Semantics) -> Result<Vec<Value>, ParseError> {
    let mut frames: SmallVec<[Vec<Value>; 8]> = smallvec![Vec::new()];

    for op in ops {
        match op {
            Op::Open => frames.push(Vec::new()),
            Op::Close => {
                if frames.len() < 2 {
                    return Err(ParseError::UnbalancedScope);
                }
                let inner = frames.pop().unwrap_or_default();
                top(&mut frames)?.extend(inner);
            }
            Op::Do(name) => {
                let action = semantics
                    .action(name)
                    .ok_or_else(|| ParseError::UnknownAction {
                        name: name.to_string(),
                    })?;
                let frame = top(&mut frames)?;
                let value = action(std::mem::take(frame)).map_err(|source| {
                    ParseError::ActionFailed {
                        name: name.to_string(),
                        source,
                    }
                })?;
                frame.push(value);
            }
            Op::Lit(value) => top(&mut frames)?.push(value.clone()),
            Op::Grab(text) => top(&mut frames)?.push(Value::Str(text.to_string())),
        }
    }

    if frames.len() != 1 {
        return Err(ParseError::UnbalancedScope);
    }
    Ok(frames.pop().unwrap_or_default())
}

fn top(frames: &mut [Vec<Value>]) -> Result<&mut Vec<Value>, ParseError> {
    frames.last_mut().ok_or(ParseError::UnbalancedScope)
}
