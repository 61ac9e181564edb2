//! Surface grammar expressions
//!
//! [`Expr`] is what grammar authors write (directly, or through the textual
//! grammar compiler). Rules are referenced by name; [`GrammarBuilder`]
//! resolves the names and lowers every expression into the compiled
//! [`Parser`](super::Parser) form.
//!
//! [`GrammarBuilder`]: super::GrammarBuilder

use crate::semantics::Value;
use std::fmt;

/// A parsing expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Always succeeds without consuming input.
    Empty,
    /// Always fails.
    Fail,
    /// Any single character.
    Any,
    /// An exact string.
    Literal(String),
    /// A string that must not be followed by an identifier character.
    Keyword(String),
    /// One character in the inclusive range.
    Range(char, char),
    /// Call another rule by name.
    Rule(String),
    /// Sequence: match all expressions in order.
    Seq(Vec<Expr>),
    /// Ordered choice: the first alternative that matches wins.
    Choice(Vec<Expr>),
    /// Zero or more repetitions.
    Repeat(Box<Expr>),
    /// Negative lookahead.
    Not(Box<Expr>),
    /// Push the matched text as a value.
    Grab(Box<Expr>),
    /// Give the values produced inside a frame of their own.
    Seclude(Box<Expr>),
    /// Apply a named semantic action to the current frame.
    Do(String),
    /// Push a literal value.
    Push(Value),
}

impl Expr {
    #[must_use]
    pub fn lit(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    #[must_use]
    pub fn keyword(s: impl Into<String>) -> Self {
        Self::Keyword(s.into())
    }

    #[must_use]
    pub const fn range(lo: char, hi: char) -> Self {
        Self::Range(lo, hi)
    }

    #[must_use]
    pub fn rule(name: impl Into<String>) -> Self {
        Self::Rule(name.into())
    }

    #[must_use]
    pub const fn seq(items: Vec<Self>) -> Self {
        Self::Seq(items)
    }

    #[must_use]
    pub const fn choice(alternatives: Vec<Self>) -> Self {
        Self::Choice(alternatives)
    }

    #[must_use]
    pub fn star(self) -> Self {
        Self::Repeat(Box::new(self))
    }

    #[must_use]
    pub fn plus(self) -> Self {
        Self::Seq(vec![self.clone(), self.star()])
    }

    #[must_use]
    pub fn maybe(self) -> Self {
        Self::Choice(vec![self, Self::Empty])
    }

    /// One or more, separated by `separator`.
    #[must_use]
    pub fn plus_sep(self, separator: Self) -> Self {
        let tail = Self::Seq(vec![separator, self.clone()]).star();
        Self::Seq(vec![self, tail])
    }

    /// Zero or more, separated by `separator`.
    #[must_use]
    pub fn star_sep(self, separator: Self) -> Self {
        self.plus_sep(separator).maybe()
    }

    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn grab(self) -> Self {
        Self::Grab(Box::new(self))
    }

    #[must_use]
    pub fn seclude(self) -> Self {
        Self::Seclude(Box::new(self))
    }

    /// `self` followed by the action `name`.
    #[must_use]
    pub fn then_do(self, name: impl Into<String>) -> Self {
        Self::Seq(vec![self, Self::Do(name.into())])
    }

    #[must_use]
    pub fn action(name: impl Into<String>) -> Self {
        Self::Do(name.into())
    }

    #[must_use]
    pub fn push(value: impl Into<Value>) -> Self {
        Self::Push(value.into())
    }

    /// Call `f` on every rule name this expression references.
    pub fn for_each_rule<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Rule(name) => f(name),
            Self::Seq(items) | Self::Choice(items) => {
                for item in items {
                    item.for_each_rule(f);
                }
            }
            Self::Repeat(inner) | Self::Not(inner) | Self::Grab(inner) | Self::Seclude(inner) => {
                inner.for_each_rule(f);
            }
            Self::Empty
            | Self::Fail
            | Self::Any
            | Self::Literal(_)
            | Self::Keyword(_)
            | Self::Range(..)
            | Self::Do(_)
            | Self::Push(_) => {}
        }
    }

    const fn precedence(&self) -> u8 {
        match self {
            Self::Choice(items) if items.len() > 1 => 0,
            Self::Seq(items) if items.len() > 1 => 1,
            Self::Not(_) => 2,
            _ => 3,
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            f.write_str("(")?;
            self.fmt_at(f, 0)?;
            return f.write_str(")");
        }
        match self {
            Self::Empty => f.write_str("()"),
            Self::Fail => f.write_str("!()"),
            Self::Any => f.write_str("%any"),
            Self::Literal(s) => write_quoted(f, s, '\''),
            Self::Keyword(s) => write_quoted(f, s, '"'),
            Self::Range(lo, hi) => {
                write_quoted(f, &lo.to_string(), '\'')?;
                f.write_str("..")?;
                write_quoted(f, &hi.to_string(), '\'')
            }
            Self::Rule(name) => f.write_str(name),
            Self::Seq(items) if items.is_empty() => f.write_str("()"),
            Self::Choice(items) if items.is_empty() => f.write_str("!()"),
            Self::Seq(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    item.fmt_at(f, 2)?;
                }
                Ok(())
            }
            Self::Choice(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    item.fmt_at(f, 1)?;
                }
                Ok(())
            }
            Self::Repeat(inner) => {
                inner.fmt_at(f, 3)?;
                f.write_str("*")
            }
            Self::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_at(f, 2)
            }
            Self::Grab(inner) => {
                f.write_str("{")?;
                inner.fmt_at(f, 0)?;
                f.write_str("}")
            }
            Self::Seclude(inner) => {
                f.write_str("[")?;
                inner.fmt_at(f, 0)?;
                f.write_str("]")
            }
            Self::Do(name) => write!(f, ":{name}"),
            Self::Push(Value::Str(s)) => {
                f.write_str(":")?;
                write_quoted(f, s, '\'')
            }
            Self::Push(value) => write!(f, ":<{value}>"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str, quote: char) -> fmt::Result {
    write!(f, "{quote}")?;
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => write!(f, "\\{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

/// Prints the expression in grammar-text syntax.
///
/// Compiling the printed text gives an expression that matches the same
/// subjects, not always the same tree: `Fail` comes back as `!()` and
/// one-item sequences lose their wrapper. Printing the recompiled
/// expression gives the same text again.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}
