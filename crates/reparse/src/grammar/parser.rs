use super::{Expr, RuleId};
use crate::error::GrammarError;
use crate::semantics::Value;
use compact_str::CompactString;

/// A compiled parsing combinator.
///
/// This is the binary, name-resolved form the engine runs: sequences and
/// choices are right-nested [`Parser::Chain`] / [`Parser::Either`] pairs and
/// rule references are [`RuleId`]s. Matching lives in
/// [`crate::parsing`], which owns the memo chart every [`Parser::Call`] goes
/// through.
#[derive(Debug, Clone, PartialEq)]
pub enum Parser {
    Empty,
    Fail,
    Any,
    Literal(Box<[char]>),
    Range(char, char),
    Call(RuleId),
    Chain(Box<Parser>, Box<Parser>),
    Either(Box<Parser>, Box<Parser>),
    Repeat(Box<Parser>),
    Nix(Box<Parser>),
    Grab(Box<Parser>),
    Seclude(Box<Parser>),
    Do(CompactString),
    Push(Value),
}

impl Parser {
    #[must_use]
    pub fn chain(p: Self, q: Self) -> Self {
        Self::Chain(Box::new(p), Box::new(q))
    }

    #[must_use]
    pub fn either(p: Self, q: Self) -> Self {
        Self::Either(Box::new(p), Box::new(q))
    }

    /// Lower a surface expression, resolving rule names with `resolve`.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidRange`] for an empty character range.
    /// Unresolvable names are reported by `resolve` itself.
    pub fn lower(
        expr: &Expr,
        resolve: &mut impl FnMut(&str) -> Result<RuleId, GrammarError>,
    ) -> Result<Self, GrammarError> {
        Ok(match expr {
            Expr::Empty => Self::Empty,
            Expr::Fail => Self::Fail,
            Expr::Any => Self::Any,
            Expr::Literal(s) => Self::Literal(s.chars().collect()),
            Expr::Keyword(s) => Self::chain(
                Self::Literal(s.chars().collect()),
                Self::Nix(Box::new(identifier_char())),
            ),
            Expr::Range(lo, hi) if lo > hi => {
                return Err(GrammarError::InvalidRange { lo: *lo, hi: *hi })
            }
            Expr::Range(lo, hi) => Self::Range(*lo, *hi),
            Expr::Rule(name) => Self::Call(resolve(name)?),
            Expr::Seq(items) => Self::fold_right(items, Self::Empty, Self::chain, resolve)?,
            Expr::Choice(items) => Self::fold_right(items, Self::Fail, Self::either, resolve)?,
            Expr::Repeat(inner) => Self::Repeat(Box::new(Self::lower(inner, resolve)?)),
            Expr::Not(inner) => Self::Nix(Box::new(Self::lower(inner, resolve)?)),
            Expr::Grab(inner) => Self::Grab(Box::new(Self::lower(inner, resolve)?)),
            Expr::Seclude(inner) => Self::Seclude(Box::new(Self::lower(inner, resolve)?)),
            Expr::Do(name) => Self::Do(name.as_str().into()),
            Expr::Push(value) => Self::Push(value.clone()),
        })
    }

    fn fold_right(
        items: &[Expr],
        unit: Self,
        join: fn(Self, Self) -> Self,
        resolve: &mut impl FnMut(&str) -> Result<RuleId, GrammarError>,
    ) -> Result<Self, GrammarError> {
        let mut lowered = items
            .iter()
            .map(|item| Self::lower(item, resolve))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(mut acc) = lowered.pop() else {
            return Ok(unit);
        };
        while let Some(item) = lowered.pop() {
            acc = join(item, acc);
        }
        Ok(acc)
    }

    /// Number of combinator nodes, counting shared subtrees once per use.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Chain(p, q) | Self::Either(p, q) => 1 + p.size() + q.size(),
            Self::Repeat(p) | Self::Nix(p) | Self::Grab(p) | Self::Seclude(p) => 1 + p.size(),
            _ => 1,
        }
    }
}

/// `[A-Za-z0-9_]`, the follow set a keyword must not run into.
fn identifier_char() -> Parser {
    Parser::either(
        Parser::Range('a', 'z'),
        Parser::either(
            Parser::Range('A', 'Z'),
            Parser::either(Parser::Range('0', '9'), Parser::Range('_', '_')),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasso::{Key, Spur};

    fn id(n: usize) -> RuleId {
        RuleId::from_spur(Spur::try_from_usize(n).expect("small key"))
    }

    fn lower(expr: &Expr) -> Result<Parser, GrammarError> {
        Parser::lower(expr, &mut |name| match name {
            "a" => Ok(id(0)),
            other => Err(GrammarError::UndefinedRule {
                name: other.to_owned(),
                referenced_by: "test".into(),
                suggestion: None,
            }),
        })
    }

    #[test]
    fn test_sequences_nest_to_the_right() {
        let parser = lower(&Expr::seq(vec![Expr::lit("x"), Expr::rule("a"), Expr::Any]))
            .expect("lowers");
        assert_eq!(
            parser,
            Parser::chain(
                Parser::Literal(vec!['x'].into()),
                Parser::chain(Parser::Call(id(0)), Parser::Any)
            )
        );
    }

    #[test]
    fn test_empty_sequence_and_choice_lower_to_units() {
        assert_eq!(lower(&Expr::seq(vec![])), Ok(Parser::Empty));
        assert_eq!(lower(&Expr::choice(vec![])), Ok(Parser::Fail));
        assert_eq!(lower(&Expr::choice(vec![Expr::Any])), Ok(Parser::Any));
    }

    #[test]
    fn test_keyword_adds_negative_lookahead() {
        let parser = lower(&Expr::keyword("if")).expect("lowers");
        assert!(matches!(parser, Parser::Chain(_, ref tail) if matches!(**tail, Parser::Nix(_))));
    }

    #[test]
    fn test_lowering_reports_errors() {
        assert_eq!(
            lower(&Expr::range('z', 'a')),
            Err(GrammarError::InvalidRange { lo: 'z', hi: 'a' })
        );
        assert!(matches!(
            lower(&Expr::rule("b").star()),
            Err(GrammarError::UndefinedRule { .. })
        ));
    }
}
