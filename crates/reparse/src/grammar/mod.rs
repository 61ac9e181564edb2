//! # Grammar Definition
//!
//! A [`Grammar`] is an immutable table of compiled rules. Build one from
//! grammar text with [`Grammar::compile`], or programmatically with
//! [`GrammarBuilder`]:
//!
//! ```rust
//! use reparse::grammar::{Expr, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("start", Expr::rule("digit").plus().grab().then_do("int"))
//!     .rule("digit", Expr::range('0', '9'))
//!     .build()
//!     .expect("valid grammar");
//! assert_eq!(grammar.len(), 2);
//! ```
//!
//! Rule names are interned once, at build time; the engine only ever sees
//! small [`RuleId`]s. A grammar is `Send + Sync` and is shared between any
//! number of [`Parsing`](crate::Parsing)s through an [`Arc`].

mod compile;
mod expr;
mod parser;
pub mod validate;

pub use compile::compile_rules;
pub use expr::Expr;
pub use parser::Parser;

use crate::error::diagnostics::did_you_mean;
use crate::error::{GrammarError, ParseError};
use crate::parsing::{Parsing, ParsingConfig};
use crate::semantics::{Semantics, Value};
use lasso::{Key, Rodeo, RodeoReader, Spur};
use std::fmt;
use std::sync::Arc;

/// Interned rule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(Spur);

impl RuleId {
    #[must_use]
    pub const fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[must_use]
    pub const fn as_spur(self) -> Spur {
        self.0
    }

    /// Dense index of the rule, in definition order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0.into_usize()
    }
}

/// A compiled, immutable set of rules.
pub struct Grammar {
    names: RodeoReader<Spur>,
    /// Compiled parsers indexed by [`RuleId::index`].
    rules: Vec<Parser>,
    /// The expressions the rules were built from, same indexing.
    sources: Vec<Expr>,
}

impl Grammar {
    /// Compile grammar text into a shared grammar.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for syntax errors and invalid rule sets.
    pub fn compile(text: &str) -> Result<Arc<Self>, GrammarError> {
        let rules = compile_rules(text)?;
        GrammarBuilder::from_rules(rules).build().map(Arc::new)
    }

    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.names.get(name).map(RuleId)
    }

    #[must_use]
    pub fn rule_name(&self, id: RuleId) -> &str {
        self.names.resolve(&id.0)
    }

    #[must_use]
    pub fn parser(&self, id: RuleId) -> &Parser {
        &self.rules[id.index()]
    }

    #[must_use]
    pub fn expr(&self, id: RuleId) -> &Expr {
        &self.sources[id.index()]
    }

    /// Rule ids in definition order.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.names.iter().map(|(spur, _)| RuleId(spur))
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.strings()
    }

    /// `(name, expression)` pairs in definition order, as accepted by
    /// [`GrammarBuilder::from_rules`].
    #[must_use]
    pub fn rules(&self) -> Vec<(String, Expr)> {
        self.rule_ids()
            .map(|id| (self.rule_name(id).to_owned(), self.expr(id).clone()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve a rule name, suggesting a near miss when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownRule`] if no rule has this name.
    pub fn resolve(&self, name: &str) -> Result<RuleId, ParseError> {
        self.rule_id(name).ok_or_else(|| ParseError::UnknownRule {
            name: name.to_owned(),
            suggestion: did_you_mean(name, self.rule_names()),
        })
    }

    /// Start a parsing of `subject` with the default configuration.
    #[must_use]
    pub fn parsing(self: &Arc<Self>, subject: &str) -> Parsing {
        Parsing::new(Arc::clone(self), subject)
    }

    #[must_use]
    pub fn parsing_with_config(self: &Arc<Self>, subject: &str, config: ParsingConfig) -> Parsing {
        Parsing::with_config(Arc::clone(self), subject, config)
    }

    /// Parse `subject` from `rule` and require the whole subject to match.
    ///
    /// # Errors
    ///
    /// Any error from parsing or from [`ParseOutcome::assert_full`](crate::ParseOutcome::assert_full).
    pub fn accepts(self: &Arc<Self>, subject: &str, rule: &str) -> Result<bool, ParseError> {
        let mut parsing = self.parsing(subject);
        let outcome = parsing.parse(rule)?;
        Ok(outcome.is_full())
    }

    /// One-shot parse and interpretation of a whole subject.
    ///
    /// # Errors
    ///
    /// Any error from parsing or interpreting.
    pub fn interpret(
        self: &Arc<Self>,
        subject: &str,
        rule: &str,
        semantics: &dyn Semantics,
    ) -> Result<Vec<Value>, ParseError> {
        let mut parsing = self.parsing(subject);
        let outcome = parsing.parse(rule)?;
        outcome.interpret(semantics)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Prints the grammar back in grammar-text syntax, one rule per line.
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.rule_ids() {
            writeln!(f, "{} = {}.", self.rule_name(id), self.expr(id))?;
        }
        Ok(())
    }
}

/// Collects rule definitions and produces a validated [`Grammar`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    rules: Vec<(String, Expr)>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rules(rules: Vec<(String, Expr)>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.rules.push((name.into(), expr));
        self
    }

    /// Validate, intern and lower every rule.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] if the rule set is empty, defines a rule
    /// twice, references an undefined rule, or contains an invalid range.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        validate::validate_rules(&self.rules)?;

        let left_recursive = validate::directly_left_recursive(&self.rules);
        if !left_recursive.is_empty() {
            tracing::warn!(
                rules = ?left_recursive,
                "grammar has left-recursive rules; parsing them will fail"
            );
        }

        let mut interner = Rodeo::<Spur>::new();
        for (name, _) in &self.rules {
            interner.get_or_intern(name);
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for (lhs, expr) in &self.rules {
            let parser = Parser::lower(expr, &mut |name| {
                interner
                    .get(name)
                    .map(RuleId)
                    .ok_or_else(|| GrammarError::UndefinedRule {
                        name: name.to_owned(),
                        referenced_by: lhs.clone(),
                        suggestion: None,
                    })
            })?;
            rules.push(parser);
        }

        let sources = self.rules.into_iter().map(|(_, expr)| expr).collect();
        tracing::debug!(rules = rules.len(), "built grammar");
        Ok(Grammar {
            names: interner.into_reader(),
            rules,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> Grammar {
        GrammarBuilder::new()
            .rule("start", Expr::rule("digit").plus())
            .rule("digit", Expr::range('0', '9'))
            .build()
            .expect("valid grammar")
    }

    #[test]
    fn test_rule_ids_follow_definition_order() {
        let grammar = digits();
        let start = grammar.rule_id("start").expect("start");
        let digit = grammar.rule_id("digit").expect("digit");
        assert_eq!(start.index(), 0);
        assert_eq!(digit.index(), 1);
        assert_eq!(grammar.rule_name(digit), "digit");
        assert_eq!(grammar.rule_ids().collect::<Vec<_>>(), [start, digit]);
    }

    #[test]
    fn test_resolve_suggests_near_miss() {
        let grammar = digits();
        assert_eq!(
            grammar.resolve("digits"),
            Err(ParseError::UnknownRule {
                name: "digits".into(),
                suggestion: Some("digit".into()),
            })
        );
    }

    #[test]
    fn test_display_prints_rules() {
        assert_eq!(
            digits().to_string(),
            "start = digit digit*.\ndigit = '0'..'9'.\n"
        );
    }

    #[test]
    fn test_grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
