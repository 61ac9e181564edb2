//! # Parsing
//!
//! A [`Parsing`] pairs a subject text with the memo chart of a shared
//! [`Grammar`]. Parse it as often as you like; edit it with
//! [`Parsing::replace`] and the next parse re-evaluates only what the edit
//! could have changed.
//!
//! ```rust
//! use reparse::Grammar;
//!
//! let grammar = Grammar::compile("start = digit+. digit = '0'..'9'.")?;
//! let mut parsing = grammar.parsing("123");
//! assert!(parsing.parse("start")?.is_full());
//!
//! parsing.replace(1, 2, "x")?;
//! assert!(!parsing.parse("start")?.is_full());
//! assert_eq!(parsing.subject(), "1x3");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chart;
mod config;
mod matcher;

pub use chart::{Chart, ChartStats, Column, Entry, Invalidation};
pub use config::{InvalidationStrategy, ParsingConfig, DEFAULT_MAX_DEPTH};
pub use matcher::ParseContext;

use crate::error::ParseError;
use crate::grammar::{Grammar, RuleId};
use crate::ops::MatchResult;
use crate::outcome::ParseOutcome;
use std::fmt;
use std::sync::Arc;

/// A subject text under a grammar, with its memo chart.
#[derive(Clone)]
pub struct Parsing {
    grammar: Arc<Grammar>,
    subject: Vec<char>,
    chart: Chart,
    config: ParsingConfig,
}

impl Parsing {
    #[must_use]
    pub fn new(grammar: Arc<Grammar>, subject: &str) -> Self {
        Self::with_config(grammar, subject, ParsingConfig::default())
    }

    #[must_use]
    pub fn with_config(grammar: Arc<Grammar>, subject: &str, config: ParsingConfig) -> Self {
        let subject: Vec<char> = subject.chars().collect();
        Self {
            grammar,
            chart: Chart::new(subject.len()),
            subject,
            config,
        }
    }

    /// Parse the subject from position 0 with `rule`.
    ///
    /// A failed or partial match is still an `Ok` outcome; see
    /// [`ParseOutcome::assert_full`].
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownRule`], [`ParseError::LeftRecursion`],
    /// [`ParseError::StuckOnRepeat`] or [`ParseError::DepthExceeded`].
    pub fn parse(&mut self, rule: &str) -> Result<ParseOutcome<'_>, ParseError> {
        let id = self.grammar.resolve(rule)?;
        self.parse_rule(id)
    }

    /// Parse with the configured entry rule.
    ///
    /// # Errors
    ///
    /// As for [`Parsing::parse`].
    pub fn parse_start(&mut self) -> Result<ParseOutcome<'_>, ParseError> {
        let id = self.grammar.resolve(&self.config.entry_rule)?;
        self.parse_rule(id)
    }

    /// # Errors
    ///
    /// As for [`Parsing::parse`], minus the name lookup.
    pub fn parse_rule(&mut self, rule: RuleId) -> Result<ParseOutcome<'_>, ParseError> {
        let result = ParseContext::new(&self.grammar, &self.subject, &mut self.chart, &self.config)
            .call(rule, 0)?;

        tracing::debug!(
            rule = self.grammar.rule_name(rule),
            advance = ?result.advance,
            far = result.far,
            len = self.subject.len(),
            "parsed"
        );
        Ok(ParseOutcome::new(self, rule, result))
    }

    /// Replace subject positions `lo..hi` with `text`.
    ///
    /// # Errors
    ///
    /// [`ParseError::EditOutOfBounds`] unless `lo <= hi <= self.len()`.
    pub fn replace(&mut self, lo: usize, hi: usize, text: &str) -> Result<Invalidation, ParseError> {
        let len = self.subject.len();
        if lo > hi || hi > len {
            return Err(ParseError::EditOutOfBounds { lo, hi, len });
        }

        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.subject.splice(lo..hi, inserted);

        let report = match self.config.invalidation {
            InvalidationStrategy::Incremental => self.chart.splice(lo, hi, count),
            InvalidationStrategy::Rebuild => self.chart.reset(self.subject.len()),
        };

        tracing::debug!(
            lo,
            hi,
            inserted = count,
            scanned = report.scanned,
            discarded = report.discarded,
            invalidated = report.invalidated,
            "replaced text"
        );
        Ok(report)
    }

    /// Insert `text` before position `at`.
    ///
    /// # Errors
    ///
    /// [`ParseError::EditOutOfBounds`] if `at > self.len()`.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<Invalidation, ParseError> {
        self.replace(at, at, text)
    }

    /// Delete positions `lo..hi`.
    ///
    /// # Errors
    ///
    /// [`ParseError::EditOutOfBounds`] unless `lo <= hi <= self.len()`.
    pub fn delete(&mut self, lo: usize, hi: usize) -> Result<Invalidation, ParseError> {
        self.replace(lo, hi, "")
    }

    /// Subject text of `lo..hi`, clamped to the subject like a slice of a
    /// shorter string would be.
    #[must_use]
    pub fn text(&self, lo: usize, hi: usize) -> String {
        let hi = hi.min(self.subject.len());
        let lo = lo.min(hi);
        self.subject[lo..hi].iter().collect()
    }

    #[must_use]
    pub fn subject(&self) -> String {
        self.subject.iter().collect()
    }

    /// Subject length in `char`s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subject.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }

    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    #[must_use]
    pub const fn config(&self) -> &ParsingConfig {
        &self.config
    }

    #[must_use]
    pub const fn chart(&self) -> &Chart {
        &self.chart
    }

    #[must_use]
    pub fn stats(&self) -> ChartStats {
        self.chart.stats()
    }

    pub fn reset_stats(&mut self) {
        self.chart.reset_stats();
    }

    /// The finished chart entry for `rule` at `pos`, if there is one.
    #[must_use]
    pub fn memo(&self, pos: usize, rule: &str) -> Option<&MatchResult> {
        let id = self.grammar.rule_id(rule)?;
        self.chart.get(pos, id)?.result()
    }

    #[must_use]
    pub fn far_bound(&self, pos: usize) -> Option<usize> {
        self.chart.far_bound(pos)
    }
}

impl fmt::Debug for Parsing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parsing")
            .field("subject", &self.subject())
            .field("entries", &self.chart.entry_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> Arc<Grammar> {
        Grammar::compile("start = digit+. digit = '0'..'9'.").expect("valid grammar")
    }

    #[test]
    fn test_replace_updates_subject_and_chart() {
        let mut parsing = digits().parsing("1234");
        assert!(parsing.parse("start").unwrap().is_full());
        assert_eq!(parsing.stats().entries, 6);

        let report = parsing.replace(2, 3, "99").unwrap();
        assert_eq!(parsing.subject(), "12994");
        assert_eq!(report.dropped_columns, 1);
        // `start` at 0 looked at the whole subject; the digits at 0 and 1 did not.
        assert_eq!(report.invalidated, 1);
        assert!(parsing.memo(1, "digit").is_some());
        assert!(parsing.memo(0, "start").is_none());

        assert!(parsing.parse("start").unwrap().is_full());
    }

    #[test]
    fn test_edit_out_of_bounds() {
        let mut parsing = digits().parsing("12");
        assert_eq!(
            parsing.replace(1, 3, ""),
            Err(ParseError::EditOutOfBounds { lo: 1, hi: 3, len: 2 })
        );
        assert_eq!(
            parsing.replace(2, 1, ""),
            Err(ParseError::EditOutOfBounds { lo: 2, hi: 1, len: 2 })
        );
        assert!(parsing.insert(2, "3").is_ok());
        assert_eq!(parsing.subject(), "123");
    }

    #[test]
    fn test_text_clamps() {
        let parsing = digits().parsing("abc");
        assert_eq!(parsing.text(1, 99), "bc");
        assert_eq!(parsing.text(5, 9), "");
        assert_eq!(parsing.text(2, 1), "");
    }

    #[test]
    fn test_unknown_rule() {
        let mut parsing = digits().parsing("1");
        assert!(matches!(
            parsing.parse("strt"),
            Err(ParseError::UnknownRule { suggestion: Some(ref s), .. }) if s == "start"
        ));
    }

    #[test]
    fn test_rebuild_strategy_discards_chart() {
        let config = ParsingConfig::default().with_invalidation(InvalidationStrategy::Rebuild);
        let mut parsing = digits().parsing_with_config("12", config);
        parsing.parse_start().unwrap();
        let report = parsing.delete(0, 1).unwrap();
        assert_eq!(report.discarded, 4);
        assert_eq!(parsing.stats().entries, 0);
        assert!(parsing.parse_start().unwrap().is_full());
    }

    #[test]
    fn test_parsing_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Parsing>();
    }
}
