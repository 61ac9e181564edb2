//! # Memo chart
//!
//! One [`Column`] per subject position, plus one for the end of input. A
//! column maps rule ids to [`Entry`]s and tracks the largest `far` of its
//! finished entries, which lets an edit skip every column that provably
//! never looked at the edited text.
//!
//! Results are stored relative to their column, so an edit only has to
//! move columns around ([`Chart::splice`]); nothing stored in them needs
//! rewriting.

use crate::grammar::RuleId;
use crate::ops::MatchResult;
use ahash::RandomState;
use hashbrown::HashMap;

/// A memo slot for one rule at one position.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// The rule is being evaluated here; meeting this again is left recursion.
    InProgress,
    Done(MatchResult),
}

impl Entry {
    #[must_use]
    pub const fn result(&self) -> Option<&MatchResult> {
        match self {
            Self::Done(result) => Some(result),
            Self::InProgress => None,
        }
    }
}

/// Memo entries for one subject position.
#[derive(Debug, Clone, Default)]
pub struct Column {
    memos: HashMap<RuleId, Entry, RandomState>,
    /// Max `far` over the `Done` entries.
    far_bound: usize,
}

impl Column {
    #[must_use]
    pub fn get(&self, rule: RuleId) -> Option<&Entry> {
        self.memos.get(&rule)
    }

    #[must_use]
    pub const fn far_bound(&self) -> usize {
        self.far_bound
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.memos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }

    /// Drop every entry that inspected text at or past `limit` (relative to
    /// this column). Returns how many were dropped.
    fn truncate_to(&mut self, limit: usize) -> usize {
        let before = self.memos.len();
        self.memos.retain(|_, entry| match entry {
            Entry::Done(result) => result.far <= limit,
            Entry::InProgress => false,
        });
        self.far_bound = self
            .memos
            .values()
            .filter_map(Entry::result)
            .map(|result| result.far)
            .max()
            .unwrap_or(0);
        before - self.memos.len()
    }
}

/// What an edit did to the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Invalidation {
    /// Start of the replaced range.
    pub lo: usize,
    /// End of the replaced range, in positions before the edit.
    pub hi: usize,
    /// Length of the replacement text.
    pub inserted: usize,
    /// Columns before the edit whose entries had to be examined.
    pub scanned: usize,
    /// Columns removed together with the replaced text.
    pub dropped_columns: usize,
    /// Entries that lived in the removed columns.
    pub discarded: usize,
    /// Entries before the edit that had inspected the replaced text.
    pub invalidated: usize,
}

impl Invalidation {
    /// Total entries lost to the edit.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.discarded + self.invalidated
    }
}

/// Statistics about chart usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartStats {
    /// Rule calls answered from the chart
    pub hits: usize,
    /// Rule calls that had to be evaluated
    pub evaluations: usize,
    /// Entries removed by edits
    pub invalidations: usize,
    /// Current number of finished entries
    pub entries: usize,
}

impl ChartStats {
    /// Get the hit ratio
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.evaluations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The packrat memo chart of one parsing.
#[derive(Debug, Clone)]
pub struct Chart {
    columns: Vec<Column>,
    stats: ChartStats,
}

impl Chart {
    /// An empty chart for a subject of `len` characters.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            columns: Self::fresh_columns(len + 1),
            stats: ChartStats::default(),
        }
    }

    fn fresh_columns(count: usize) -> Vec<Column> {
        std::iter::repeat_with(Column::default).take(count).collect()
    }

    /// Number of columns: the subject length plus one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn column(&self, pos: usize) -> Option<&Column> {
        self.columns.get(pos)
    }

    #[must_use]
    pub fn get(&self, pos: usize, rule: RuleId) -> Option<&Entry> {
        self.columns.get(pos)?.get(rule)
    }

    #[must_use]
    pub fn far_bound(&self, pos: usize) -> Option<usize> {
        self.columns.get(pos).map(Column::far_bound)
    }

    /// Mark `rule` as being evaluated at `pos`.
    pub fn begin(&mut self, pos: usize, rule: RuleId) {
        self.stats.evaluations += 1;
        self.columns[pos].memos.insert(rule, Entry::InProgress);
    }

    /// Store a finished result and raise the column's far bound.
    pub fn finish(&mut self, pos: usize, rule: RuleId, result: MatchResult) {
        let column = &mut self.columns[pos];
        column.far_bound = column.far_bound.max(result.far);
        column.memos.insert(rule, Entry::Done(result));
    }

    /// Forget an entry without storing a result.
    pub fn abandon(&mut self, pos: usize, rule: RuleId) {
        if let Some(column) = self.columns.get_mut(pos) {
            column.memos.remove(&rule);
        }
    }

    pub fn record_hit(&mut self) {
        self.stats.hits += 1;
    }

    /// Account for the replacement of subject positions `lo..hi` by
    /// `inserted` new characters.
    ///
    /// Columns inside the replaced range go away, columns after it shift
    /// (their entries are position-independent and stay valid), and columns
    /// before it lose exactly the entries whose `far` reached past `lo`. An
    /// entry ending its inspection exactly at `lo` survives. The column at
    /// `lo` is removed only when `hi > lo`; for a pure insertion it shifts
    /// right with the rest.
    ///
    /// # Panics
    ///
    /// Panics unless `lo <= hi < self.len()`.
    pub fn splice(&mut self, lo: usize, hi: usize, inserted: usize) -> Invalidation {
        assert!(lo <= hi && hi < self.columns.len(), "splice {lo}..{hi} out of range");

        let mut report = Invalidation {
            lo,
            hi,
            inserted,
            dropped_columns: hi - lo,
            ..Invalidation::default()
        };

        report.discarded = self
            .columns
            .splice(lo..hi, Self::fresh_columns(inserted))
            .map(|column| column.len())
            .sum();

        for (pos, column) in self.columns[..lo].iter_mut().enumerate() {
            if pos + column.far_bound > lo {
                report.scanned += 1;
                report.invalidated += column.truncate_to(lo - pos);
            }
        }

        self.stats.invalidations += report.removed();
        report
    }

    /// Discard everything and size the chart for a subject of `len`
    /// characters.
    pub fn reset(&mut self, len: usize) -> Invalidation {
        let discarded = self.entry_count();
        let dropped_columns = self.columns.len();
        self.columns = Self::fresh_columns(len + 1);
        self.stats.invalidations += discarded;
        Invalidation {
            dropped_columns,
            discarded,
            ..Invalidation::default()
        }
    }

    /// Number of finished entries across all columns.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|column| column.memos.values())
            .filter(|entry| matches!(entry, Entry::Done(_)))
            .count()
    }

    #[must_use]
    pub fn stats(&self) -> ChartStats {
        ChartStats {
            entries: self.entry_count(),
            ..self.stats
        }
    }

    pub fn reset_stats(&mut self) {
        self.stats = ChartStats::default();
    }
}
