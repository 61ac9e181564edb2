/// How a [`Parsing`](super::Parsing) brings its chart up to date after an edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidationStrategy {
    /// Shift the chart and drop only the entries whose inspected span
    /// reaches into the edited region.
    #[default]
    Incremental,
    /// Throw the whole chart away and start over.
    Rebuild,
}

/// Configuration options for a [`Parsing`](super::Parsing).
///
/// # Example
///
/// ```rust
/// use reparse::parsing::{InvalidationStrategy, ParsingConfig};
///
/// // Use default configuration
/// let config = ParsingConfig::default();
/// assert!(config.memoize);
///
/// // Or customize it
/// let config = ParsingConfig::default()
///     .with_memoize(false)
///     .with_invalidation(InvalidationStrategy::Rebuild)
///     .with_entry_rule("document")
///     .with_max_depth(500);
/// assert_eq!(config.entry_rule, "document");
/// assert_eq!(config.max_depth, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsingConfig {
    /// Store rule results in the chart (packrat parsing).
    ///
    /// When disabled every rule call is evaluated from scratch. Left
    /// recursion is still detected. Results are identical either way, only
    /// the running time differs.
    pub memoize: bool,

    /// What `replace` does to the chart.
    pub invalidation: InvalidationStrategy,

    /// Rule used by [`Parsing::parse_start`](super::Parsing::parse_start).
    pub entry_rule: String,

    /// Maximum number of nested rule evaluations before a parse fails with
    /// [`ParseError::DepthExceeded`](crate::ParseError::DepthExceeded).
    ///
    /// Every nested call costs native stack; the default fits a 2 MiB
    /// thread stack in an unoptimized build. Calls answered from the chart
    /// do not count.
    pub max_depth: usize,
}

/// Default for [`ParsingConfig::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 100;

impl ParsingConfig {
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    #[must_use]
    pub fn with_invalidation(mut self, invalidation: InvalidationStrategy) -> Self {
        self.invalidation = invalidation;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_entry_rule(mut self, rule: impl Into<String>) -> Self {
        self.entry_rule = rule.into();
        self
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            invalidation: InvalidationStrategy::Incremental,
            entry_rule: "start".to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
