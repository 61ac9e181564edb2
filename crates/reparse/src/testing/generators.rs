//! # Subject and Edit Generators
//!
//! Random subjects derived from a grammar, and random edit sequences over
//! them, for property tests and fuzzing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reparse::testing::{GeneratorConfig, SubjectGenerator};
//!
//! let generator = SubjectGenerator::new(grammar.clone(), GeneratorConfig::default());
//! let subject = generator.generate("start").expect("rule exists");
//! for edit in generator.mutations(&subject, 10) {
//!     edit.apply(&mut parsing)?;
//! }
//! ```

use crate::error::ParseError;
use crate::grammar::{Expr, Grammar};
use crate::parsing::{Invalidation, Parsing};
use std::sync::Arc;

/// Configuration for grammar-based subject generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum depth of nested rule calls before taking base cases
    pub max_depth: usize,
    /// Maximum number of repetitions for `*` and `+`
    pub max_repetitions: usize,
    /// Probability of taking optional elements (0.0 to 1.0)
    pub optional_probability: f64,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_repetitions: 4,
            optional_probability: 0.5,
            seed: None,
        }
    }
}

/// Generates subjects by walking a grammar's rules.
///
/// PEG choice is ordered and repetition is greedy, so a generated subject is
/// usually, not always, accepted by the rule it was generated from.
#[derive(Debug, Clone)]
pub struct SubjectGenerator {
    grammar: Arc<Grammar>,
    config: GeneratorConfig,
    alphabet: Vec<char>,
}

impl SubjectGenerator {
    #[must_use]
    pub fn new(grammar: Arc<Grammar>, config: GeneratorConfig) -> Self {
        let mut alphabet = Vec::new();
        for id in grammar.rule_ids() {
            collect_chars(grammar.expr(id), &mut alphabet);
        }
        alphabet.sort_unstable();
        alphabet.dedup();
        if alphabet.is_empty() {
            alphabet.push('a');
        }
        Self {
            grammar,
            config,
            alphabet,
        }
    }

    /// Characters the grammar's literals and ranges mention.
    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn rng(&self) -> SimpleRng {
        self.config
            .seed
            .map_or_else(SimpleRng::new, SimpleRng::with_seed)
    }

    /// One subject for `rule`, or `None` if the grammar has no such rule.
    #[must_use]
    pub fn generate(&self, rule: &str) -> Option<String> {
        let mut rng = self.rng();
        self.generate_with(rule, &mut rng)
    }

    /// `count` different subjects for `rule`.
    #[must_use]
    pub fn generate_many(&self, rule: &str, count: usize) -> Vec<String> {
        let mut rng = self.rng();
        (0..count)
            .map_while(|_| self.generate_with(rule, &mut rng))
            .collect()
    }

    fn generate_with(&self, rule: &str, rng: &mut SimpleRng) -> Option<String> {
        let id = self.grammar.rule_id(rule)?;
        let mut out = String::new();
        self.generate_expr(self.grammar.expr(id), 0, &mut out, rng);
        Some(out)
    }

    fn generate_expr(&self, expr: &Expr, depth: usize, out: &mut String, rng: &mut SimpleRng) {
        let shallow = depth < self.config.max_depth;
        match expr {
            Expr::Literal(s) | Expr::Keyword(s) => out.push_str(s),
            Expr::Range(lo, hi) => out.push(rng.char_in(*lo, *hi)),
            Expr::Any => out.push(self.alphabet[rng.below(self.alphabet.len())]),
            Expr::Rule(name) => {
                if let Some(id) = self.grammar.rule_id(name) {
                    self.generate_expr(self.grammar.expr(id), depth + 1, out, rng);
                }
            }
            Expr::Seq(items) => {
                for item in items {
                    self.generate_expr(item, depth, out, rng);
                }
            }
            // `x?` lowers to `x | ()`.
            Expr::Choice(alts) if alts.len() == 2 && alts[1] == Expr::Empty => {
                if shallow && rng.next_f64() < self.config.optional_probability {
                    self.generate_expr(&alts[0], depth, out, rng);
                }
            }
            // Past the depth limit take the last alternative, which in most
            // grammars is the base case.
            Expr::Choice(alts) => {
                let pick = if shallow {
                    alts.get(rng.below(alts.len()))
                } else {
                    alts.last()
                };
                if let Some(alt) = pick {
                    self.generate_expr(alt, depth, out, rng);
                }
            }
            Expr::Repeat(inner) => {
                let reps = if shallow {
                    rng.below(self.config.max_repetitions + 1)
                } else {
                    0
                };
                for _ in 0..reps {
                    self.generate_expr(inner, depth, out, rng);
                }
            }
            Expr::Grab(inner) | Expr::Seclude(inner) => {
                self.generate_expr(inner, depth, out, rng);
            }
            Expr::Empty | Expr::Fail | Expr::Not(_) | Expr::Do(_) | Expr::Push(_) => {}
        }
    }

    /// A sequence of `count` random edits, each valid for the subject left
    /// by the previous ones, starting from `subject`.
    #[must_use]
    pub fn mutations(&self, subject: &str, count: usize) -> Vec<EditMutation> {
        let mut rng = self.rng();
        let mut len = subject.chars().count();
        let mut edits = Vec::with_capacity(count);
        for _ in 0..count {
            let edit = EditMutation::random(&mut rng, len, &self.alphabet);
            len = len - edit.removed() + edit.inserted();
            edits.push(edit);
        }
        edits
    }
}

fn collect_chars(expr: &Expr, out: &mut Vec<char>) {
    match expr {
        Expr::Literal(s) | Expr::Keyword(s) => out.extend(s.chars()),
        Expr::Range(lo, hi) => out.extend([*lo, *hi]),
        Expr::Seq(items) | Expr::Choice(items) => {
            for item in items {
                collect_chars(item, out);
            }
        }
        Expr::Repeat(inner) | Expr::Not(inner) | Expr::Grab(inner) | Expr::Seclude(inner) => {
            collect_chars(inner, out);
        }
        Expr::Empty | Expr::Fail | Expr::Any | Expr::Rule(_) | Expr::Do(_) | Expr::Push(_) => {}
    }
}

/// One text edit, in `char` positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMutation {
    Insert { at: usize, text: String },
    Delete { lo: usize, hi: usize },
    Replace { lo: usize, hi: usize, text: String },
}

impl EditMutation {
    fn random(rng: &mut SimpleRng, len: usize, alphabet: &[char]) -> Self {
        let kind = if len == 0 { 0 } else { rng.below(3) };
        match kind {
            0 => {
                let at = rng.below(len + 1);
                Self::Insert {
                    at,
                    text: random_text(rng, alphabet),
                }
            }
            1 => {
                let lo = rng.below(len);
                let hi = lo + 1 + rng.below((len - lo).min(3));
                Self::Delete { lo, hi }
            }
            _ => {
                let lo = rng.below(len);
                let hi = lo + rng.below((len - lo).min(3) + 1);
                Self::Replace {
                    lo,
                    hi,
                    text: random_text(rng, alphabet),
                }
            }
        }
    }

    /// The `(lo, hi, text)` form taken by [`Parsing::replace`].
    #[must_use]
    pub fn as_replace(&self) -> (usize, usize, &str) {
        match self {
            Self::Insert { at, text } => (*at, *at, text),
            Self::Delete { lo, hi } => (*lo, *hi, ""),
            Self::Replace { lo, hi, text } => (*lo, *hi, text),
        }
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        let (lo, hi, _) = self.as_replace();
        hi - lo
    }

    #[must_use]
    pub fn inserted(&self) -> usize {
        self.as_replace().2.chars().count()
    }

    /// Apply the edit to a parsing.
    ///
    /// # Errors
    ///
    /// [`ParseError::EditOutOfBounds`] if the edit does not fit the subject.
    pub fn apply(&self, parsing: &mut Parsing) -> Result<Invalidation, ParseError> {
        let (lo, hi, text) = self.as_replace();
        parsing.replace(lo, hi, text)
    }

    /// Apply the edit to a plain string, clamping out-of-range positions.
    #[must_use]
    pub fn apply_to_str(&self, subject: &str) -> String {
        let (lo, hi, text) = self.as_replace();
        let chars: Vec<char> = subject.chars().collect();
        let hi = hi.min(chars.len());
        let lo = lo.min(hi);
        chars[..lo]
            .iter()
            .copied()
            .chain(text.chars())
            .chain(chars[hi..].iter().copied())
            .collect()
    }
}

fn random_text(rng: &mut SimpleRng, alphabet: &[char]) -> String {
    let n = 1 + rng.below(3);
    (0..n).map(|_| alphabet[rng.below(alphabet.len())]).collect()
}

/// Simple RNG for deterministic testing
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    const fn new() -> Self {
        Self {
            state: 0x853c_49e6_748f_ea9b,
        }
    }

    const fn with_seed(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        Self {
            state: if seed == 0 { 0x853c_49e6_748f_ea9b } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    #[allow(clippy::cast_precision_loss)]
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Uniform-ish in `0..bound`; 0 when `bound` is 0.
    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            (self.next_u64() % bound as u64) as usize
        }
    }

    fn char_in(&mut self, lo: char, hi: char) -> char {
        let span = u32::from(hi) - u32::from(lo) + 1;
        let offset = u32::try_from(self.below(span as usize)).unwrap_or(0);
        char::from_u32(u32::from(lo) + offset).unwrap_or(lo)
    }
}
