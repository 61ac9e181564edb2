//! # Diagnostic Utilities
//!
//! Helpers for turning engine errors into readable reports:
//! - "Did you mean?" suggestions for misspelled rule names
//! - line/column locations for `char` offsets
//! - a source excerpt with a caret under the reported position

use crate::error::ParseError;
use crate::line_col::LineIndex;

/// Suggest the closest candidate to `actual`, if any is similar enough.
///
/// # Example
///
/// ```rust
/// use reparse::error::diagnostics::did_you_mean;
///
/// let rules = ["exp0", "exp1", "digit"];
/// assert_eq!(did_you_mean("exp", rules).as_deref(), Some("exp0"));
/// ```
pub fn did_you_mean<'a>(actual: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let actual_lower = actual.to_lowercase();
    let mut best: Option<(&str, f64)> = None;
    let threshold = 0.6;

    for candidate in candidates {
        let similarity = string_similarity(&actual_lower, &candidate.to_lowercase());
        if similarity >= threshold && best.map_or(true, |(_, s)| similarity > s) {
            best = Some((candidate, similarity));
        }
    }

    best.map(|(candidate, _)| candidate.to_owned())
}

/// The line containing `offset`, with a caret line pointing at it.
///
/// Returns `(line_number, column, excerpt)` with one-based line and column.
#[must_use]
pub fn render_context(source: &str, offset: usize) -> (usize, usize, String) {
    let index = LineIndex::new(source);
    let pos = index.line_col(offset);
    let line_text: String = source
        .chars()
        .skip(index.line_start(pos.line).unwrap_or(0))
        .take_while(|&c| c != '\n' && c != '\r')
        .collect();

    let mut excerpt = String::new();
    let gutter = (pos.line + 1).to_string();
    excerpt.push_str(&format!("{gutter} | {line_text}\n"));
    excerpt.push_str(&format!(
        "{} | {}^",
        " ".repeat(gutter.len()),
        " ".repeat(pos.column)
    ));
    (pos.line + 1, pos.column + 1, excerpt)
}

/// Format an error with its location and, when the error carries the
/// subject, an excerpt of the offending line.
pub fn format_error(error: &ParseError, source: Option<&str>, filename: Option<&str>) -> String {
    let mut result = String::new();
    let source = error.subject().or(source);

    match (error.position(), source) {
        (Some(offset), Some(source)) => {
            let (line, column, excerpt) = render_context(source, offset);
            if let Some(filename) = filename {
                result.push_str(&format!("{filename}:"));
            }
            result.push_str(&format!("{line}:{column}: {error}\n{excerpt}"));
        }
        _ => result.push_str(&error.to_string()),
    }

    result
}

/// Similarity in `[0, 1]` based on Levenshtein distance.
#[allow(clippy::cast_precision_loss)]
fn string_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    let distance = levenshtein_distance(s1, s2);
    let max_len = s1.chars().count().max(s2.chars().count());
    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s2_chars: Vec<char> = s2.chars().collect();
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1.chars().enumerate() {
        current[0] = i + 1;
        for (j, &c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}
