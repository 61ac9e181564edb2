//! Line and column positions
//!
//! Converts the engine's `char` offsets into zero-based line/column pairs for
//! error reporting.

/// A zero-based line and column, both counted in `char`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Line start table for repeated offset lookups.
///
/// Recognises `\n`, `\r\n` and lone `\r` line endings.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `char` offsets of line starts; always begins with 0.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = text.chars().peekable();
        let mut offset = 0;
        while let Some(ch) = chars.next() {
            offset += 1;
            match ch {
                '\n' => line_starts.push(offset),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        offset += 1;
                    }
                    line_starts.push(offset);
                }
                _ => {}
            }
        }
        Self {
            line_starts,
            len: offset,
        }
    }

    /// Position of a `char` offset; offsets past the end clamp to the end.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        LineCol {
            line,
            column: offset - self.line_starts[line],
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// `char` offset of the start of `line`.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}
