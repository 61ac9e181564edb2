//! # Match results and semantic op streams
//!
//! Every combinator produces a [`MatchResult`]: how far it advanced (if it
//! matched), how far it looked, and the ordered [`Op`]s that later rebuild
//! semantic values.
//!
//! Op streams are concatenated at every `Chain` and copied out of the memo
//! chart at every rule call, so [`OpStream`] is a persistent tree of shared
//! nodes: cloning and appending are O(1), flattening happens once, when an
//! outcome is interpreted.

use crate::semantics::Value;
use compact_str::CompactString;
use std::fmt;
use std::sync::Arc;

/// One step of the semantic replay performed by
/// [`ParseOutcome::interpret`](crate::ParseOutcome::interpret).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    /// Open a fresh value frame.
    Open,
    /// Close the current frame, appending its values to the parent.
    Close,
    /// Replace the current frame's values with the named action's result.
    Do(CompactString),
    /// Push a literal value.
    Lit(Value),
    /// Push text captured from the subject.
    Grab(Arc<str>),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("["),
            Self::Close => f.write_str("]"),
            Self::Do(name) => write!(f, ":{name}"),
            Self::Lit(value) => write!(f, "lit {value}"),
            Self::Grab(text) => write!(f, "grab {}", Value::from(&**text)),
        }
    }
}

#[derive(Debug)]
enum OpNode {
    Leaf(Op),
    Concat(OpStream, OpStream),
}

// Long repetitions build deep left-leaning trees; unlink them iteratively so
// dropping a big stream cannot overflow the stack.
impl Drop for OpNode {
    fn drop(&mut self) {
        let Self::Concat(left, right) = self else {
            return;
        };
        let mut pending = vec![left.root.take(), right.root.take()];
        while let Some(node) = pending.pop() {
            let Some(node) = node else { continue };
            if let Ok(mut node) = Arc::try_unwrap(node) {
                if let Self::Concat(left, right) = &mut node {
                    pending.push(left.root.take());
                    pending.push(right.root.take());
                }
            }
        }
    }
}

/// An immutable, shareable sequence of [`Op`]s.
#[derive(Debug, Clone, Default)]
pub struct OpStream {
    root: Option<Arc<OpNode>>,
    len: usize,
}

impl OpStream {
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[must_use]
    pub fn single(op: Op) -> Self {
        Self {
            root: Some(Arc::new(OpNode::Leaf(op))),
            len: 1,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `self ++ other`, sharing both sides.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Self {
            root: Some(Arc::new(OpNode::Concat(self.clone(), other.clone()))),
            len: self.len + other.len,
        }
    }

    /// `self ++ [op]`.
    #[must_use]
    pub fn push(&self, op: Op) -> Self {
        self.concat(&Self::single(op))
    }

    /// `[Open] ++ self ++ [Close]`.
    #[must_use]
    pub fn bracketed(&self) -> Self {
        Self::single(Op::Open).concat(self).push(Op::Close)
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        let mut stack = Vec::new();
        if let Some(root) = &self.root {
            stack.push(&**root);
        }
        Iter { stack }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Op> {
        self.iter().cloned().collect()
    }
}

impl PartialEq for OpStream {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl FromIterator<Op> for OpStream {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |stream, op| stream.push(op))
    }
}

impl<'a> IntoIterator for &'a OpStream {
    type Item = &'a Op;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal of an [`OpStream`] without recursion.
pub struct Iter<'a> {
    stack: Vec<&'a OpNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Op;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                OpNode::Leaf(op) => return Some(op),
                OpNode::Concat(left, right) => {
                    if let Some(node) = &right.root {
                        self.stack.push(node);
                    }
                    if let Some(node) = &left.root {
                        self.stack.push(node);
                    }
                }
            }
        }
    }
}

impl fmt::Display for OpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, op) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        f.write_str(")")
    }
}

/// The result of matching one combinator at one position.
///
/// `far` is measured from the starting position and bounds every character
/// the match inspected, on success and failure alike. It is what the chart
/// uses to decide which entries an edit invalidates.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Characters consumed, `None` on failure.
    pub advance: Option<usize>,
    /// One past the furthest offset (relative to the start) that was examined.
    pub far: usize,
    pub ops: OpStream,
}

impl MatchResult {
    #[must_use]
    pub fn success(advance: usize, far: usize, ops: OpStream) -> Self {
        Self {
            advance: Some(advance),
            far,
            ops,
        }
    }

    #[must_use]
    pub const fn failure(far: usize) -> Self {
        Self {
            advance: None,
            far,
            ops: OpStream::new(),
        }
    }

    /// Zero-width success carrying a single op.
    #[must_use]
    pub fn emit(op: Op) -> Self {
        Self::success(0, 0, OpStream::single(op))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.advance.is_some()
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.advance {
            Some(advance) => write!(f, "<{advance},{},{}>", self.far, self.ops),
            None => write!(f, "<None,{},()>", self.far),
        }
    }
}
