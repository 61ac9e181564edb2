//! # Semantics
//!
//! A parse only records *which* actions to run; a [`Semantics`] decides what
//! those action names mean. The same outcome can be interpreted as a number
//! by arithmetic semantics or as a tuple tree by [`AstSemantics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reparse::semantics::{base_semantics, operator_semantics, ComboSemantics};
//!
//! let calc = ComboSemantics::new()
//!     .with(operator_semantics())
//!     .with(base_semantics());
//! let values = outcome.interpret(&calc)?;
//! ```

mod builtins;
mod value;

pub use builtins::{base_semantics, operator_semantics};
pub use value::Value;

use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a semantic action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named semantic action: consumes the values of the current frame and
/// produces the single value that replaces them.
pub type Action = Arc<dyn Fn(Vec<Value>) -> Result<Value, ActionError> + Send + Sync>;

/// A mapping from action names to actions.
pub trait Semantics {
    fn action(&self, name: &str) -> Option<Action>;
}

impl<S: Semantics + ?Sized> Semantics for &S {
    fn action(&self, name: &str) -> Option<Action> {
        (**self).action(name)
    }
}

impl<S: Semantics + ?Sized> Semantics for Arc<S> {
    fn action(&self, name: &str) -> Option<Action> {
        (**self).action(name)
    }
}

/// Semantics backed by an explicit table of actions.
#[derive(Clone, Default)]
pub struct DictSemantics {
    actions: HashMap<String, Action, RandomState>,
}

impl DictSemantics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, replacing any previous one with the same name.
    #[must_use]
    pub fn with<F>(mut self, name: &str, action: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.insert(name, action);
        self
    }

    pub fn insert<F>(&mut self, name: &str, action: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.actions.insert(name.to_owned(), Arc::new(action));
    }

    /// Copy every action of `other` into this table; `other` wins on clashes.
    pub fn extend(&mut self, other: &Self) {
        self.actions
            .extend(other.actions.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl Semantics for DictSemantics {
    fn action(&self, name: &str) -> Option<Action> {
        self.actions.get(name).cloned()
    }
}

impl fmt::Debug for DictSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("DictSemantics")
            .field("actions", &names)
            .finish()
    }
}

/// Builds a syntax tree: every action `name` yields the tuple `(name, args...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstSemantics;

impl Semantics for AstSemantics {
    fn action(&self, name: &str) -> Option<Action> {
        let tag = name.to_owned();
        Some(Arc::new(move |args| Ok(Value::tagged(&tag, args))))
    }
}

/// Chains several semantics; the first one that knows a name wins.
#[derive(Clone, Default)]
pub struct ComboSemantics {
    layers: Vec<Arc<dyn Semantics + Send + Sync>>,
}

impl ComboSemantics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with lower precedence than every layer added before it.
    #[must_use]
    pub fn with<S>(mut self, semantics: S) -> Self
    where
        S: Semantics + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(semantics));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Semantics for ComboSemantics {
    fn action(&self, name: &str) -> Option<Action> {
        self.layers.iter().find_map(|layer| layer.action(name))
    }
}

impl fmt::Debug for ComboSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboSemantics")
            .field("layers", &self.layers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> impl Fn(Vec<Value>) -> Result<Value, ActionError> {
        move |_| Ok(Value::Int(value))
    }

    #[test]
    fn test_dict_semantics_lookup() {
        let sem = DictSemantics::new().with("one", constant(1));
        assert!(sem.contains("one"));
        assert!(sem.action("two").is_none());
        let action = sem.action("one").expect("registered");
        assert_eq!(action(vec![]), Ok(Value::Int(1)));
    }

    #[test]
    fn test_ast_semantics_tags_arguments() {
        let action = AstSemantics.action("int").expect("ast knows every name");
        let value = action(vec![Value::from("2")]).expect("infallible");
        assert_eq!(value.to_string(), "('int', '2')");
    }

    #[test]
    fn test_combo_first_match_wins() {
        let combo = ComboSemantics::new()
            .with(DictSemantics::new().with("x", constant(1)))
            .with(DictSemantics::new().with("x", constant(2)).with("y", constant(3)));
        assert_eq!(combo.action("x").expect("x")(vec![]), Ok(Value::Int(1)));
        assert_eq!(combo.action("y").expect("y")(vec![]), Ok(Value::Int(3)));
        assert!(combo.action("z").is_none());
    }

    #[test]
    fn test_combo_falls_back_to_ast() {
        let combo = ComboSemantics::new()
            .with(DictSemantics::new().with("x", constant(1)))
            .with(AstSemantics);
        let value = combo.action("pair").expect("ast fallback")(vec![Value::Int(1)]);
        assert_eq!(value, Ok(Value::tagged("pair", [Value::Int(1)])));
    }
}
