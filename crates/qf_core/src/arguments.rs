//! Argument context for a format call.

use std::collections::HashMap;

use crate::value::Value;

/// Positional and named values a template is formatted against.
///
/// A context is never mutated by formatting. Directives that need extra
/// names (`repeat`, `include`) derive a layered copy with [`Arguments::layered`].
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl Arguments {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding only named values.
    pub fn from_named<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut args = Self::new();
        for (key, value) in entries {
            args.insert(key, value);
        }
        args
    }

    /// Append a positional value.
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Bind a named value, replacing any previous binding.
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.named.insert(key.into(), value.into());
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &HashMap<String, Value> {
        &self.named
    }

    pub fn get_positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn get_named(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// Derive a keyword-only context: this context's named values with
    /// `extra` layered on top. Positional values are not carried over.
    pub fn layered<K, V>(&self, extra: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut named = self.named.clone();
        for (key, value) in extra {
            named.insert(key.into(), value.into());
        }
        Self {
            positional: Vec::new(),
            named,
        }
    }
}
