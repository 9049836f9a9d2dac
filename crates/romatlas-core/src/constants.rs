//! Named-constant table.
//!
//! Enumerator values arrive as expression strings. At registration time a
//! value that is exactly the name of an already-recorded constant is
//! replaced by that constant's recorded value; anything more complex is
//! kept verbatim and resolved identifier-by-identifier when a count
//! expression is evaluated. The two stages are deliberately separate.

use indexmap::IndexMap;

/// Ordered table of enumerator name to value-expression string.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    values: IndexMap<String, String>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a constant, applying whole-value substitution.
    ///
    /// If `value` is exactly a previously recorded name, the recorded
    /// string replaces it; only one level of substitution happens here.
    /// Re-recording a name overwrites it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = match self.values.get(&value) {
            Some(resolved) => resolved.clone(),
            None => value,
        };
        self.values.insert(name.into(), value);
    }

    /// The recorded value string for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
