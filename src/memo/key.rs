//! Call Key Module
//!
//! Derives a cache key from a call's positional and keyword arguments.

use std::collections::BTreeMap;

/// Cache key for a call with positional and named arguments.
///
/// Positional arguments keep their order; named arguments are kept sorted by
/// name so the order they were supplied in does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallKey<P> {
    positional: Vec<P>,
    keyword: BTreeMap<String, P>,
}

impl<P> CallKey<P> {
    pub fn new() -> Self {
        Self {
            positional: Vec::new(),
            keyword: BTreeMap::new(),
        }
    }

    /// Starts a key from positional arguments.
    pub fn positional<I: IntoIterator<Item = P>>(args: I) -> Self {
        Self {
            positional: args.into_iter().collect(),
            keyword: BTreeMap::new(),
        }
    }

    /// Appends one positional argument.
    pub fn arg(mut self, value: P) -> Self {
        self.positional.push(value);
        self
    }

    /// Adds a named argument, replacing an earlier one with the same name.
    pub fn keyword(mut self, name: impl Into<String>, value: P) -> Self {
        self.keyword.insert(name.into(), value);
        self
    }

    pub fn positional_args(&self) -> &[P] {
        &self.positional
    }

    pub fn keyword_args(&self) -> &BTreeMap<String, P> {
        &self.keyword
    }
}

impl<P> Default for CallKey<P> {
    fn default() -> Self {
        Self::new()
    }
}
