//! Weak Store Module
//!
//! Key lookup table whose bindings never keep an entry alive on their own.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::cache::entry::{EntryRef, WeakEntryRef};

/// Binding count below which registration never sweeps.
const PRUNE_FLOOR: usize = 32;

// == Weak Store ==
/// Maps keys to non-owning entry references.
///
/// A binding resolves only while something else (the retention list or an
/// outside [`EntryHandle`](crate::cache::EntryHandle)) still owns the entry.
///
/// Dead bindings are swept once the table doubles past its size after the
/// previous sweep, so the table stays proportional to the live entries.
pub(crate) struct WeakStore<K, V> {
    bindings: HashMap<K, WeakEntryRef<K, V>>,
    /// Table size that triggers the next sweep on registration
    prune_at: usize,
}

impl<K, V> WeakStore<K, V>
where
    K: Hash + Eq,
{
    pub(crate) fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }

    /// Binds `key` to `entry`, replacing any previous binding.
    pub(crate) fn register(&mut self, key: K, entry: &EntryRef<K, V>) {
        self.bindings.insert(key, Rc::downgrade(entry));
        if self.bindings.len() >= self.prune_at {
            self.prune();
        }
    }

    /// Returns the entry if some owner still holds it.
    ///
    /// A binding whose entry is gone is dropped on the way out.
    pub(crate) fn resolve<Q>(&mut self, key: &Q) -> Option<EntryRef<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let upgraded = self.bindings.get(key)?.upgrade();
        if upgraded.is_none() {
            self.bindings.remove(key);
        }
        upgraded
    }

    /// Drops the binding for `key`, if any.
    pub(crate) fn forget<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bindings.remove(key);
    }

    /// Removes every binding whose entry has been reclaimed.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, entry| entry.strong_count() > 0);
        self.prune_at = (self.bindings.len() * 2).max(PRUNE_FLOOR);
        before - self.bindings.len()
    }

    pub(crate) fn drop_all(&mut self) {
        self.bindings.clear();
        self.prune_at = PRUNE_FLOOR;
    }

    /// Number of bindings, dead ones included.
    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Number of bindings that still resolve.
    pub(crate) fn count_live(&self) -> usize {
        self.bindings
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}
