//! Cache Entry Module
//!
//! Defines the unit of storage: a key/value pair, its last-touch timestamp and
//! its links inside the retention list.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

/// Owning reference to an entry.
pub(crate) type EntryRef<K, V> = Rc<Entry<K, V>>;
/// Non-owning reference to an entry.
pub(crate) type WeakEntryRef<K, V> = Weak<Entry<K, V>>;

// == Link State ==
/// Neighbours inside the retention list.
///
/// `next` owns the following entry, `prev` only observes the preceding one, so
/// the chain is owned from head to tail with no reference cycles.
pub(crate) struct Link<K, V> {
    prev: Option<WeakEntryRef<K, V>>,
    next: Option<EntryRef<K, V>>,
}

impl<K, V> Default for Link<K, V> {
    fn default() -> Self {
        Self {
            prev: None,
            next: None,
        }
    }
}

// == Cache Entry ==
/// A single key/value pair plus bookkeeping.
pub(crate) struct Entry<K, V> {
    key: K,
    value: RefCell<V>,
    touched_at: Cell<DateTime<Utc>>,
    link: RefCell<Link<K, V>>,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    pub(crate) fn new(key: K, value: V, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value: RefCell::new(value),
            touched_at: Cell::new(now),
            link: RefCell::new(Link::default()),
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> V
    where
        V: Clone,
    {
        self.value.borrow().clone()
    }

    pub(crate) fn with_value<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Updates the value in place so outside holders of this entry see it.
    pub(crate) fn replace_value(&self, value: V) {
        *self.value.borrow_mut() = value;
    }

    // == Timestamps ==
    pub(crate) fn touch(&self, now: DateTime<Utc>) {
        self.touched_at.set(now);
    }

    pub(crate) fn touched_at(&self) -> DateTime<Utc> {
        self.touched_at.get()
    }

    /// True when strictly more than `max_age` has passed since the last touch.
    pub(crate) fn is_stale(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.touched_at.get()) > max_age
    }

    // == Links ==
    pub(crate) fn prev(&self) -> Option<EntryRef<K, V>> {
        self.link.borrow().prev.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn next(&self) -> Option<EntryRef<K, V>> {
        self.link.borrow().next.clone()
    }

    pub(crate) fn set_prev(&self, prev: Option<&EntryRef<K, V>>) {
        self.link.borrow_mut().prev = prev.map(Rc::downgrade);
    }

    /// Replaces the owned successor, handing back the old one.
    pub(crate) fn replace_next(&self, next: Option<EntryRef<K, V>>) -> Option<EntryRef<K, V>> {
        std::mem::replace(&mut self.link.borrow_mut().next, next)
    }

    pub(crate) fn has_neighbor(&self) -> bool {
        let link = self.link.borrow();
        link.prev.is_some() || link.next.is_some()
    }

    /// Clears both links, returning the successor the entry used to own.
    pub(crate) fn detach(&self) -> Option<EntryRef<K, V>> {
        let mut link = self.link.borrow_mut();
        link.prev = None;
        link.next.take()
    }
}

// == Entry Handle ==
/// An owning handle to a cached entry.
///
/// While a handle is alive its entry stays resolvable by key, even after the
/// cache evicts it. A later `get`/`set` on that key re-admits the same entry.
pub struct EntryHandle<K, V> {
    entry: EntryRef<K, V>,
}

impl<K, V> EntryHandle<K, V> {
    pub(crate) fn new(entry: EntryRef<K, V>) -> Self {
        Self { entry }
    }

    pub fn key(&self) -> &K {
        self.entry.key()
    }

    /// Returns a copy of the current value.
    pub fn value(&self) -> V
    where
        V: Clone,
    {
        self.entry.value()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        self.entry.with_value(f)
    }

    /// Time of the last set/get that touched this entry.
    pub fn touched_at(&self) -> DateTime<Utc> {
        self.entry.touched_at()
    }
}

impl<K, V> Clone for EntryHandle<K, V> {
    fn clone(&self) -> Self {
        Self {
            entry: Rc::clone(&self.entry),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryHandle<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryHandle")
            .field("key", self.entry.key())
            .field("value", &*self.entry.value.borrow())
            .field("touched_at", &self.entry.touched_at())
            .finish()
    }
}
