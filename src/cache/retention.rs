//! Retention List Module
//!
//! Recency-ordered, doubly linked list of the entries the cache itself owns.
//! Enforces the count limit (drop least recently used) and the age limit
//! (lazy expiry).

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::cache::entry::{EntryRef, WeakEntryRef};
use crate::config::CachePolicy;

// == Retention List ==
/// Owning recency list where:
/// - Head = most recently touched
/// - Tail = least recently touched
///
/// The head is owned by the list, every other member by its predecessor's
/// `next` link. `tail` only observes.
pub(crate) struct RetentionList<K, V> {
    head: Option<EntryRef<K, V>>,
    tail: Option<WeakEntryRef<K, V>>,
    /// Number of reachable members
    len: usize,
    max_count: Option<usize>,
    max_age: Option<chrono::Duration>,
}

impl<K, V> RetentionList<K, V> {
    // == Constructor ==
    /// Creates an empty list enforcing `policy`.
    ///
    /// The policy is expected to be validated already; an age that cannot be
    /// expressed as a `chrono::Duration` is treated as unlimited.
    pub(crate) fn new(policy: &CachePolicy) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            max_count: policy.max_count,
            max_age: policy
                .max_age
                .and_then(|age| chrono::Duration::from_std(age).ok()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_time_bounded(&self) -> bool {
        self.max_age.is_some()
    }

    pub(crate) fn head(&self) -> Option<EntryRef<K, V>> {
        self.head.clone()
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<EntryRef<K, V>> {
        self.tail.as_ref().and_then(|t| t.upgrade())
    }

    /// Walks the members from head to tail without touching them.
    pub(crate) fn entries(&self) -> impl Iterator<Item = EntryRef<K, V>> {
        std::iter::successors(self.head.clone(), |entry| entry.next())
    }

    fn is_head(&self, entry: &EntryRef<K, V>) -> bool {
        self.head
            .as_ref()
            .map_or(false, |head| Rc::ptr_eq(head, entry))
    }

    // == Membership ==
    /// True iff `entry` is reachable through the list.
    ///
    /// A lone member has no neighbours, so it is recognised by identity with
    /// the head instead.
    pub(crate) fn is_member(&self, entry: &EntryRef<K, V>) -> bool {
        entry.has_neighbor() || (self.len == 1 && self.is_head(entry))
    }

    // == Push Front ==
    /// Takes ownership of `entry` and places it at the head.
    ///
    /// When the count limit is already reached the tail is evicted first and
    /// handed back so the caller can release it.
    pub(crate) fn push_front(
        &mut self,
        entry: EntryRef<K, V>,
        now: DateTime<Utc>,
    ) -> Option<EntryRef<K, V>> {
        debug_assert!(!self.is_member(&entry));

        let evicted = match self.max_count {
            Some(limit) if self.len >= limit => self.evict_tail(),
            _ => None,
        };

        entry.touch(now);
        self.link_front(entry);
        self.len += 1;
        evicted
    }

    // == Move To Front ==
    /// Marks `entry` as most recently used.
    ///
    /// An entry that is not a member (evicted but still owned elsewhere) is
    /// re-admitted through [`push_front`](Self::push_front).
    pub(crate) fn move_to_front(
        &mut self,
        entry: &EntryRef<K, V>,
        now: DateTime<Utc>,
    ) -> Option<EntryRef<K, V>> {
        if !self.is_member(entry) {
            return self.push_front(Rc::clone(entry), now);
        }

        entry.touch(now);
        if self.is_head(entry) {
            return None;
        }

        let prev = entry.prev();
        let next = entry.detach();
        self.bridge(prev, next);
        self.link_front(Rc::clone(entry));
        None
    }

    // == Evict Tail ==
    /// Removes the least recently used member and returns it.
    ///
    /// The returned reference is the list's former ownership; dropping it
    /// reclaims the entry unless someone outside the cache still holds it.
    pub(crate) fn evict_tail(&mut self) -> Option<EntryRef<K, V>> {
        let tail = self.tail.as_ref()?.upgrade()?;
        let prev = tail.prev();
        tail.detach();
        self.bridge(prev, None);
        self.len -= 1;
        Some(tail)
    }

    // == Unlink ==
    /// Removes an arbitrary member. Returns false if it was not a member.
    pub(crate) fn unlink(&mut self, entry: &EntryRef<K, V>) -> bool {
        if !self.is_member(entry) {
            return false;
        }

        let prev = entry.prev();
        let next = entry.detach();
        self.bridge(prev, next);
        self.len -= 1;
        true
    }

    // == Expire ==
    /// Unlinks `entry` if it is strictly older than the age limit.
    ///
    /// Returns true when the entry is expired, whether or not it was still a
    /// member; the caller is responsible for dropping its key binding.
    pub(crate) fn expire_if_stale(&mut self, entry: &EntryRef<K, V>, now: DateTime<Utc>) -> bool {
        match self.max_age {
            Some(max_age) if entry.is_stale(now, max_age) => {
                self.unlink(entry);
                true
            }
            _ => false,
        }
    }

    // == Clear ==
    /// Drops every member, detaching each so none keeps stale neighbours.
    pub(crate) fn clear(&mut self) {
        let mut cursor = self.head.take();
        self.tail = None;
        self.len = 0;

        // Iterative so long chains do not recurse on drop
        while let Some(entry) = cursor {
            cursor = entry.detach();
        }
    }

    // == Internal Linking ==
    fn link_front(&mut self, entry: EntryRef<K, V>) {
        let old_head = self.head.take();
        match &old_head {
            Some(head) => head.set_prev(Some(&entry)),
            None => self.tail = Some(Rc::downgrade(&entry)),
        }
        entry.set_prev(None);
        entry.replace_next(old_head);
        self.head = Some(entry);
    }

    /// Joins `prev` and `next` around a removed member, releasing the list's
    /// ownership of that member.
    fn bridge(&mut self, prev: Option<EntryRef<K, V>>, next: Option<EntryRef<K, V>>) {
        match &next {
            Some(next) => next.set_prev(prev.as_ref()),
            None => self.tail = prev.as_ref().map(Rc::downgrade),
        }
        match prev {
            Some(prev) => {
                prev.replace_next(next);
            }
            None => self.head = next,
        }
    }
}

impl<K, V> Drop for RetentionList<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}
