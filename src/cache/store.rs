//! Cache Store Module
//!
//! The fading cache facade: a weak key lookup combined with an owning
//! retention list that enforces the count and age limits.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::{Entry, EntryHandle, EntryRef};
use crate::cache::retention::RetentionList;
use crate::cache::stats::CacheStats;
use crate::cache::weak_store::WeakStore;
use crate::config::CachePolicy;
use crate::error::{CacheError, Result};

// == Fading Cache ==
/// A key-value cache that forgets by count and/or age, but keeps entries
/// rediscoverable for as long as something outside the cache still holds them.
///
/// Every lookup goes through a weak key table first. A hit is then checked
/// against the retention list: stale entries expire lazily, live members are
/// promoted to most recently used, and entries that were evicted but are
/// still held through an [`EntryHandle`] are re-admitted.
///
/// The cache is single-threaded. It holds `Rc` handles and is neither `Send`
/// nor `Sync`; share it across threads only behind your own exclusion
/// boundary, one cache per thread.
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<fading_cache::FadingCache<u32, u32>>();
/// ```
///
/// # Example
/// ```
/// use fading_cache::{CacheBuilder, FadingCache};
///
/// let mut cache: FadingCache<u32, u32> = CacheBuilder::new().max_count(3).build().unwrap();
/// for i in 0..10u32 {
///     cache.set(i, i * i);
/// }
/// assert_eq!(cache.len(), 3);
/// assert!(!cache.contains(&6));
/// assert_eq!(cache.get(&9).unwrap(), 81);
/// ```
pub struct FadingCache<K, V, C = SystemClock> {
    /// Key lookup that never keeps entries alive
    store: WeakStore<K, V>,
    /// Owning recency list
    retention: RetentionList<K, V>,
    policy: CachePolicy,
    clock: C,
    stats: CacheStats,
}

impl<K, V> FadingCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    // == Constructors ==
    /// Creates a cache on the wall clock, rejecting invalid policies.
    pub fn new(policy: CachePolicy) -> Result<Self> {
        Self::with_clock(policy, SystemClock)
    }

    /// Creates a cache that retains everything.
    pub fn unbounded() -> Self {
        Self::from_parts(CachePolicy::unbounded(), SystemClock)
    }
}

impl<K, V, C> FadingCache<K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    C: Clock,
{
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(policy: CachePolicy, clock: C) -> Result<Self> {
        policy.validate()?;
        debug!(
            "Fading cache created: max_count={:?}, max_age={:?}",
            policy.max_count, policy.max_age
        );
        Ok(Self::from_parts(policy, clock))
    }

    /// Assembles a cache from an already validated policy.
    pub(crate) fn from_parts(policy: CachePolicy, clock: C) -> Self {
        Self {
            store: WeakStore::new(),
            retention: RetentionList::new(&policy),
            policy,
            clock,
            stats: CacheStats::new(),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // == Set ==
    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// An existing entry is updated in place, so outside holders of that
    /// entry observe the new value. Inserting past the count limit evicts the
    /// least recently used member, never the entry being written.
    pub fn set(&mut self, key: K, value: V) {
        let now = self.clock.now();

        let evicted = match self.store.resolve(&key) {
            Some(entry) => {
                entry.replace_value(value);
                if !self.retention.is_member(&entry) {
                    self.stats.record_resurrection();
                    debug!("Re-admitting held entry {:?} on set", key);
                }
                self.retention.move_to_front(&entry, now)
            }
            None => {
                let entry = Rc::new(Entry::new(key.clone(), value, now));
                self.store.register(key, &entry);
                self.retention.push_front(entry, now)
            }
        };

        self.release(evicted);
    }

    // == Get ==
    /// Returns a copy of the value stored under `key` and promotes it.
    pub fn get<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        V: Clone,
    {
        self.handle(key).map(|handle| handle.value())
    }

    // == Handle ==
    /// Looks `key` up like [`get`](Self::get) but returns an owning handle.
    ///
    /// Keeping the handle keeps the entry resolvable after the cache evicts
    /// it; the next lookup re-admits it as a fresh insertion.
    pub fn handle<Q>(&mut self, key: &Q) -> Result<EntryHandle<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let Some(entry) = self.resolve_fresh(key) else {
            self.stats.record_miss();
            trace!("Cache miss for {:?}", key);
            return Err(CacheError::not_found(key));
        };

        if !self.retention.is_member(&entry) {
            self.stats.record_resurrection();
            debug!("Re-admitting held entry {:?} on lookup", key);
        }
        let now = self.clock.now();
        let evicted = self.retention.move_to_front(&entry, now);
        self.release(evicted);

        self.stats.record_hit();
        trace!("Cache hit for {:?}", key);
        Ok(EntryHandle::new(entry))
    }

    // == Contains ==
    /// Peeks at `key` without changing recency.
    ///
    /// Expiry still applies. An evicted entry that is only held outside the
    /// cache is not counted as contained until a lookup re-admits it.
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.resolve_fresh(key)
            .map_or(false, |entry| self.retention.is_member(&entry))
    }

    // == Delete ==
    /// Removes `key` from the cache.
    ///
    /// Deleting the last member leaves the cache as it was when built.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let entry = self
            .resolve_fresh(key)
            .ok_or_else(|| CacheError::not_found(key))?;

        self.retention.unlink(&entry);
        self.store.forget(key);
        Ok(())
    }

    // == Length ==
    /// Number of retained entries.
    ///
    /// With an age limit this first sweeps the whole list, since expiry is
    /// only ever discovered lazily.
    pub fn len(&mut self) -> usize {
        if self.retention.is_time_bounded() {
            self.purge_expired();
        }
        self.retention.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    // == Purge Expired ==
    /// Expires every stale member. Returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let mut cursor = self.retention.head();
        let mut expired = 0;

        while let Some(entry) = cursor {
            cursor = entry.next();
            if self.expire_entry(&entry) {
                expired += 1;
            }
        }

        expired
    }

    // == Iteration ==
    /// Keys from most to least recently used, expiring stale members on the way.
    pub fn keys(&mut self) -> Keys<'_, K, V, C> {
        let cursor = self.retention.head();
        Keys {
            cache: self,
            cursor,
        }
    }

    /// Key/value pairs in recency order, leaving the order untouched.
    ///
    /// Expiry still applies to each visited member.
    pub fn items_no_promote(&mut self) -> ItemsNoPromote<'_, K, V, C> {
        let cursor = self.retention.head();
        ItemsNoPromote {
            cache: self,
            cursor,
        }
    }

    /// Key/value pairs fetched through [`get`](Self::get).
    ///
    /// Keys are collected first, then each is looked up. Every yielded entry is
    /// therefore promoted: after a full pass the recency order is reversed.
    /// Use [`items_no_promote`](Self::items_no_promote) to observe without
    /// reordering.
    pub fn items(&mut self) -> Items<'_, K, V, C> {
        let keys: Vec<K> = self.keys().collect();
        Items {
            cache: self,
            keys: keys.into_iter(),
        }
    }

    // == Snapshot & Equality ==
    /// Collects the live pairs into a `HashMap` without reordering.
    pub fn to_map(&mut self) -> HashMap<K, V>
    where
        V: Clone,
    {
        self.items_no_promote().collect()
    }

    /// Compares live pairs with any other mapping, ignoring order and recency.
    pub fn equals<M>(&mut self, other: &mut M) -> bool
    where
        M: AsMapping<K, V> + ?Sized,
        V: Clone + PartialEq,
    {
        self.to_map() == other.to_map()
    }

    // == Clear ==
    /// Empties the retention list.
    ///
    /// Key bindings stay, so an entry still held outside the cache can be
    /// re-admitted by a later lookup.
    pub fn clear(&mut self) {
        debug!("Clearing {} retained entries", self.retention.len());
        self.retention.clear();
        self.store.prune();
    }

    /// Empties the retention list and drops every key binding, so nothing can
    /// be re-admitted.
    pub fn clear_weak(&mut self) {
        self.retention.clear();
        self.store.drop_all();
    }

    // == Copy & Merge ==
    /// Builds an independent cache with the same policy and clock holding the
    /// same live pairs in the same recency order.
    ///
    /// Only logical contents are copied: every entry starts a fresh age.
    pub fn copy(&mut self) -> Self
    where
        V: Clone,
        C: Clone,
    {
        let mut copy = Self::from_parts(self.policy, self.clock.clone());
        copy.merge(self);
        copy
    }

    /// Writes every live pair of `other` into this cache, preserving the
    /// relative recency of `other` and leaving its order untouched.
    pub fn merge<C2>(&mut self, other: &mut FadingCache<K, V, C2>)
    where
        V: Clone,
        C2: Clock,
    {
        let pairs: Vec<(K, V)> = other.items_no_promote().collect();
        for (key, value) in pairs.into_iter().rev() {
            self.set(key, value);
        }
    }

    // == Diagnostics ==
    /// Number of key bindings that still resolve to a live entry.
    pub fn weak_len(&self) -> usize {
        self.store.count_live()
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.retention.len();
        stats
    }

    // == Internal Helpers ==
    /// Resolves `key` and applies lazy expiry to what it finds.
    fn resolve_fresh<Q>(&mut self, key: &Q) -> Option<EntryRef<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.store.resolve(key)?;
        if self.expire_entry(&entry) {
            return None;
        }
        Some(entry)
    }

    /// Unlinks `entry` and drops its binding if it is past the age limit.
    fn expire_entry(&mut self, entry: &EntryRef<K, V>) -> bool {
        let now = self.clock.now();
        if !self.retention.expire_if_stale(entry, now) {
            return false;
        }

        self.store.forget(entry.key());
        self.stats.record_expiration();
        debug!("Expired {:?}", entry.key());
        true
    }

    /// Advances `cursor` to the next member that survives expiry.
    fn next_live(&mut self, cursor: &mut Option<EntryRef<K, V>>) -> Option<EntryRef<K, V>> {
        while let Some(entry) = cursor.take() {
            *cursor = entry.next();
            if !self.expire_entry(&entry) && self.retention.is_member(&entry) {
                return Some(entry);
            }
        }
        None
    }

    /// Accounts for an entry pushed out by the count limit.
    fn release(&mut self, evicted: Option<EntryRef<K, V>>) {
        let Some(entry) = evicted else {
            return;
        };

        self.stats.record_eviction();
        if Rc::strong_count(&entry) == 1 {
            // Last owner: the binding would dangle once `entry` drops
            self.store.forget(entry.key());
            debug!("Evicted least recently used {:?}", entry.key());
        } else {
            debug!("Evicted {:?}, still held outside the cache", entry.key());
        }
    }
}

impl<K, V> Default for FadingCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K, V, C> Extend<(K, V)> for FadingCache<K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    C: Clock,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FadingCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut cache = Self::unbounded();
        cache.extend(iter);
        cache
    }
}

/// Renders the current members as a map. Expiry is not applied here.
impl<K, V, C> fmt::Debug for FadingCache<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in self.retention.entries() {
            entry.with_value(|value| {
                map.entry(entry.key(), value);
            });
        }
        map.finish()
    }
}

// == Iterators ==
/// Iterator returned by [`FadingCache::keys`].
pub struct Keys<'a, K, V, C> {
    cache: &'a mut FadingCache<K, V, C>,
    cursor: Option<EntryRef<K, V>>,
}

impl<K, V, C> Iterator for Keys<'_, K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    C: Clock,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.cache
            .next_live(&mut self.cursor)
            .map(|entry| entry.key().clone())
    }
}

/// Iterator returned by [`FadingCache::items_no_promote`].
pub struct ItemsNoPromote<'a, K, V, C> {
    cache: &'a mut FadingCache<K, V, C>,
    cursor: Option<EntryRef<K, V>>,
}

impl<K, V, C> Iterator for ItemsNoPromote<'_, K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
    C: Clock,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.cache
            .next_live(&mut self.cursor)
            .map(|entry| (entry.key().clone(), entry.value()))
    }
}

/// Iterator returned by [`FadingCache::items`].
pub struct Items<'a, K, V, C> {
    cache: &'a mut FadingCache<K, V, C>,
    keys: std::vec::IntoIter<K>,
}

impl<K, V, C> Iterator for Items<'_, K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
    C: Clock,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        loop {
            let key = self.keys.next()?;
            if let Ok(value) = self.cache.get(&key) {
                return Some((key, value));
            }
        }
    }
}

// == Mapping Comparison ==
/// Anything that can be flattened into a key/value map for comparison.
pub trait AsMapping<K, V> {
    fn to_map(&mut self) -> HashMap<K, V>;
}

impl<K, V, S> AsMapping<K, V> for HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn to_map(&mut self) -> HashMap<K, V> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> AsMapping<K, V> for BTreeMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    fn to_map(&mut self) -> HashMap<K, V> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V, C> AsMapping<K, V> for FadingCache<K, V, C>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
    C: Clock,
{
    fn to_map(&mut self) -> HashMap<K, V> {
        FadingCache::to_map(self)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBuilder, ManualClock};
    use std::time::Duration;

    fn limited(max_count: usize) -> FadingCache<u32, u32> {
        CacheBuilder::new().max_count(max_count).build().unwrap()
    }

    fn aging(secs: u64) -> (FadingCache<String, u32, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cache = CacheBuilder::new()
            .max_age_secs(secs)
            .clock(clock.clone())
            .build()
            .unwrap();
        (cache, clock)
    }

    #[test]
    fn test_cache_new() {
        let mut cache: FadingCache<u32, u32> = FadingCache::unbounded();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.weak_len(), 0);
    }

    #[test]
    fn test_invalid_policy_fails_fast() {
        let result: Result<FadingCache<u32, u32>> =
            FadingCache::new(CachePolicy::unbounded().with_max_count(0));
        assert!(matches!(result, Err(CacheError::InvalidPolicy(_))));
    }

    #[test]
    fn test_set_and_get() {
        let mut cache = FadingCache::unbounded();
        cache.set("One".to_string(), 1);
        cache.set("Two".to_string(), 2);

        assert_eq!(cache.get("One").unwrap(), 1);
        assert_eq!(cache.get("Two").unwrap(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_missing_key() {
        let mut cache: FadingCache<u32, u32> = FadingCache::unbounded();
        let result = cache.get(&42);
        assert_eq!(result, Err(CacheError::NotFound("42".to_string())));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_updates_in_place() {
        let mut cache = FadingCache::unbounded();
        cache.set(1u32, "old".to_string());
        let handle = cache.handle(&1).unwrap();

        cache.set(1, "new".to_string());

        assert_eq!(handle.value(), "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_count_limit_drops_least_recent() {
        let mut cache = limited(3);
        cache.set(1, 1);
        cache.set(2, 2);
        cache.set(3, 3);

        // 1 becomes most recent, so 2 is the next to go
        cache.get(&1).unwrap();
        cache.set(4, 4);

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![4, 1, 3]);
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.weak_len(), 3);
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = limited(2);
        cache.set(1, 1);
        cache.set(2, 2);

        assert!(cache.contains(&1));
        cache.set(3, 3);

        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn test_delete() {
        let mut cache = limited(3);
        cache.set(1, 1);
        cache.set(2, 2);

        cache.delete(&1).unwrap();
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.delete(&1), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_delete_sole_member_resets() {
        let mut cache = limited(3);
        cache.set(7, 49);
        cache.delete(&7).unwrap();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.keys().count(), 0);
        assert_eq!(cache.weak_len(), 0);

        cache.set(8, 64);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![8]);
    }

    #[test]
    fn test_resurrection_through_handle() {
        let mut cache = limited(2);
        cache.set(1, 10);
        let held = cache.handle(&1).unwrap();

        cache.set(2, 20);
        cache.set(3, 30);

        // Evicted from the list, but still resolvable
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.weak_len(), 3);

        assert_eq!(cache.get(&1).unwrap(), 10);
        assert!(cache.contains(&1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().resurrections, 1);
        assert_eq!(held.value(), 10);
    }

    #[test]
    fn test_resurrection_on_set_keeps_entry_identity() {
        let mut cache = limited(1);
        cache.set(1, 10);
        let held = cache.handle(&1).unwrap();
        cache.set(2, 20);

        cache.set(1, 11);

        assert_eq!(held.value(), 11);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_unheld_evicted_entries_are_reclaimed() {
        let mut cache = limited(3);
        for i in 0..50 {
            cache.set(i, i);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.weak_len(), 3);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.weak_len(), 0);
    }

    #[test]
    fn test_clear_allows_held_resurrection_clear_weak_does_not() {
        let mut cache = limited(3);
        cache.set(1, 1);
        let held = cache.handle(&1).unwrap();

        cache.clear();
        assert!(!cache.contains(&1));
        assert_eq!(cache.get(&1).unwrap(), 1);

        cache.clear_weak();
        assert!(cache.get(&1).is_err());
        assert_eq!(cache.len(), 0);
        assert_eq!(held.value(), 1);
    }

    #[test]
    fn test_age_limit_expires_lazily() {
        let (mut cache, clock) = aging(2);
        cache.set("a".to_string(), 1);

        clock.advance_secs(2);
        assert!(cache.contains("a"));

        clock.advance(Duration::from_millis(1));
        assert!(!cache.contains("a"));
        assert!(cache.get("a").is_err());
        assert_eq!(cache.weak_len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_get_refreshes_age() {
        let (mut cache, clock) = aging(2);
        cache.set("a".to_string(), 1);

        clock.advance_secs(2);
        assert_eq!(cache.get("a").unwrap(), 1);
        clock.advance_secs(2);

        assert!(cache.contains("a"));
    }

    #[test]
    fn test_len_sweeps_expired() {
        let (mut cache, clock) = aging(5);
        cache.set("old".to_string(), 1);
        clock.advance_secs(4);
        cache.set("new".to_string(), 2);
        clock.advance_secs(2);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["new".to_string()]);
    }

    #[test]
    fn test_purge_expired_counts() {
        let (mut cache, clock) = aging(1);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        clock.advance_secs(2);
        cache.set("c".to_string(), 3);

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_items_no_promote_keeps_order() {
        let mut cache = limited(5);
        for i in 1..=3 {
            cache.set(i, i * 10);
        }

        let pairs: Vec<_> = cache.items_no_promote().collect();
        assert_eq!(pairs, vec![(3, 30), (2, 20), (1, 10)]);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_items_promotes_each_key() {
        let mut cache = limited(5);
        for i in 1..=3 {
            cache.set(i, i * 10);
        }

        let pairs: Vec<_> = cache.items().collect();
        assert_eq!(pairs, vec![(3, 30), (2, 20), (1, 10)]);
        // Each get moved its key to the head, reversing the order
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_keys_is_restartable() {
        let mut cache = limited(5);
        cache.set(1, 1);
        cache.set(2, 2);

        assert_eq!(cache.keys().count(), 2);
        assert_eq!(cache.keys().count(), 2);
    }

    #[test]
    fn test_equals_plain_maps() {
        let mut cache = limited(5);
        let mut expected = HashMap::new();
        for i in 0..4 {
            cache.set(i, i * i);
            expected.insert(i, i * i);
        }
        assert!(cache.equals(&mut expected));

        expected.remove(&0);
        assert!(!cache.equals(&mut expected));

        let mut ordered: BTreeMap<u32, u32> = (0..4).map(|i| (i, i * i)).collect();
        assert!(cache.equals(&mut ordered));
    }

    #[test]
    fn test_equals_ignores_recency() {
        let mut a = limited(5);
        let mut b = limited(5);
        a.set(1, 1);
        a.set(2, 2);
        b.set(2, 2);
        b.set(1, 1);

        assert!(a.equals(&mut b));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut cache = limited(3);
        cache.set(1, 1);
        cache.set(2, 2);
        cache.set(3, 3);

        let mut copy = cache.copy();
        assert!(copy.equals(&mut cache));
        assert_eq!(copy.keys().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(copy.policy(), cache.policy());

        copy.set(4, 4);
        cache.delete(&3).unwrap();
        assert!(cache.contains(&1));
        assert!(!copy.contains(&1));
        assert!(copy.contains(&3));
    }

    #[test]
    fn test_merge_and_extend() {
        let mut source = limited(5);
        source.set(1, 1);
        source.set(2, 2);

        let mut target: FadingCache<u32, u32> = FadingCache::unbounded();
        target.extend(vec![(9, 81)]);
        target.merge(&mut source);

        assert_eq!(target.keys().collect::<Vec<_>>(), vec![2, 1, 9]);
        assert_eq!(source.keys().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_from_iterator_and_debug() {
        let mut cache: FadingCache<&str, u32> = vec![("a", 1)].into_iter().collect();
        assert_eq!(cache.len(), 1);
        assert_eq!(format!("{:?}", cache), "{\"a\": 1}");
    }

    #[test]
    fn test_key_table_stays_bounded_after_handles_drop() {
        let mut cache = limited(2);
        for i in 0..10_000u32 {
            cache.set(i * 3, i);
            let held = cache.handle(&(i * 3)).unwrap();
            cache.set(i * 3 + 1, i);
            cache.set(i * 3 + 2, i);
            drop(held);
        }

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.weak_len(), 2);
        assert!(cache.store.len() <= 64);
    }
}
