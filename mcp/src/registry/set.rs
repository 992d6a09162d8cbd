//! Key-ordered, deduplicated feature storage.
//!
//! Thread-safe: a single `RwLock` guards the ordered map. Mutations hold the
//! write lock for a whole batch, enumerations hold the read lock only while
//! copying out the selected range.

use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    ops::Bound,
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::debug;

use super::iter::FeatureIter;

type KeyFn<T, K> = Box<dyn Fn(&T) -> K + Send + Sync>;

/// A set of features kept unique by an extracted key and ordered by it.
///
/// Adding an entry whose key is already stored replaces that entry. Removing
/// an absent key is a no-op. `key_of` must be pure: the same entry has to
/// produce the same key on every call, otherwise entries are silently
/// overwritten or orphaned.
pub struct FeatureSet<T, K> {
    key_of: KeyFn<T, K>,
    features: RwLock<BTreeMap<K, Arc<T>>>,
}

impl<T, K: Ord> FeatureSet<T, K> {
    /// Create an empty set bound to `key_of` for its whole lifetime.
    pub fn new<F>(key_of: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            key_of: Box::new(key_of),
            features: RwLock::new(BTreeMap::new()),
        }
    }

    /// Extract the key for `entry` using this set's key function.
    pub fn key_of(&self, entry: &T) -> K {
        (self.key_of)(entry)
    }

    /// Insert or replace entries. Within one call, the last entry for a key wins.
    pub fn add<I>(&self, entries: I)
    where
        I: IntoIterator<Item = T>,
    {
        let keyed = self.keyed(entries);
        if keyed.is_empty() {
            return;
        }

        let added = keyed.len();
        let mut features = self.features.write();
        for (key, entry) in keyed {
            features.insert(key, entry);
        }
        debug!(added, total = features.len(), "Added features");
    }

    /// Insert entries only if none of their keys is already stored or repeated
    /// within `entries`.
    ///
    /// On conflict nothing is inserted and the first conflicting key is returned.
    pub fn try_add<I>(&self, entries: I) -> Result<(), K>
    where
        I: IntoIterator<Item = T>,
        K: Clone,
    {
        let keyed = self.keyed(entries);
        if keyed.is_empty() {
            return Ok(());
        }

        let mut features = self.features.write();
        {
            let mut seen = BTreeSet::new();
            for (key, _) in &keyed {
                if features.contains_key(key) || !seen.insert(key) {
                    return Err(key.clone());
                }
            }
        }

        let added = keyed.len();
        features.extend(keyed);
        debug!(added, total = features.len(), "Added features");
        Ok(())
    }

    /// Remove entries by key. Absent keys are ignored.
    ///
    /// Returns whether any entry was actually removed.
    pub fn remove<'a, Q, I>(&self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized + 'a,
        I: IntoIterator<Item = &'a Q>,
    {
        let mut features = self.features.write();
        let before = features.len();
        for key in keys {
            features.remove(key);
        }

        let removed = before - features.len();
        if removed > 0 {
            debug!(removed, total = features.len(), "Removed features");
        }
        removed > 0
    }

    /// Every stored entry, in ascending key order.
    pub fn all(&self) -> FeatureIter<T> {
        self.first_n(usize::MAX)
    }

    /// Every stored entry whose key is strictly greater than `cursor`, in
    /// ascending key order.
    ///
    /// `cursor` does not have to be a stored key.
    pub fn above<Q>(&self, cursor: &Q) -> FeatureIter<T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.above_n(cursor, usize::MAX)
    }

    /// At most `limit` entries from the start, in ascending key order.
    pub(crate) fn first_n(&self, limit: usize) -> FeatureIter<T> {
        self.range_n::<K>(Bound::Unbounded, limit)
    }

    /// At most `limit` entries with keys strictly greater than `cursor`.
    pub(crate) fn above_n<Q>(&self, cursor: &Q, limit: usize) -> FeatureIter<T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.range_n(Bound::Excluded(cursor), limit)
    }

    // Only the first `limit` entries are copied while the read lock is held.
    fn range_n<Q>(&self, lower: Bound<&Q>, limit: usize) -> FeatureIter<T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let features = self.features.read();
        let snapshot = features
            .range::<Q, _>((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, entry)| Arc::clone(entry))
            .collect();
        FeatureIter::new(snapshot)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        T: Clone,
    {
        self.features
            .read()
            .get(key)
            .map(|entry| T::clone(entry))
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.features.read().contains_key(key)
    }

    /// Stored keys in ascending order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.features.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// Remove every entry. Returns whether the set was non-empty.
    pub fn clear(&self) -> bool {
        let mut features = self.features.write();
        let removed = features.len();
        features.clear();
        if removed > 0 {
            debug!(removed, "Cleared features");
        }
        removed > 0
    }

    fn keyed<I>(&self, entries: I) -> Vec<(K, Arc<T>)>
    where
        I: IntoIterator<Item = T>,
    {
        entries
            .into_iter()
            .map(|entry| ((self.key_of)(&entry), Arc::new(entry)))
            .collect()
    }
}

impl<T, K: fmt::Debug> fmt::Debug for FeatureSet<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features = self.features.read();
        f.debug_struct("FeatureSet")
            .field("keys", &features.keys().collect::<Vec<_>>())
            .finish()
    }
}
