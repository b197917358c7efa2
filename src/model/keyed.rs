//! Ordered sequences with a lazily built, collision-free key index.
//!
//! ODIS snapshots regularly contain siblings that project to the same name
//! (gateways repeat the same `ti_name` several times, for instance). A
//! [`KeyedSequence`] keeps the items in document order and derives a
//! `key -> item` lookup on first use, retrying the projection with an
//! increasing disambiguation index until the key is unused. Keys come out as
//! `name`, `name_2`, `name_3`, ... in encounter order.
//!
//! # Example
//!
//! ```
//! use odis_compare::model::{disambiguate, KeyedSequence};
//!
//! let seq = KeyedSequence::with_projection(
//!     vec!["SFT0004B", "SFT0004B", "SFT0010"],
//!     |item: &&str, index| disambiguate(item, index),
//! );
//! let keys: Vec<&str> = seq.keys().collect();
//! assert_eq!(keys, ["SFT0004B", "SFT0004B_2", "SFT0010"]);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Projection from an item and a 1-based disambiguation index to a key.
pub type KeyProjection<T> = fn(&T, usize) -> String;

/// Types with a canonical key projection.
///
/// Sequences built with [`KeyedSequence::new`] (including deserialized ones)
/// use this projection.
pub trait Keyed {
    /// Project this item to a key; `index` starts at 1 and grows on collision.
    fn project_key(&self, index: usize) -> String;
}

/// Apply the standard `name`, `name_2`, `name_3`, ... suffix discipline.
#[must_use]
pub fn disambiguate(base: &str, index: usize) -> String {
    if index > 1 {
        format!("{base}_{index}")
    } else {
        base.to_string()
    }
}

/// Build a collision-free `key -> position` index over `items`.
///
/// Pure function of the items and the projection; calling it twice on the
/// same input yields identical keys in identical order. The map always has
/// exactly `items.len()` entries.
pub fn build_keyed_index<T>(items: &[T], projection: KeyProjection<T>) -> IndexMap<String, usize> {
    let mut index: IndexMap<String, usize> = IndexMap::with_capacity(items.len());
    let retry_limit = items.len() + 1;

    for (position, item) in items.iter().enumerate() {
        let mut attempt = 1;
        let key = loop {
            // A projection that ignores the index would never converge; past
            // the limit the suffix is applied here instead.
            let candidate = if attempt <= retry_limit {
                projection(item, attempt)
            } else {
                format!("{}_{attempt}", projection(item, 1))
            };
            if !index.contains_key(&candidate) {
                break candidate;
            }
            attempt += 1;
        };
        index.insert(key, position);
    }

    index
}

/// An ordered sequence plus a memoized, disambiguated key index.
///
/// The index is built once on first read. Mutation through [`push`] drops
/// the cached index so the next read rebuilds it from the sequence.
///
/// [`push`]: KeyedSequence::push
pub struct KeyedSequence<T> {
    items: Vec<T>,
    projection: KeyProjection<T>,
    index: OnceLock<IndexMap<String, usize>>,
}

impl<T: Keyed> KeyedSequence<T> {
    /// Create a sequence keyed by the item type's canonical projection.
    pub fn new(items: Vec<T>) -> Self {
        Self::with_projection(items, T::project_key)
    }
}

impl<T> KeyedSequence<T> {
    /// Create a sequence keyed by a custom projection.
    pub fn with_projection(items: Vec<T>, projection: KeyProjection<T>) -> Self {
        Self {
            items,
            projection,
            index: OnceLock::new(),
        }
    }

    /// Items in their original order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Iterate items in their original order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item, invalidating the cached key index.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.index.take();
    }

    /// Check whether the key index has been built.
    pub fn is_indexed(&self) -> bool {
        self.index.get().is_some()
    }

    fn keyed_index(&self) -> &IndexMap<String, usize> {
        self.index
            .get_or_init(|| build_keyed_index(&self.items, self.projection))
    }

    /// Disambiguated keys in index order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keyed_index().keys().map(String::as_str)
    }

    /// `(key, item)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &T)> {
        self.keyed_index()
            .iter()
            .map(|(key, &position)| (key.as_str(), &self.items[position]))
    }

    /// Look up an item by its disambiguated key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.keyed_index()
            .get(key)
            .map(|&position| &self.items[position])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keyed_index().contains_key(key)
    }

    /// Entries satisfying `predicate`, with keys optionally rewritten.
    ///
    /// When two rewritten keys coincide the first entry is kept.
    pub fn filter_by_predicate<P>(
        &self,
        predicate: P,
        key_transform: Option<fn(&str) -> String>,
    ) -> IndexMap<String, T>
    where
        P: Fn(&str, &T) -> bool,
        T: Clone,
    {
        let mut filtered = IndexMap::new();
        for (key, item) in self.entries().filter(|(key, item)| predicate(*key, *item)) {
            let key = key_transform.map_or_else(|| key.to_string(), |transform| transform(key));
            filtered.entry(key).or_insert_with(|| item.clone());
        }
        filtered
    }

    /// Entries whose key is absent from `other`, keyed for presentation.
    pub fn missing_from<U>(
        &self,
        other: &KeyedSequence<U>,
        key_transform: Option<fn(&str) -> String>,
    ) -> IndexMap<String, T>
    where
        T: Clone,
    {
        self.filter_by_predicate(|key, _| !other.contains_key(key), key_transform)
    }

    /// Keys present in both sequences, in this sequence's index order.
    pub fn common_keys<'a, U>(&'a self, other: &'a KeyedSequence<U>) -> Vec<&'a str> {
        self.keys().filter(|key| other.contains_key(key)).collect()
    }
}

impl<T: Keyed> Default for KeyedSequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Keyed> FromIterator<T> for KeyedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a KeyedSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Clone> Clone for KeyedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            projection: self.projection,
            index: self.index.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for KeyedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for KeyedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

// Serialized as the plain item list; keys are re-derived on load.
impl<T: Serialize> Serialize for KeyedSequence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Keyed> Deserialize<'de> for KeyedSequence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::new)
    }
}
