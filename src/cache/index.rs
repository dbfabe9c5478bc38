//! Keyed index over a loaded collection.

use std::sync::Arc;

use indexmap::IndexMap;

use super::traits::{KeyComparer, LookupKey};

/// Where an indexed item lives in the collection.
#[derive(Debug, Clone)]
struct Slot<K> {
  /// The key as produced by the key extractor
  key: K,
  position: usize,
}

/// Immutable index built once from a loaded collection.
///
/// Holds the ordered collection (which is also the positional view) and a
/// map from canonical key to item. Missing items are skipped while
/// indexing but stay in the collection. When two items share a key the
/// later one wins, while the key keeps the position of its first appearance.
#[derive(Debug)]
pub struct Index<K, T> {
  items: Arc<Vec<Option<T>>>,
  lookup: IndexMap<K, Slot<K>>,
}

impl<K: LookupKey, T> Index<K, T> {
  pub fn build<C: KeyComparer<K>>(
    items: Arc<Vec<Option<T>>>,
    key_of: &(dyn Fn(&T) -> K + Send + Sync),
    comparer: &C,
  ) -> Self {
    let mut lookup = IndexMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
      let Some(item) = item else {
        continue;
      };
      let key = key_of(item);
      lookup.insert(comparer.canonicalize(&key), Slot { key, position });
    }

    Self { items, lookup }
  }

  /// The collection in its original order, missing items included.
  pub fn items(&self) -> &[Option<T>] {
    &self.items
  }

  /// Look up an item by an already canonicalized key.
  pub fn get(&self, canonical: &K) -> Option<&T> {
    self
      .lookup
      .get(canonical)
      .and_then(|slot| self.items[slot.position].as_ref())
  }

  /// Indexed keys in order of first appearance.
  pub fn keys(&self) -> impl Iterator<Item = &K> {
    self.lookup.values().map(|slot| &slot.key)
  }

  /// Indexed keys paired with the item each resolves to.
  pub fn entries(&self) -> impl Iterator<Item = (&K, &T)> {
    self.lookup.values().filter_map(|slot| {
      self.items[slot.position]
        .as_ref()
        .map(|item| (&slot.key, item))
    })
  }

  /// Number of items in the collection, missing ones included.
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Number of distinct keys.
  pub fn key_count(&self) -> usize {
    self.lookup.len()
  }
}
