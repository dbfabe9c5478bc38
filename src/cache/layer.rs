//! Remote collection cache: one fetch, then keyed and bulk lookups.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use color_eyre::Result;
use tracing::debug;

use super::error::CacheError;
use super::flight::{LoadOnce, LoadStatus};
use super::index::Index;
use super::partial::{is_partial_match, is_wildcard, PartialKey};
use super::traits::{ExactMatch, IgnoreCase, KeyComparer, LookupKey};

type KeyFn<K, T> = Box<dyn Fn(&T) -> K + Send + Sync>;

/// Cache over a collection that the remote service returns in one piece.
///
/// Loading happens in two lazy stages, each run at most once successfully:
/// the fetcher produces the collection, then the collection is indexed by
/// the key extractor. Both stages are shared by every caller; the data is
/// assumed immutable for the lifetime of the cache, so there is no expiry.
pub struct RemoteCollection<K, T, C = ExactMatch> {
  name: &'static str,
  collection: LoadOnce<Vec<Option<T>>>,
  index: OnceLock<Arc<Index<K, T>>>,
  key_of: KeyFn<K, T>,
  comparer: C,
}

/// Collection keyed by a string ID, compared case-insensitively.
pub type StringKeyed<T> = RemoteCollection<String, T, IgnoreCase>;

impl<K, T, C> RemoteCollection<K, T, C>
where
  K: LookupKey,
  T: Clone + Send + Sync + 'static,
  C: KeyComparer<K>,
{
  /// Create a cache using the comparer's default configuration.
  ///
  /// The fetcher may yield plain items or `Option`s; `None` entries model
  /// gaps in the server payload and are never indexed.
  pub fn new<F, Fut, I, E>(name: &'static str, fetcher: F, key_of: E) -> Self
  where
    C: Default,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<I>> + Send + 'static,
    I: IntoIterator + Send + 'static,
    I::Item: Into<Option<T>>,
    E: Fn(&T) -> K + Send + Sync + 'static,
  {
    Self::with_comparer(name, fetcher, key_of, C::default())
  }

  pub fn with_comparer<F, Fut, I, E>(name: &'static str, fetcher: F, key_of: E, comparer: C) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<I>> + Send + 'static,
    I: IntoIterator + Send + 'static,
    I::Item: Into<Option<T>>,
    E: Fn(&T) -> K + Send + Sync + 'static,
  {
    let collection = LoadOnce::new(name, move || {
      let fetch = fetcher();
      async move {
        let items: Vec<Option<T>> = fetch.await?.into_iter().map(Into::into).collect();
        debug!(resource = name, items = items.len(), "fetched collection");
        Ok(items)
      }
    });

    Self {
      name,
      collection,
      index: OnceLock::new(),
      key_of: Box::new(key_of),
      comparer,
    }
  }

  /// Load state of the underlying collection.
  pub fn status(&self) -> LoadStatus {
    self.collection.status()
  }

  /// The full collection in the order the service returned it.
  pub async fn underlying_collection(&self) -> Result<Arc<Vec<Option<T>>>, CacheError> {
    self.collection.get().await
  }

  async fn index(&self) -> Result<Arc<Index<K, T>>, CacheError> {
    let collection = self.collection.get().await?;
    let index = self.index.get_or_init(|| {
      let index = Index::build(collection, &*self.key_of, &self.comparer);
      debug!(
        resource = self.name,
        items = index.len(),
        keys = index.key_count(),
        "built index"
      );
      Arc::new(index)
    });
    Ok(Arc::clone(index))
  }

  /// Get items by key, or every item when `keys` is `None`.
  ///
  /// With keys, the result lines up with the input: one entry per key, `None`
  /// where the key is unknown. Without keys, the whole collection is returned
  /// in order, including any missing entries.
  pub async fn get_items(&self, keys: Option<&[K]>) -> Result<Vec<Option<T>>, CacheError> {
    let index = self.index().await?;
    let items = match keys {
      None => index.items().to_vec(),
      Some(keys) => keys
        .iter()
        .map(|key| index.get(&self.comparer.canonicalize(key)).cloned())
        .collect(),
    };
    Ok(items)
  }

  /// Get a single item by key; `None` if no item has that key.
  pub async fn get_item(&self, key: &K) -> Result<Option<T>, CacheError> {
    if key.is_unset() {
      return Err(CacheError::InvalidKey(format!(
        "{} lookup requires a key",
        self.name
      )));
    }

    let index = self.index().await?;
    Ok(index.get(&self.comparer.canonicalize(key)).cloned())
  }

  /// All keys present in the index, in order of first appearance.
  pub async fn get_all_keys(&self) -> Result<Vec<K>, CacheError> {
    let index = self.index().await?;
    Ok(index.keys().cloned().collect())
  }
}

impl<K, T, C> RemoteCollection<K, T, C>
where
  K: LookupKey + PartialKey,
  T: Clone + Send + Sync + 'static,
  C: KeyComparer<K>,
{
  /// Get every item whose key partially matches `filter`.
  ///
  /// A filter with no fields set returns the whole collection, exactly like
  /// `get_items(None)`, so missing entries come back as `None` in place.
  /// Otherwise only indexed items are considered: the result holds no
  /// `None`s and follows key order. No match gives an empty result rather
  /// than an error. Keys and filter are compared in canonical form, the
  /// same way `get_item` compares them.
  pub async fn get_matching(&self, filter: &K) -> Result<Vec<Option<T>>, CacheError> {
    if is_wildcard(filter) {
      return self.get_items(None).await;
    }

    let filter = self.comparer.canonicalize(filter);
    let index = self.index().await?;
    let matching: Vec<Option<T>> = index
      .entries()
      .filter(|(key, _)| is_partial_match(&self.comparer.canonicalize(*key), &filter))
      .map(|(_, item)| Some(item.clone()))
      .collect();

    debug!(
      resource = self.name,
      matched = matching.len(),
      "partial key match"
    );
    Ok(matching)
  }
}
