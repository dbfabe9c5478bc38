//! Core traits for keys held by a remote collection cache.

use std::hash::Hash;

/// A key that items of a remote collection can be looked up by.
pub trait LookupKey: Clone + Eq + Hash + Send + Sync + 'static {
  /// Whether this is the zero value of the key, which is never a valid lookup.
  fn is_unset(&self) -> bool;
}

impl LookupKey for String {
  fn is_unset(&self) -> bool {
    self.trim().is_empty()
  }
}

/// Equality policy for keys.
///
/// Two keys are considered equal when their canonical forms are equal. The
/// canonical form must be deterministic, since the index is built from it.
pub trait KeyComparer<K>: Send + Sync + 'static {
  fn canonicalize(&self, key: &K) -> K;
}

/// Field-wise exact equality (the key's own `Eq`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl<K: Clone> KeyComparer<K> for ExactMatch {
  fn canonicalize(&self, key: &K) -> K {
    key.clone()
  }
}

/// Case-insensitive equality for string keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

impl KeyComparer<String> for IgnoreCase {
  fn canonicalize(&self, key: &String) -> String {
    key.to_lowercase()
  }
}
