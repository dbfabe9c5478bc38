//! Load-once caches over collections fetched from a remote service.
//!
//! This module is independent of the JobServe API. It provides:
//! - [`LoadOnce`]: single-flight, retry-on-failure memoization of one async load
//! - [`RemoteCollection`]: a collection fetched once, indexed once, then served
//!   by key, in bulk, or by partial composite-key match
//! - Key policies ([`ExactMatch`], [`IgnoreCase`]) and the [`PartialKey`] predicate

mod error;
mod flight;
mod index;
mod layer;
pub mod partial;
mod traits;

pub use error::CacheError;
pub use flight::{LoadOnce, LoadStatus};
pub use index::Index;
pub use layer::{RemoteCollection, StringKeyed};
pub use partial::PartialKey;
pub use traits::{ExactMatch, IgnoreCase, KeyComparer, LookupKey};
