//! Error taxonomy for the remote collection caches.

use std::sync::Arc;

use color_eyre::Report;
use thiserror::Error;

/// Errors surfaced by cache operations.
///
/// An unknown key is not an error: lookups report it as `None`.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
  /// The fetcher failed (network, deserialization or server error).
  ///
  /// The report is shared so that every caller waiting on the same load
  /// receives the same failure. Failures are never memoized.
  #[error("failed to load remote collection: {0:#}")]
  Fetch(Arc<Report>),
  /// A singleton lookup was given an unset key.
  #[error("invalid key: {0}")]
  InvalidKey(String),
}

impl CacheError {
  pub(crate) fn fetch(report: Report) -> Self {
    Self::Fetch(Arc::new(report))
  }

  /// The underlying fetch failure, if this is one.
  pub fn fetch_report(&self) -> Option<&Report> {
    match self {
      Self::Fetch(report) => Some(report.as_ref()),
      Self::InvalidKey(_) => None,
    }
  }
}
