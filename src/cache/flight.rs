//! Load-once memoization of an async computation with single-flight joining.
//!
//! A [`LoadOnce<V>`] runs its loader lazily on first access. Concurrent
//! callers that arrive while the loader is outstanding join the same
//! in-flight future instead of starting another one. A successful value is
//! kept for the lifetime of the `LoadOnce`; a failure is handed to every
//! waiter of that flight and then forgotten, so the next access retries.
//!
//! # Example
//!
//! ```ignore
//! let api = client.clone();
//! let defaults = LoadOnce::new("search defaults", move || {
//!     let api = api.clone();
//!     async move { api.search_defaults().await }
//! });
//!
//! // Both calls share one network round trip.
//! let (a, b) = tokio::join!(defaults.get(), defaults.get());
//! ```

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::error::CacheError;

/// A load shared by every caller that joined it.
///
/// Results are wrapped so they are cheap to clone out of the `Shared`.
type Flight<V> = Shared<BoxFuture<'static, Result<Arc<V>, CacheError>>>;

/// A factory function that creates the loading future
type LoaderFn<V> = Box<dyn Fn() -> BoxFuture<'static, Result<V>> + Send + Sync>;

enum LoadState<V> {
  /// Nothing has been requested yet
  Idle,
  /// A load is outstanding; `id` identifies this particular flight
  InFlight { id: u64, flight: Flight<V> },
  /// Loaded successfully, kept forever
  Loaded(Arc<V>),
  /// The last flight failed; the next access starts a new one
  Failed(CacheError),
}

/// Snapshot of a [`LoadOnce`] for diagnostics.
#[derive(Debug, Clone)]
pub enum LoadStatus {
  Idle,
  Loading,
  Loaded,
  Failed(CacheError),
}

impl LoadStatus {
  pub fn is_loaded(&self) -> bool {
    matches!(self, LoadStatus::Loaded)
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, LoadStatus::Loading)
  }
}

struct Inner<V> {
  state: LoadState<V>,
  /// Number of flights started so far
  flights: u64,
}

/// Lazily loaded value with at most one load in flight at any time.
pub struct LoadOnce<V> {
  name: &'static str,
  loader: LoaderFn<V>,
  inner: Mutex<Inner<V>>,
}

impl<V: Send + Sync + 'static> LoadOnce<V> {
  /// Create a new `LoadOnce` with the given loader.
  ///
  /// The loader is a closure that returns a future. It is called once per
  /// flight: exactly once if the first load succeeds, again after a failure.
  /// `name` identifies the resource in logs.
  pub fn new<F, Fut>(name: &'static str, loader: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
  {
    Self {
      name,
      loader: Box::new(move || Box::pin(loader())),
      inner: Mutex::new(Inner {
        state: LoadState::Idle,
        flights: 0,
      }),
    }
  }

  /// Get the value, loading it first if necessary.
  ///
  /// Dropping the returned future only abandons this caller's wait; the
  /// flight itself stays alive and is driven by whoever awaits it next.
  pub async fn get(&self) -> Result<Arc<V>, CacheError> {
    let (id, flight) = {
      let mut inner = self.inner.lock();
      match &inner.state {
        LoadState::Loaded(value) => return Ok(Arc::clone(value)),
        LoadState::InFlight { id, flight } => {
          trace!(resource = self.name, flight = id, "joining in-flight load");
          (*id, flight.clone())
        }
        LoadState::Idle | LoadState::Failed(_) => {
          inner.flights += 1;
          let id = inner.flights;
          debug!(resource = self.name, flight = id, "starting load");

          // A panic settles the flight as an ordinary failure
          let flight = AssertUnwindSafe((self.loader)())
            .catch_unwind()
            .map(|outcome| match outcome {
              Ok(result) => result.map(Arc::new).map_err(CacheError::fetch),
              Err(_) => Err(CacheError::fetch(eyre!("loader panicked"))),
            })
            .boxed()
            .shared();
          inner.state = LoadState::InFlight {
            id,
            flight: flight.clone(),
          };
          (id, flight)
        }
      }
    };

    let result = flight.await;
    self.settle(id, &result);
    result
  }

  /// Publish the outcome of flight `id`, unless another flight has
  /// already taken its place.
  fn settle(&self, id: u64, result: &Result<Arc<V>, CacheError>) {
    let mut inner = self.inner.lock();
    let current = matches!(inner.state, LoadState::InFlight { id: current, .. } if current == id);
    if !current {
      return;
    }

    inner.state = match result {
      Ok(value) => {
        debug!(resource = self.name, flight = id, "load complete");
        LoadState::Loaded(Arc::clone(value))
      }
      Err(error) => {
        warn!(resource = self.name, flight = id, %error, "load failed, will retry on next access");
        LoadState::Failed(error.clone())
      }
    };
  }

  /// The current state of the load.
  pub fn status(&self) -> LoadStatus {
    match &self.inner.lock().state {
      LoadState::Idle => LoadStatus::Idle,
      LoadState::InFlight { .. } => LoadStatus::Loading,
      LoadState::Loaded(_) => LoadStatus::Loaded,
      LoadState::Failed(error) => LoadStatus::Failed(error.clone()),
    }
  }
}

impl<V> fmt::Debug for LoadOnce<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.inner.lock();
    let state = match &inner.state {
      LoadState::Idle => "idle",
      LoadState::InFlight { .. } => "loading",
      LoadState::Loaded(_) => "loaded",
      LoadState::Failed(_) => "failed",
    };
    f.debug_struct("LoadOnce")
      .field("name", &self.name)
      .field("state", &state)
      .field("flights", &inner.flights)
      .finish_non_exhaustive()
  }
}
