use std::sync::Arc;

use color_eyre::Result;
use tracing::debug;

use crate::api::types::{Job, JobSearch, JobSearchResults};
use crate::api::JobServeApi;
use crate::cache::{CacheError, LoadOnce};

/// Job searches, starting from the server's default criteria.
pub struct JobSearchService {
  api: Arc<dyn JobServeApi>,
  defaults: LoadOnce<JobSearch>,
}

impl JobSearchService {
  pub fn new(api: Arc<dyn JobServeApi>) -> Self {
    let defaults_api = api.clone();
    let defaults = LoadOnce::new("search defaults", move || {
      let api = defaults_api.clone();
      async move { api.search_defaults().await }
    });
    Self { api, defaults }
  }

  /// A fresh copy of the default search, safe to modify.
  ///
  /// The defaults are fetched on first use and kept.
  pub async fn create_default_search(&self) -> Result<JobSearch, CacheError> {
    let defaults = self.defaults.get().await?;
    Ok(JobSearch::clone(&defaults))
  }

  /// Run a search. Results are never cached.
  pub async fn search(&self, search: &JobSearch) -> Result<JobSearchResults> {
    let results = self.api.search(search).await?;
    debug!(
      jobs = results.job_count,
      returned = results.jobs.len(),
      "search complete"
    );
    Ok(results)
  }

  pub async fn get_job(&self, id: &str) -> Result<Job> {
    self.api.job(id).await
  }

  pub async fn get_jobs(&self, ids: &[String]) -> Result<Vec<Job>> {
    self.api.jobs(ids).await
  }
}
