//! Cached façades over the JobServe API.

mod job_search;
mod reference;
mod salary;
mod value_lists;

use std::sync::Arc;

use color_eyre::Result;

pub use job_search::JobSearchService;
pub use reference::{CountryService, CurrencyService, IndustryService, JobTypeService};
pub use salary::SalaryService;
pub use value_lists::JobSearchValueListsService;

use crate::api::types::{GeoLocationMatch, WebServiceVersionInfo};
use crate::api::JobServeApi;

/// Every service, sharing one API client.
///
/// Each service owns its own cache, so keep one `JobServe` around for as
/// long as the cached data should live.
pub struct JobServe {
  api: Arc<dyn JobServeApi>,
  pub countries: CountryService,
  pub currencies: CurrencyService,
  pub industries: IndustryService,
  pub job_types: JobTypeService,
  pub salaries: SalaryService,
  pub value_lists: JobSearchValueListsService,
  pub jobs: JobSearchService,
}

impl JobServe {
  pub fn new(api: Arc<dyn JobServeApi>) -> Self {
    Self {
      countries: CountryService::new(api.clone()),
      currencies: CurrencyService::new(api.clone()),
      industries: IndustryService::new(api.clone()),
      job_types: JobTypeService::new(api.clone()),
      salaries: SalaryService::new(api.clone()),
      value_lists: JobSearchValueListsService::new(api.clone()),
      jobs: JobSearchService::new(api.clone()),
      api,
    }
  }

  /// Build and version of the remote service; not cached.
  pub async fn version(&self) -> Result<WebServiceVersionInfo> {
    self.api.version().await
  }

  /// Closest known location to a point; not cached.
  pub async fn geo_locate(
    &self,
    latitude: f64,
    longitude: f64,
    max_distance: Option<f64>,
  ) -> Result<GeoLocationMatch> {
    self.api.geo_locate(latitude, longitude, max_distance).await
  }
}
