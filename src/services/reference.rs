//! Cached reference data: countries, currencies, industries and job types.
//!
//! Each service fetches its collection once and looks items up by ID,
//! ignoring case.

use std::sync::Arc;

use crate::api::types::{Country, Currency, Industry, JobType};
use crate::api::JobServeApi;
use crate::cache::{CacheError, LoadStatus, StringKeyed};

macro_rules! reference_service {
  (
    $(#[$meta:meta])*
    $service:ident {
      item: $item:ty,
      resource: $resource:literal,
      fetch: $fetch:ident,
      all: $all:ident,
      one: $one:ident $(,)?
    }
  ) => {
    $(#[$meta])*
    pub struct $service {
      cache: StringKeyed<$item>,
    }

    impl $service {
      pub fn new(api: Arc<dyn JobServeApi>) -> Self {
        let cache = StringKeyed::new(
          $resource,
          move || {
            let api = api.clone();
            async move { api.$fetch().await }
          },
          |item: &$item| item.id.clone(),
        );
        Self { cache }
      }

      pub fn status(&self) -> LoadStatus {
        self.cache.status()
      }

      /// Everything the service returned, in its order.
      pub async fn underlying_collection(&self) -> Result<Arc<Vec<Option<$item>>>, CacheError> {
        self.cache.underlying_collection().await
      }

      /// Items by ID, or all of them when `ids` is `None`.
      pub async fn $all(&self, ids: Option<&[String]>) -> Result<Vec<Option<$item>>, CacheError> {
        self.cache.get_items(ids).await
      }

      pub async fn $one(&self, id: &str) -> Result<Option<$item>, CacheError> {
        self.cache.get_item(&id.to_string()).await
      }
    }
  };
}

reference_service! {
  /// Countries, keyed by their three letter code.
  CountryService {
    item: Country,
    resource: "countries",
    fetch: countries,
    all: get_countries,
    one: get_country,
  }
}

reference_service! {
  /// Currencies, keyed by ISO 4217 code.
  CurrencyService {
    item: Currency,
    resource: "currencies",
    fetch: currencies,
    all: get_currencies,
    one: get_currency,
  }
}

reference_service! {
  /// Industry sectors used to categorise jobs.
  IndustryService {
    item: Industry,
    resource: "industries",
    fetch: industries,
    all: get_industries,
    one: get_industry,
  }
}

reference_service! {
  /// Job types such as permanent or contract.
  JobTypeService {
    item: JobType,
    resource: "job types",
    fetch: job_types,
    all: get_job_types,
    one: get_job_type,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::FakeApi;
  use std::time::Duration;

  fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test]
  async fn test_lookup_ignores_case() {
    let api = Arc::new(FakeApi::sample());
    let countries = CountryService::new(api.clone());

    let country = countries.get_country("gbr").await.unwrap().unwrap();
    assert_eq!(country.text, "United Kingdom");
    assert!(countries.get_country("FRA").await.unwrap().is_none());
    assert_eq!(api.calls("countries"), 1);
  }

  #[tokio::test]
  async fn test_bulk_lookup_lines_up_with_ids() {
    let api = Arc::new(FakeApi::sample());
    let currencies = CurrencyService::new(api.clone());

    let wanted = ids(&["aud", "XXX", "GBP"]);
    let found = currencies
      .get_currencies(Some(wanted.as_slice()))
      .await
      .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].as_ref().unwrap().id, "AUD");
    assert!(found[1].is_none());
    assert_eq!(found[2].as_ref().unwrap().symbol.as_deref(), Some("£"));

    let all = currencies.get_currencies(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(api.calls("currencies"), 1);
  }

  #[tokio::test]
  async fn test_blank_id_is_rejected_without_fetching() {
    let api = Arc::new(FakeApi::sample());
    let industries = IndustryService::new(api.clone());

    let error = industries.get_industry("   ").await.unwrap_err();
    assert!(matches!(error, CacheError::InvalidKey(_)));
    assert_eq!(api.calls("industries"), 0);
  }

  #[tokio::test]
  async fn test_concurrent_first_use_fetches_once() {
    let api = Arc::new(FakeApi::sample().with_delay(Duration::from_millis(20)));
    let job_types = Arc::new(JobTypeService::new(api.clone()));

    let lookups: Vec<_> = ["P", "c", "X", "p"]
      .into_iter()
      .map(|id| {
        let job_types = job_types.clone();
        tokio::spawn(async move { job_types.get_job_type(id).await })
      })
      .collect();

    let mut found = Vec::new();
    for lookup in lookups {
      found.push(lookup.await.unwrap().unwrap().map(|t| t.text));
    }

    assert_eq!(
      found,
      vec![
        Some("Permanent".to_string()),
        Some("Contract".to_string()),
        None,
        Some("Permanent".to_string()),
      ]
    );
    assert_eq!(api.calls("job_types"), 1);
  }

  #[tokio::test]
  async fn test_failed_fetch_is_retried() {
    let api = Arc::new(FakeApi::sample());
    api.fail_next(1);
    let countries = CountryService::new(api.clone());

    let error = countries.underlying_collection().await.unwrap_err();
    assert!(error.to_string().contains("503"));
    assert!(matches!(countries.status(), LoadStatus::Failed(_)));

    let all = countries.underlying_collection().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(api.calls("countries"), 2);
  }
}
