use std::sync::Arc;

use crate::api::types::{SalaryBands, SalaryFrequency, SalaryMetadata};
use crate::api::JobServeApi;
use crate::cache::{CacheError, ExactMatch, LoadStatus, RemoteCollection, StringKeyed};

/// Salary bands for every country, currency and frequency, plus the
/// frequencies themselves.
///
/// The two collections are fetched independently; looking up a frequency
/// never loads the bands.
pub struct SalaryService {
  bands: RemoteCollection<SalaryMetadata, SalaryBands, ExactMatch>,
  frequencies: StringKeyed<SalaryFrequency>,
}

impl SalaryService {
  pub fn new(api: Arc<dyn JobServeApi>) -> Self {
    let bands_api = api.clone();
    let bands = RemoteCollection::new(
      "salary bands",
      move || {
        let api = bands_api.clone();
        async move { api.salary_bands(None, None, None).await }
      },
      |bands: &SalaryBands| bands.meta.clone(),
    );

    let frequencies = StringKeyed::new(
      "salary frequencies",
      move || {
        let api = api.clone();
        async move { api.salary_frequencies().await }
      },
      |frequency: &SalaryFrequency| frequency.id.clone(),
    );

    Self { bands, frequencies }
  }

  pub fn status(&self) -> LoadStatus {
    self.bands.status()
  }

  /// Every set of bands, in the order the service returned them.
  pub async fn underlying_collection(&self) -> Result<Arc<Vec<Option<SalaryBands>>>, CacheError> {
    self.bands.underlying_collection().await
  }

  /// Bands matching whichever of country, currency and frequency are given.
  ///
  /// Blank arguments count as not given; with none given every set of
  /// bands is returned.
  pub async fn get_salary_bands(
    &self,
    country: Option<&str>,
    currency: Option<&str>,
    frequency: Option<&str>,
  ) -> Result<Vec<Option<SalaryBands>>, CacheError> {
    let filter = SalaryMetadata::filter(country, currency, frequency);
    self.bands.get_matching(&filter).await
  }

  /// The single set of bands for an exact country, currency and frequency.
  pub async fn get_salary_band(&self, meta: &SalaryMetadata) -> Result<Option<SalaryBands>, CacheError> {
    self.bands.get_item(meta).await
  }

  pub async fn get_salary_frequencies(
    &self,
    ids: Option<&[String]>,
  ) -> Result<Vec<Option<SalaryFrequency>>, CacheError> {
    self.frequencies.get_items(ids).await
  }

  pub async fn get_salary_frequency(&self, id: &str) -> Result<Option<SalaryFrequency>, CacheError> {
    self.frequencies.get_item(&id.to_string()).await
  }

  /// The frequency a set of bands is quoted in, if it names a known one.
  ///
  /// Bands without a frequency, or with a blank one, give `None`.
  pub async fn frequency_of(&self, bands: &SalaryBands) -> Result<Option<SalaryFrequency>, CacheError> {
    match bands.meta.frequency.as_deref().map(str::trim) {
      Some(id) if !id.is_empty() => self.get_salary_frequency(id).await,
      _ => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::FakeApi;

  fn metas(bands: &[Option<SalaryBands>]) -> Vec<String> {
    bands
      .iter()
      .flatten()
      .map(|b| {
        format!(
          "{}/{}/{}",
          b.meta.country.as_deref().unwrap_or("-"),
          b.meta.currency.as_deref().unwrap_or("-"),
          b.meta.frequency.as_deref().unwrap_or("-"),
        )
      })
      .collect()
  }

  #[tokio::test]
  async fn test_partial_filters_narrow_the_bands() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api.clone());

    let uk = salaries.get_salary_bands(Some("GBR"), None, None).await.unwrap();
    assert_eq!(metas(&uk), vec!["GBR/GBP/A", "GBR/GBP/D", "GBR/EUR/A"]);

    let uk_sterling = salaries
      .get_salary_bands(Some("GBR"), Some("GBP"), None)
      .await
      .unwrap();
    assert_eq!(metas(&uk_sterling), vec!["GBR/GBP/A", "GBR/GBP/D"]);

    let annual = salaries.get_salary_bands(None, None, Some("A")).await.unwrap();
    assert_eq!(metas(&annual), vec!["GBR/GBP/A", "GBR/EUR/A", "AUS/AUD/A"]);

    assert_eq!(api.calls("salary_bands"), 1);
  }

  #[tokio::test]
  async fn test_no_filter_returns_everything() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api.clone());

    let all = salaries.get_salary_bands(None, Some(" "), None).await.unwrap();
    let collection = salaries.underlying_collection().await.unwrap();
    assert_eq!(all, *collection);
    assert_eq!(all.len(), 4);
  }

  #[tokio::test]
  async fn test_unmatched_filter_is_empty() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api);

    let none = salaries
      .get_salary_bands(Some("USA"), Some("USD"), None)
      .await
      .unwrap();
    assert!(none.is_empty());
  }

  #[tokio::test]
  async fn test_exact_band_lookup() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api);

    let meta = SalaryMetadata::filter(Some("AUS"), Some("AUD"), Some("A"));
    let band = salaries.get_salary_band(&meta).await.unwrap().unwrap();
    assert_eq!(band.ranges[0].lower.as_ref().unwrap().value, Some(40000.0));

    let error = salaries
      .get_salary_band(&SalaryMetadata::default())
      .await
      .unwrap_err();
    assert!(matches!(error, CacheError::InvalidKey(_)));
  }

  #[tokio::test]
  async fn test_frequency_of_bands() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api.clone());

    let mut bands = salaries.underlying_collection().await.unwrap()[1]
      .clone()
      .unwrap();
    let daily = salaries.frequency_of(&bands).await.unwrap().unwrap();
    assert_eq!(daily.text, "Daily");
    let formatted = daily.format_range(&bands.ranges[0]).unwrap();
    assert_eq!(formatted, "200 - 400 daily");

    bands.meta.frequency = Some("  ".into());
    assert!(salaries.frequency_of(&bands).await.unwrap().is_none());
    bands.meta.frequency = None;
    assert!(salaries.frequency_of(&bands).await.unwrap().is_none());
    assert_eq!(api.calls("salary_frequencies"), 1);
  }

  #[tokio::test]
  async fn test_frequencies_load_independently() {
    let api = Arc::new(FakeApi::sample());
    let salaries = SalaryService::new(api.clone());

    let daily = salaries.get_salary_frequency("d").await.unwrap().unwrap();
    assert_eq!(daily.text, "Daily");
    assert_eq!(salaries.get_salary_frequencies(None).await.unwrap().len(), 2);

    assert_eq!(api.calls("salary_frequencies"), 1);
    assert_eq!(api.calls("salary_bands"), 0);
    assert!(matches!(salaries.status(), LoadStatus::Idle));
  }
}
