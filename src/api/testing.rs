//! In-memory `JobServeApi` that counts calls.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use parking_lot::Mutex;

use super::client::JobServeApi;
use super::types::*;

#[derive(Default)]
pub(crate) struct FakeApi {
  calls: Mutex<HashMap<&'static str, usize>>,
  /// Number of upcoming calls that fail
  failures: Mutex<usize>,
  /// Latency added to every call
  pub delay: Option<Duration>,
  pub countries: Vec<Country>,
  pub currencies: Vec<Currency>,
  pub industries: Vec<Industry>,
  pub job_types: Vec<JobType>,
  pub frequencies: Vec<SalaryFrequency>,
  pub bands: Vec<SalaryBands>,
  pub value_lists: Vec<ValueListEntry>,
  pub defaults: JobSearch,
  pub jobs: Vec<Job>,
}

fn country(id: &str, text: &str) -> Country {
  Country {
    id: id.into(),
    text: text.into(),
  }
}

fn frequency(id: &str, text: &str) -> SalaryFrequency {
  SalaryFrequency {
    id: id.into(),
    text: text.into(),
    salary_range_format: Some(format!("{{0}} - {{1}} {}", text.to_lowercase())),
    salary_range_format_no_lower: None,
    salary_range_format_no_upper: None,
  }
}

fn bands(country: &str, currency: &str, frequency: &str, lowest: f64) -> SalaryBands {
  let value = |v: f64| {
    Some(SalaryValue {
      value: Some(v),
      text: None,
    })
  };
  SalaryBands {
    meta: SalaryMetadata::filter(Some(country), Some(currency), Some(frequency)),
    ranges: vec![SalaryRange {
      lower: value(lowest),
      upper: value(lowest * 2.0),
      text: None,
    }],
  }
}

fn value_list(member: &str, values: &[&str]) -> ValueListEntry {
  let item = |v: &str| ValueListItem {
    value: Some(v.into()),
    description: Some(format!("{} {}", member, v)),
  };
  ValueListEntry {
    key: member.into(),
    value: ValueList {
      default_value: values.first().map(|v| item(v)),
      empty_value: None,
      items: values.iter().map(|v| item(v)).collect(),
    },
  }
}

impl FakeApi {
  pub(crate) fn sample() -> Self {
    Self {
      countries: vec![
        country("GBR", "United Kingdom"),
        country("AUS", "Australia"),
        country("USA", "United States"),
      ],
      currencies: vec![
        Currency {
          id: "GBP".into(),
          text: "Pound Sterling".into(),
          symbol: Some("£".into()),
        },
        Currency {
          id: "AUD".into(),
          text: "Australian Dollar".into(),
          symbol: Some("$".into()),
        },
      ],
      industries: vec![Industry {
        id: "01".into(),
        text: "IT".into(),
      }],
      job_types: vec![
        JobType {
          id: "P".into(),
          text: "Permanent".into(),
        },
        JobType {
          id: "C".into(),
          text: "Contract".into(),
        },
      ],
      frequencies: vec![frequency("A", "Annually"), frequency("D", "Daily")],
      bands: vec![
        bands("GBR", "GBP", "A", 20000.0),
        bands("GBR", "GBP", "D", 200.0),
        bands("GBR", "EUR", "A", 25000.0),
        bands("AUS", "AUD", "A", 40000.0),
      ],
      value_lists: vec![
        value_list("MaxAge", &["7", "1", "14"]),
        value_list("SortOrder", &["Rank", "DateTime"]),
      ],
      defaults: JobSearch {
        max_age: Some(7),
        page_size: Some(25),
        sort_order: Some("Rank".into()),
        ..Default::default()
      },
      jobs: vec![Job {
        id: "J1".into(),
        permanent_id: None,
        permalink: None,
        position: "Rust Developer".into(),
        location: None,
        job_type: Some("P".into()),
        salary: None,
        date_posted: None,
        description: None,
      }],
      ..Default::default()
    }
  }

  pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Make the next `count` calls fail.
  pub(crate) fn fail_next(&self, count: usize) {
    *self.failures.lock() = count;
  }

  pub(crate) fn calls(&self, operation: &str) -> usize {
    self.calls.lock().get(operation).copied().unwrap_or(0)
  }

  async fn record(&self, operation: &'static str) -> Result<()> {
    *self.calls.lock().entry(operation).or_default() += 1;
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    let mut failures = self.failures.lock();
    if *failures > 0 {
      *failures -= 1;
      return Err(eyre!("{}: 503 Service Unavailable", operation));
    }
    Ok(())
  }
}

#[async_trait]
impl JobServeApi for FakeApi {
  async fn version(&self) -> Result<WebServiceVersionInfo> {
    self.record("version").await?;
    Ok(WebServiceVersionInfo {
      code_version: "test".into(),
      code_timestamp: None,
      config_timestamp: None,
    })
  }

  async fn countries(&self) -> Result<Vec<Country>> {
    self.record("countries").await?;
    Ok(self.countries.clone())
  }

  async fn currencies(&self) -> Result<Vec<Currency>> {
    self.record("currencies").await?;
    Ok(self.currencies.clone())
  }

  async fn industries(&self) -> Result<Vec<Industry>> {
    self.record("industries").await?;
    Ok(self.industries.clone())
  }

  async fn job_types(&self) -> Result<Vec<JobType>> {
    self.record("job_types").await?;
    Ok(self.job_types.clone())
  }

  async fn search_defaults(&self) -> Result<JobSearch> {
    self.record("search_defaults").await?;
    Ok(self.defaults.clone())
  }

  async fn search_value_lists(&self) -> Result<Vec<ValueListEntry>> {
    self.record("search_value_lists").await?;
    Ok(self.value_lists.clone())
  }

  async fn salary_frequencies(&self) -> Result<Vec<SalaryFrequency>> {
    self.record("salary_frequencies").await?;
    Ok(self.frequencies.clone())
  }

  async fn salary_bands(
    &self,
    country: Option<&str>,
    currency: Option<&str>,
    frequency: Option<&str>,
  ) -> Result<Vec<SalaryBands>> {
    self.record("salary_bands").await?;
    let filter = SalaryMetadata::filter(country, currency, frequency);
    Ok(
      self
        .bands
        .iter()
        .filter(|b| crate::cache::partial::is_partial_match(&b.meta, &filter))
        .cloned()
        .collect(),
    )
  }

  async fn geo_locate(
    &self,
    latitude: f64,
    longitude: f64,
    _max_distance: Option<f64>,
  ) -> Result<GeoLocationMatch> {
    self.record("geo_locate").await?;
    Ok(GeoLocationMatch {
      distance: 0.0,
      location: Location {
        latitude: Some(latitude),
        longitude: Some(longitude),
        ..Default::default()
      },
    })
  }

  async fn search(&self, search: &JobSearch) -> Result<JobSearchResults> {
    self.record("search").await?;
    let jobs = if search.job_ids_only {
      Vec::new()
    } else {
      self.jobs.clone()
    };
    Ok(JobSearchResults {
      job_count: self.jobs.len() as u64,
      job_ids: self.jobs.iter().map(|j| j.id.clone()).collect(),
      jobs,
    })
  }

  async fn job(&self, id: &str) -> Result<Job> {
    self.record("job").await?;
    self
      .jobs
      .iter()
      .find(|j| j.id == id)
      .cloned()
      .ok_or_else(|| eyre!("404 Not Found: job {}", id))
  }

  async fn jobs(&self, ids: &[String]) -> Result<Vec<Job>> {
    self.record("jobs").await?;
    Ok(
      self
        .jobs
        .iter()
        .filter(|j| ids.contains(&j.id))
        .cloned()
        .collect(),
    )
  }
}
