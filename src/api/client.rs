use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{
  Country, Currency, GeoLocationMatch, IdList, Industry, Job, JobSearch, JobSearchResults,
  JobType, SalaryBands, SalaryFrequency, ValueListEntry, WebServiceVersionInfo,
};
use super::xml;
use crate::config::Config;

/// Operations of the JobServe jobs API.
///
/// Every call is a single request; nothing is cached at this level.
#[async_trait]
pub trait JobServeApi: Send + Sync {
  async fn version(&self) -> Result<WebServiceVersionInfo>;

  async fn countries(&self) -> Result<Vec<Country>>;

  async fn currencies(&self) -> Result<Vec<Currency>>;

  async fn industries(&self) -> Result<Vec<Industry>>;

  async fn job_types(&self) -> Result<Vec<JobType>>;

  /// The search the website starts from
  async fn search_defaults(&self) -> Result<JobSearch>;

  /// Value lists keyed by the JobSearch member they apply to
  async fn search_value_lists(&self) -> Result<Vec<ValueListEntry>>;

  async fn salary_frequencies(&self) -> Result<Vec<SalaryFrequency>>;

  /// Salary bands, narrowed by whichever arguments are given.
  ///
  /// A currency needs a country and a frequency needs a currency.
  async fn salary_bands(
    &self,
    country: Option<&str>,
    currency: Option<&str>,
    frequency: Option<&str>,
  ) -> Result<Vec<SalaryBands>>;

  /// Resolve the closest known location to a point
  async fn geo_locate(
    &self,
    latitude: f64,
    longitude: f64,
    max_distance: Option<f64>,
  ) -> Result<GeoLocationMatch>;

  async fn search(&self, search: &JobSearch) -> Result<JobSearchResults>;

  async fn job(&self, id: &str) -> Result<Job>;

  async fn jobs(&self, ids: &[String]) -> Result<Vec<Job>>;
}

/// HTTP client for the JobServe API
#[derive(Clone)]
pub struct JobServeClient {
  /// Requests gzip/deflate encoded responses
  compressed: reqwest::Client,
  plain: reqwest::Client,
  base: Url,
}

impl JobServeClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = config.api_token()?;
    let scheme = if config.api.secure { "https" } else { "http" };
    let base = Url::parse(&format!("{}://{}/", scheme, config.api.host))
      .map_err(|e| eyre!("Invalid API host {}: {}", config.api.host, e))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      AUTHORIZATION,
      HeaderValue::from_str(&format!("Token {}", token))
        .map_err(|e| eyre!("Invalid API token: {}", e))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
    headers.insert(
      ACCEPT_LANGUAGE,
      HeaderValue::from_str(&config.api.language)
        .map_err(|e| eyre!("Invalid language {}: {}", config.api.language, e))?,
    );

    let build = |compress: bool| {
      reqwest::Client::builder()
        .default_headers(headers.clone())
        .gzip(compress)
        .deflate(compress)
        .build()
        .map_err(|e| eyre!("Failed to create HTTP client: {}", e))
    };

    Ok(Self {
      compressed: build(true)?,
      plain: build(false)?,
      base,
    })
  }

  fn http(&self, compress: bool) -> &reqwest::Client {
    if compress {
      &self.compressed
    } else {
      &self.plain
    }
  }

  async fn get_body(&self, url: Url, compress: bool) -> Result<String> {
    debug!(%url, compress, "GET");
    let response = self
      .http(compress)
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", url, e))
  }

  async fn post_body(&self, url: Url, body: String, compress: bool) -> Result<String> {
    debug!(%url, compress, "POST");
    let response = self
      .http(compress)
      .post(url.clone())
      .header(CONTENT_TYPE, "application/xml")
      .body(body)
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", url, e))
  }

  async fn get<T: DeserializeOwned>(&self, segments: &[&str], compress: bool) -> Result<T> {
    let body = self.get_body(endpoint(&self.base, segments)?, compress).await?;
    xml::from_str(&body)
  }

  async fn get_list<T: DeserializeOwned>(&self, segments: &[&str], compress: bool) -> Result<Vec<T>> {
    let body = self.get_body(endpoint(&self.base, segments)?, compress).await?;
    xml::from_list(&body)
  }
}

#[async_trait]
impl JobServeApi for JobServeClient {
  async fn version(&self) -> Result<WebServiceVersionInfo> {
    self.get(&["Version"], false).await
  }

  async fn countries(&self) -> Result<Vec<Country>> {
    self.get_list(&["Countries"], true).await
  }

  async fn currencies(&self) -> Result<Vec<Currency>> {
    self.get_list(&["Currencies"], true).await
  }

  async fn industries(&self) -> Result<Vec<Industry>> {
    self.get_list(&["Industries"], true).await
  }

  async fn job_types(&self) -> Result<Vec<JobType>> {
    self.get_list(&["JobTypes"], false).await
  }

  async fn search_defaults(&self) -> Result<JobSearch> {
    self.get(&["JobSearchDefaults"], false).await
  }

  async fn search_value_lists(&self) -> Result<Vec<ValueListEntry>> {
    self.get_list(&["JobSearchValueLists"], true).await
  }

  async fn salary_frequencies(&self) -> Result<Vec<SalaryFrequency>> {
    self.get_list(&["Salaries", "Frequencies"], false).await
  }

  async fn salary_bands(
    &self,
    country: Option<&str>,
    currency: Option<&str>,
    frequency: Option<&str>,
  ) -> Result<Vec<SalaryBands>> {
    let segments = salary_segments(country, currency, frequency)?;
    self.get_list(&segments, true).await
  }

  async fn geo_locate(
    &self,
    latitude: f64,
    longitude: f64,
    max_distance: Option<f64>,
  ) -> Result<GeoLocationMatch> {
    let url = location_url(&self.base, latitude, longitude, max_distance)?;
    let body = self.get_body(url, false).await?;
    xml::from_str(&body)
  }

  async fn search(&self, search: &JobSearch) -> Result<JobSearchResults> {
    let body = xml::to_wire("JobSearch", search)?;
    let response = self
      .post_body(endpoint(&self.base, &["Jobs"])?, body, true)
      .await?;
    xml::from_str(&response)
  }

  async fn job(&self, id: &str) -> Result<Job> {
    let id = id.trim();
    if id.is_empty() {
      return Err(eyre!("A job ID is required"));
    }
    self.get(&["Jobs", id], true).await
  }

  async fn jobs(&self, ids: &[String]) -> Result<Vec<Job>> {
    if ids.is_empty() {
      return Err(eyre!("At least one job ID is required"));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
      return Err(eyre!("Job IDs cannot be blank"));
    }
    let ids: IdList = ids.iter().map(|id| id.trim()).collect();
    let body = xml::to_wire("IDCollection", &ids)?;
    let response = self
      .post_body(endpoint(&self.base, &["Jobs", "List"])?, body, true)
      .await?;
    xml::from_list(&response)
  }
}

/// Append path segments to the API root, escaping each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
  let mut url = base.clone();
  url
    .path_segments_mut()
    .map_err(|_| eyre!("API base {} cannot take a path", base))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}

fn salary_segments<'a>(
  country: Option<&'a str>,
  currency: Option<&'a str>,
  frequency: Option<&'a str>,
) -> Result<Vec<&'a str>> {
  let given = |value: Option<&'a str>| value.map(str::trim).filter(|v| !v.is_empty());
  let (country, currency, frequency) = (given(country), given(currency), given(frequency));

  if currency.is_some() && country.is_none() {
    return Err(eyre!("A country must be provided if a currency is provided"));
  }
  if frequency.is_some() && currency.is_none() {
    return Err(eyre!("A currency must be provided if a frequency is provided"));
  }

  let mut segments = vec!["Salaries"];
  segments.extend([country, currency, frequency].into_iter().flatten());
  Ok(segments)
}

fn location_url(base: &Url, latitude: f64, longitude: f64, max_distance: Option<f64>) -> Result<Url> {
  let (latitude, longitude) = (latitude.to_string(), longitude.to_string());
  let mut url = endpoint(base, &["Locations", &latitude, &longitude])?;
  if let Some(distance) = max_distance.filter(|d| *d != 0.0) {
    url
      .query_pairs_mut()
      .append_pair("maxDistance", &distance.to_string());
  }
  Ok(url)
}
