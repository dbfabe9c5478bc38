//! Typed objects exchanged with the JobServe API.
//!
//! Field names follow the XML wire schema (PascalCase elements). Nested
//! collections arrive wrapped in a container element and are flattened into
//! plain `Vec`s on the way in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::xml;
use crate::cache::{LookupKey, PartialKey};

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Country {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(default)]
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Currency {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Industry {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(default)]
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobType {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(default)]
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebServiceVersionInfo {
  #[serde(rename = "CodeVersion", default)]
  pub code_version: String,
  #[serde(rename = "CodeTimestamp", default, deserialize_with = "xml::opt_datetime")]
  pub code_timestamp: Option<NaiveDateTime>,
  #[serde(rename = "ConfigTimestamp", default, deserialize_with = "xml::opt_datetime")]
  pub config_timestamp: Option<NaiveDateTime>,
}

// ============================================================================
// Salaries
// ============================================================================

/// Composite key of a set of salary bands.
///
/// Used as a lookup key all three fields identify one set of bands; used as
/// a filter, unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalaryMetadata {
  #[serde(default)]
  pub country: Option<String>,
  #[serde(default)]
  pub currency: Option<String>,
  #[serde(default)]
  pub frequency: Option<String>,
}

impl SalaryMetadata {
  /// Build a filter, treating blank arguments as unset.
  pub fn filter(country: Option<&str>, currency: Option<&str>, frequency: Option<&str>) -> Self {
    let set = |value: Option<&str>| {
      value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
    };
    Self {
      country: set(country),
      currency: set(currency),
      frequency: set(frequency),
    }
  }
}

impl PartialKey for SalaryMetadata {
  type Field = String;

  fn fields(&self) -> Vec<Option<&String>> {
    vec![
      self.country.as_ref(),
      self.currency.as_ref(),
      self.frequency.as_ref(),
    ]
  }
}

impl LookupKey for SalaryMetadata {
  fn is_unset(&self) -> bool {
    self.country.is_none() && self.currency.is_none() && self.frequency.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalaryValue {
  #[serde(default)]
  pub value: Option<f64>,
  #[serde(default)]
  pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalaryRange {
  #[serde(default)]
  pub lower: Option<SalaryValue>,
  #[serde(default)]
  pub upper: Option<SalaryValue>,
  #[serde(default)]
  pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalaryBands {
  #[serde(default)]
  pub meta: SalaryMetadata,
  #[serde(default, deserialize_with = "xml::list")]
  pub ranges: Vec<SalaryRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalaryFrequency {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(default)]
  pub text: String,
  /// Format for a range with both bounds: `{0}` lower, `{1}` upper
  #[serde(default)]
  pub salary_range_format: Option<String>,
  /// Format for a range with only an upper bound, in `{0}`
  #[serde(default)]
  pub salary_range_format_no_lower: Option<String>,
  /// Format for a range with only a lower bound, in `{0}`
  #[serde(default)]
  pub salary_range_format_no_upper: Option<String>,
}

impl SalaryFrequency {
  /// Render a salary range with this frequency's format strings.
  ///
  /// Returns `None` for a range with neither bound, or when the matching
  /// format string is missing.
  pub fn format_range(&self, range: &SalaryRange) -> Option<String> {
    let amount = |bound: &SalaryValue| bound.value.unwrap_or(0.0);
    match (&range.lower, &range.upper) {
      (None, None) => None,
      (None, Some(upper)) => {
        let format = self.salary_range_format_no_lower.as_deref()?;
        Some(fill_placeholders(format, &[amount(upper)]))
      }
      (Some(lower), None) => {
        let format = self.salary_range_format_no_upper.as_deref()?;
        Some(fill_placeholders(format, &[amount(lower)]))
      }
      (Some(lower), Some(upper)) => {
        let format = self.salary_range_format.as_deref()?;
        Some(fill_placeholders(format, &[amount(lower), amount(upper)]))
      }
    }
  }
}

/// Substitute `{n}` / `{n:spec}` placeholders with the n-th amount.
///
/// Format specs are ignored; whole amounts print without decimals.
fn fill_placeholders(format: &str, amounts: &[f64]) -> String {
  let mut out = String::with_capacity(format.len());
  let mut rest = format;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let Some(close) = after.find('}') else {
      out.push_str(&rest[open..]);
      return out;
    };
    let placeholder = &after[..close];
    let position = placeholder.split(':').next().unwrap_or_default();
    match position.trim().parse::<usize>().ok().and_then(|i| amounts.get(i)) {
      Some(amount) if amount.fract() == 0.0 => out.push_str(&format!("{:.0}", amount)),
      Some(amount) => out.push_str(&format!("{:.2}", amount)),
      None => out.push_str(&rest[open..open + close + 2]),
    }
    rest = &after[close + 1..];
  }
  out.push_str(rest);
  out
}

// ============================================================================
// Job search value lists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueListItem {
  #[serde(default)]
  pub value: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueList {
  #[serde(default)]
  pub default_value: Option<ValueListItem>,
  #[serde(default)]
  pub empty_value: Option<ValueListItem>,
  #[serde(default, deserialize_with = "xml::list")]
  pub items: Vec<ValueListItem>,
}

/// One entry of the value lists index: the JobSearch member a list binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueListEntry {
  pub key: String,
  pub value: ValueList,
}

// ============================================================================
// Searching and jobs
// ============================================================================

/// A list of IDs as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdList {
  #[serde(rename = "ID", default)]
  pub ids: Vec<String>,
}

impl<S: Into<String>> FromIterator<S> for IdList {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      ids: iter.into_iter().map(Into::into).collect(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
  #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub latitude: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub longitude: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationList {
  #[serde(rename = "Location", default)]
  pub locations: Vec<Location>,
}

/// Search criteria. Members are declared in wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "JobSearch")]
pub struct JobSearch {
  #[serde(rename = "Industries", default, skip_serializing_if = "Option::is_none")]
  pub industries: Option<IdList>,
  #[serde(rename = "JobIDsOnly", default)]
  pub job_ids_only: bool,
  #[serde(rename = "JobTypes", default, skip_serializing_if = "Option::is_none")]
  pub job_types: Option<IdList>,
  #[serde(rename = "Locations", default, skip_serializing_if = "Option::is_none")]
  pub locations: Option<LocationList>,
  #[serde(rename = "MaxAge", default, skip_serializing_if = "Option::is_none")]
  pub max_age: Option<u32>,
  #[serde(rename = "MaxDistance", default, skip_serializing_if = "Option::is_none")]
  pub max_distance: Option<f64>,
  #[serde(rename = "Page", default, skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(rename = "PageSize", default, skip_serializing_if = "Option::is_none")]
  pub page_size: Option<u32>,
  #[serde(rename = "Skills", default, skip_serializing_if = "Option::is_none")]
  pub skills: Option<String>,
  #[serde(rename = "SortOrder", default, skip_serializing_if = "Option::is_none")]
  pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(rename = "PermanentID", default)]
  pub permanent_id: Option<String>,
  #[serde(default)]
  pub permalink: Option<String>,
  #[serde(default)]
  pub position: String,
  #[serde(default)]
  pub location: Option<Location>,
  #[serde(default)]
  pub job_type: Option<String>,
  #[serde(default)]
  pub salary: Option<String>,
  #[serde(default, deserialize_with = "xml::opt_datetime")]
  pub date_posted: Option<NaiveDateTime>,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchResults {
  #[serde(rename = "JobCount", default)]
  pub job_count: u64,
  #[serde(rename = "JobIDs", default, deserialize_with = "xml::list")]
  pub job_ids: Vec<String>,
  #[serde(rename = "Jobs", default, deserialize_with = "xml::list")]
  pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoLocationMatch {
  /// Distance in metres from the requested point
  #[serde(default)]
  pub distance: f64,
  pub location: Location,
}
