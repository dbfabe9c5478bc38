//! XML encoding for the JobServe wire format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use color_eyre::{eyre::eyre, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Namespace of every document posted to the API
pub const NAMESPACE: &str = "http://schemas.aspiremediagroup.net/jobboard/1.0/Beta";

/// A container element whose children are all items, whatever their tag.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct List<T> {
  #[serde(rename = "$value", default)]
  items: Vec<T>,
}

/// Parse a single object document.
pub fn from_str<T: DeserializeOwned>(body: &str) -> Result<T> {
  quick_xml::de::from_str(body).map_err(|e| eyre!("Failed to parse response: {}", e))
}

/// Parse a collection document into its items.
pub fn from_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
  let list: List<T> =
    quick_xml::de::from_str(body).map_err(|e| eyre!("Failed to parse response: {}", e))?;
  Ok(list.items)
}

/// Serialize `value` as a document rooted at `root` in the API namespace.
pub fn to_wire<T: Serialize>(root: &str, value: &T) -> Result<String> {
  let body = quick_xml::se::to_string_with_root(root, value)
    .map_err(|e| eyre!("Failed to encode {}: {}", root, e))?;

  let open = format!("<{}", root);
  match body.strip_prefix(&open) {
    Some(rest) => Ok(format!("{} xmlns=\"{}\"{}", open, NAMESPACE, rest)),
    None => Err(eyre!("Unexpected document root in encoded {}", root)),
  }
}

/// Deserialize a wrapped nested collection into a plain `Vec`.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  let list: Option<List<T>> = Option::deserialize(deserializer)?;
  Ok(list.map(|l| l.items).unwrap_or_default())
}

/// Deserialize an optional timestamp, with or without an offset.
pub(crate) fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
  D: Deserializer<'de>,
{
  let text: Option<String> = Option::deserialize(deserializer)?;
  match text.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(text) => parse_datetime(text)
      .map(Some)
      .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", text))),
  }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
    return Some(dt.naive_utc());
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(dt);
  }
  NaiveDate::parse_from_str(text, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
}
