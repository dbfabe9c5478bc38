//! Partial matching over composite keys.
//!
//! A composite key is a fixed sequence of optional fields. Used as a filter,
//! an unset field is a wildcard and a set field must equal the key's field.

/// A key made of optional sub-fields.
pub trait PartialKey {
  type Field: PartialEq;

  /// The key's fields, always in the same order and of the same length.
  fn fields(&self) -> Vec<Option<&Self::Field>>;
}

/// Whether every set field of `filter` equals the corresponding field of `key`.
///
/// An unset filter field matches anything, including an unset key field.
pub fn is_partial_match<K: PartialKey>(key: &K, filter: &K) -> bool {
  key
    .fields()
    .into_iter()
    .zip(filter.fields())
    .all(|(field, wanted)| match wanted {
      None => true,
      Some(wanted) => field == Some(wanted),
    })
}

/// Whether `filter` has no set fields and so matches every key.
pub fn is_wildcard<K: PartialKey>(filter: &K) -> bool {
  filter.fields().iter().all(Option::is_none)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::cache::traits::LookupKey;

  #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
  pub(crate) struct Triple {
    pub a: Option<String>,
    pub b: Option<String>,
    pub c: Option<String>,
  }

  impl Triple {
    pub(crate) fn new(a: &str, b: &str, c: &str) -> Self {
      Self {
        a: Some(a.to_string()),
        b: Some(b.to_string()),
        c: Some(c.to_string()),
      }
    }
  }

  impl PartialKey for Triple {
    type Field = String;

    fn fields(&self) -> Vec<Option<&String>> {
      vec![self.a.as_ref(), self.b.as_ref(), self.c.as_ref()]
    }
  }

  impl LookupKey for Triple {
    fn is_unset(&self) -> bool {
      is_wildcard(self)
    }
  }

  fn keys() -> Vec<Triple> {
    vec![
      Triple::new("A", "X", "1"),
      Triple::new("A", "X", "2"),
      Triple::new("A", "Y", "1"),
      Triple::new("B", "X", "1"),
    ]
  }

  #[test]
  fn test_single_field_filter() {
    let filter = Triple {
      a: Some("A".into()),
      ..Default::default()
    };
    let matched: Vec<_> = keys()
      .into_iter()
      .filter(|k| is_partial_match(k, &filter))
      .collect();
    assert_eq!(
      matched,
      vec![
        Triple::new("A", "X", "1"),
        Triple::new("A", "X", "2"),
        Triple::new("A", "Y", "1")
      ]
    );
  }

  #[test]
  fn test_two_field_filter() {
    let filter = Triple {
      a: Some("A".into()),
      b: Some("X".into()),
      c: None,
    };
    let matched = keys()
      .into_iter()
      .filter(|k| is_partial_match(k, &filter))
      .count();
    assert_eq!(matched, 2);
  }

  #[test]
  fn test_unset_filter_matches_everything() {
    let filter = Triple::default();
    assert!(is_wildcard(&filter));
    assert!(keys().iter().all(|k| is_partial_match(k, &filter)));
  }

  #[test]
  fn test_set_filter_field_does_not_match_unset_key_field() {
    let key = Triple {
      a: None,
      b: Some("X".into()),
      c: None,
    };
    let filter = Triple {
      a: Some("A".into()),
      ..Default::default()
    };
    assert!(!is_wildcard(&filter));
    assert!(!is_partial_match(&key, &filter));
  }
}
