use std::sync::Arc;

use crate::api::types::{ValueList, ValueListEntry};
use crate::api::JobServeApi;
use crate::cache::{CacheError, LoadStatus, StringKeyed};

/// Value lists for the members of a job search, keyed by member name.
pub struct JobSearchValueListsService {
  lists: StringKeyed<ValueListEntry>,
}

impl JobSearchValueListsService {
  pub fn new(api: Arc<dyn JobServeApi>) -> Self {
    let lists = StringKeyed::new(
      "search value lists",
      move || {
        let api = api.clone();
        async move { api.search_value_lists().await }
      },
      |entry: &ValueListEntry| entry.key.clone(),
    );
    Self { lists }
  }

  pub fn status(&self) -> LoadStatus {
    self.lists.status()
  }

  /// Every member with its value list, in server order.
  pub async fn get_index(&self) -> Result<Vec<ValueListEntry>, CacheError> {
    let entries = self.lists.underlying_collection().await?;
    Ok(entries.iter().flatten().cloned().collect())
  }

  /// The list bound to a JobSearch member, e.g. `MaxAge`.
  pub async fn get_list(&self, member: &str) -> Result<Option<ValueList>, CacheError> {
    let entry = self.lists.get_item(&member.to_string()).await?;
    Ok(entry.map(|entry| entry.value))
  }
}
