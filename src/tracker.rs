use std::collections::HashMap;

use crate::tab_data::TabId;

/// Last observed domain label per tab
///
/// A missing entry means the tab has not been classified yet.
#[derive(Debug, Default)]
pub struct GroupByTabId {
    domains: HashMap<TabId, String>,
}

impl GroupByTabId {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `domain` for `tab_id`; true if it differs from the previous label
    pub fn record(&mut self, tab_id: TabId, domain: String) -> bool {
        if self.domains.get(&tab_id) == Some(&domain) {
            return false;
        }
        self.domains.insert(tab_id, domain);
        true
    }

    pub fn forget(&mut self, tab_id: TabId) -> Option<String> {
        self.domains.remove(&tab_id)
    }

    pub fn get(&self, tab_id: TabId) -> Option<&str> {
        self.domains.get(&tab_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
