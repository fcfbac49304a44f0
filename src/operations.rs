/// Tab operations: domain sorting and clustering into groups
use std::collections::HashMap;

use log::debug;

use crate::domain::{compare_domains, domain_label};
use crate::tab_data::{GroupColor, Tab, TabId, WindowId};

/// A tab paired with its resolved domain label
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTab {
    pub tab: Tab,
    pub domain: String,
}

/// Sort tabs by domain (precompute domain for each tab)
///
/// The sort is stable: tabs sharing a domain keep their query order.
pub fn sort_tabs_by_domain(tabs: Vec<Tab>) -> Vec<DomainTab> {
    let mut tabs_with_domain: Vec<DomainTab> = tabs
        .into_iter()
        .map(|tab| {
            let domain = domain_label(tab.url.as_deref());
            DomainTab { tab, domain }
        })
        .collect();

    tabs_with_domain.sort_by(|a, b| compare_domains(&a.domain, &b.domain));
    tabs_with_domain
}

/// The unit of clustering: one domain within one window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub domain: String,
    pub window_id: WindowId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: GroupKey,
    pub tab_ids: Vec<TabId>,
    /// Members that currently sit in some native group
    pub grouped_tab_ids: Vec<TabId>,
}

impl Bucket {
    fn new(key: GroupKey) -> Bucket {
        Bucket {
            key,
            tab_ids: Vec::new(),
            grouped_tab_ids: Vec::new(),
        }
    }

    pub fn is_real(&self) -> bool {
        self.tab_ids.len() >= 2
    }
}

/// Buckets split into groups to materialize and single tabs to release
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterPlan {
    /// Real groups in encountered order; position is the color index
    pub real: Vec<Bucket>,
    pub orphans: Vec<Bucket>,
}

/// Partition sorted tabs into (domain, window) buckets
///
/// Pinned tabs, tabs without an id and tabs without a URL are left out.
pub fn cluster_tabs(sorted: &[DomainTab]) -> ClusterPlan {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();

    for entry in sorted.iter().filter(|entry| !entry.tab.pinned) {
        let tab_id = match (entry.tab.require_id(), entry.tab.require_url()) {
            (Ok(tab_id), Ok(_)) => tab_id,
            (Err(e), _) | (_, Err(e)) => {
                debug!("Not clustering tab: {}", e);
                continue;
            }
        };

        let key = GroupKey {
            domain: entry.domain.clone(),
            window_id: entry.tab.window_id,
        };
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            buckets.push(Bucket::new(key));
            buckets.len() - 1
        });

        let bucket = &mut buckets[position];
        bucket.tab_ids.push(tab_id);
        if entry.tab.group_id.is_some() {
            bucket.grouped_tab_ids.push(tab_id);
        }
    }

    let (real, orphans) = buckets.into_iter().partition(Bucket::is_real);
    ClusterPlan { real, orphans }
}

/// Color for the group at `index`, cycling through the palette
pub fn color_for(index: usize, palette: &[GroupColor]) -> Option<GroupColor> {
    if palette.is_empty() {
        None
    } else {
        Some(palette[index % palette.len()])
    }
}
