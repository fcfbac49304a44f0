/// Data structures for browser tabs and tab groups
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub type TabId = i32;
pub type WindowId = i32;
pub type GroupId = i32;

/// Snapshot of a browser tab as returned by a tab query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub id: Option<TabId>,
    #[serde(default)]
    pub url: Option<String>,
    pub window_id: WindowId,
    #[serde(default)]
    pub pinned: bool,
    /// Native group membership; the browser reports -1 for ungrouped tabs
    #[serde(default, deserialize_with = "group_id_or_none")]
    pub group_id: Option<GroupId>,
}

impl Tab {
    pub fn new(id: TabId, url: &str, window_id: WindowId) -> Tab {
        Tab {
            id: Some(id),
            url: Some(url.to_string()),
            window_id,
            pinned: false,
            group_id: None,
        }
    }

    pub fn require_id(&self) -> Result<TabId> {
        self.id.ok_or(Error::MissingTabId)
    }

    pub fn require_url(&self) -> Result<&str> {
        match (&self.url, self.id) {
            (Some(url), _) if !url.is_empty() => Ok(url.as_str()),
            (_, id) => Err(Error::MissingTabUrl(id)),
        }
    }
}

fn group_id_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<GroupId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<GroupId>::deserialize(deserializer)?;
    Ok(raw.filter(|id| *id >= 0))
}

/// Native tab group colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

/// A native tab group as returned by a group query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    pub id: GroupId,
    pub window_id: WindowId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub color: Option<GroupColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
    Unloaded,
    #[serde(other)]
    Other,
}

/// Properties of a tab that changed, as delivered with a tab-updated event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabChangeInfo {
    #[serde(default)]
    pub status: Option<TabStatus>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TabChangeInfo {
    pub fn loading(url: &str) -> TabChangeInfo {
        TabChangeInfo {
            status: Some(TabStatus::Loading),
            url: Some(url.to_string()),
        }
    }

    /// URL of a navigation that started loading, if this change is one
    pub fn navigation_url(&self) -> Option<&str> {
        match (self.status, &self.url) {
            (Some(TabStatus::Loading), Some(url)) => Some(url.as_str()),
            _ => None,
        }
    }
}
