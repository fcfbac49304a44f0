/// Capability surface over native tab, group and storage operations
///
/// Every operation is awaited and reports failures through `Result`. The
/// browser runtime is single-threaded, so implementations are not `Send`.
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::tab_data::{GroupColor, GroupId, Tab, TabChangeInfo, TabGroup, TabId, WindowId};

/// Optional browser features, queried once per organize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub grouping: bool,
}

/// Browser lifecycle signals the organizer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    IconClicked,
    TabUpdated { tab_id: TabId, change: TabChangeInfo },
    TabRemoved { tab_id: TabId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTabsRequest {
    pub tab_ids: Vec<TabId>,
    pub window_id: WindowId,
    /// Existing group to add the tabs to; a new group is created when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupUpdate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<GroupColor>,
    pub collapsed: bool,
}

pub type IconClickedListener = Box<dyn Fn()>;
pub type TabUpdatedListener = Box<dyn Fn(TabId, TabChangeInfo)>;
pub type TabRemovedListener = Box<dyn Fn(TabId)>;
/// Receives the new serialized value, or `None` when the entry was removed
pub type SettingChangedListener = Box<dyn Fn(Option<String>)>;

#[async_trait(?Send)]
pub trait BrowserGateway {
    async fn query_all_tabs(&self) -> Result<Vec<Tab>>;

    /// Move a tab to the last position of its window
    async fn move_tab_to_end(&self, tab_id: TabId) -> Result<()>;

    async fn group_tabs(&self, request: &GroupTabsRequest) -> Result<GroupId>;

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<()>;

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<()>;

    /// Groups in `window_id` whose title matches `title`. The native query
    /// treats the title as a pattern, so results may include groups whose
    /// title is not exactly `title`.
    async fn query_groups(&self, window_id: WindowId, title: &str) -> Result<Vec<TabGroup>>;

    fn color_palette(&self) -> Vec<GroupColor>;

    fn capabilities(&self) -> Capabilities;

    fn on_icon_clicked(&self, listener: IconClickedListener);

    fn on_tab_updated(&self, listener: TabUpdatedListener);

    fn on_tab_removed(&self, listener: TabRemovedListener);

    async fn get_setting(&self, key: &str) -> Result<Option<String>>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Called whenever the entry under `key` changes, from any extension page
    fn on_setting_changed(&self, key: &str, listener: SettingChangedListener);
}
