/// In-memory browser used by unit tests
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::gateway::{
    BrowserGateway, Capabilities, GroupTabsRequest, GroupUpdate, IconClickedListener,
    SettingChangedListener, TabRemovedListener, TabUpdatedListener,
};
use crate::tab_data::{GroupColor, GroupId, Tab, TabChangeInfo, TabGroup, TabId, WindowId};

/// Native command issued through the gateway, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    QueryTabs,
    Move(TabId),
    Group(GroupTabsRequest),
    Ungroup(Vec<TabId>),
    Update(GroupId, GroupUpdate),
}

pub struct FakeGateway {
    pub tabs: RefCell<Vec<Tab>>,
    pub groups: RefCell<Vec<TabGroup>>,
    pub commands: RefCell<Vec<Command>>,
    pub storage: RefCell<HashMap<String, String>>,
    pub grouping: Cell<bool>,
    /// Return every group in the window from a title query, like a loose pattern match
    pub loose_title_match: Cell<bool>,
    pub failing_moves: RefCell<Vec<TabId>>,
    pub fail_storage_reads: Cell<bool>,
    pub fail_storage_writes: Cell<bool>,
    pub tab_queries: Cell<usize>,
    /// Runs inside every tab query with the query count so far
    pub on_tab_query: RefCell<Option<Box<dyn FnMut(usize)>>>,
    next_group_id: Cell<GroupId>,
    icon_clicked: RefCell<Vec<IconClickedListener>>,
    tab_updated: RefCell<Vec<TabUpdatedListener>>,
    tab_removed: RefCell<Vec<TabRemovedListener>>,
    setting_changed: RefCell<Vec<(String, SettingChangedListener)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        FakeGateway::with_tabs(Vec::new())
    }

    pub fn with_tabs(tabs: Vec<Tab>) -> Self {
        FakeGateway {
            tabs: RefCell::new(tabs),
            groups: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
            storage: RefCell::new(HashMap::new()),
            grouping: Cell::new(true),
            loose_title_match: Cell::new(false),
            failing_moves: RefCell::new(Vec::new()),
            fail_storage_reads: Cell::new(false),
            fail_storage_writes: Cell::new(false),
            tab_queries: Cell::new(0),
            on_tab_query: RefCell::new(None),
            next_group_id: Cell::new(100),
            icon_clicked: RefCell::new(Vec::new()),
            tab_updated: RefCell::new(Vec::new()),
            tab_removed: RefCell::new(Vec::new()),
            setting_changed: RefCell::new(Vec::new()),
        }
    }

    pub fn add_group(&self, window_id: WindowId, title: &str, collapsed: bool) -> GroupId {
        let id = self.allocate_group_id();
        self.groups.borrow_mut().push(TabGroup {
            id,
            window_id,
            title: Some(title.to_string()),
            collapsed,
            color: None,
        });
        id
    }

    /// Tab ids of a window in their current order
    pub fn window_order(&self, window_id: WindowId) -> Vec<TabId> {
        self.tabs
            .borrow()
            .iter()
            .filter(|tab| tab.window_id == window_id)
            .filter_map(|tab| tab.id)
            .collect()
    }

    pub fn group_of(&self, tab_id: TabId) -> Option<GroupId> {
        self.tabs
            .borrow()
            .iter()
            .find(|tab| tab.id == Some(tab_id))
            .and_then(|tab| tab.group_id)
    }

    pub fn group(&self, group_id: GroupId) -> Option<TabGroup> {
        self.groups.borrow().iter().find(|g| g.id == group_id).cloned()
    }

    pub fn listener_counts(&self) -> (usize, usize, usize) {
        (
            self.icon_clicked.borrow().len(),
            self.tab_updated.borrow().len(),
            self.tab_removed.borrow().len(),
        )
    }

    pub fn setting_listener_count(&self) -> usize {
        self.setting_changed.borrow().len()
    }

    pub fn click_icon(&self) {
        for listener in self.icon_clicked.borrow().iter() {
            listener();
        }
    }

    pub fn update_tab(&self, tab_id: TabId, change: TabChangeInfo) {
        for listener in self.tab_updated.borrow().iter() {
            listener(tab_id, change.clone());
        }
    }

    pub fn remove_tab(&self, tab_id: TabId) {
        self.tabs.borrow_mut().retain(|tab| tab.id != Some(tab_id));
        for listener in self.tab_removed.borrow().iter() {
            listener(tab_id);
        }
    }

    fn allocate_group_id(&self) -> GroupId {
        let id = self.next_group_id.get();
        self.next_group_id.set(id + 1);
        id
    }

    fn no_tab(tab_id: TabId) -> Error {
        Error::NativeApi(format!("No tab with id: {}.", tab_id))
    }
}

#[async_trait(?Send)]
impl BrowserGateway for FakeGateway {
    async fn query_all_tabs(&self) -> Result<Vec<Tab>> {
        let queries = self.tab_queries.get() + 1;
        self.tab_queries.set(queries);
        self.commands.borrow_mut().push(Command::QueryTabs);
        if let Some(hook) = self.on_tab_query.borrow_mut().as_mut() {
            hook(queries);
        }
        Ok(self.tabs.borrow().clone())
    }

    async fn move_tab_to_end(&self, tab_id: TabId) -> Result<()> {
        self.commands.borrow_mut().push(Command::Move(tab_id));
        if self.failing_moves.borrow().contains(&tab_id) {
            return Err(FakeGateway::no_tab(tab_id));
        }

        let mut tabs = self.tabs.borrow_mut();
        let position = tabs
            .iter()
            .position(|tab| tab.id == Some(tab_id))
            .ok_or_else(|| FakeGateway::no_tab(tab_id))?;
        let tab = tabs.remove(position);
        tabs.push(tab);
        Ok(())
    }

    async fn group_tabs(&self, request: &GroupTabsRequest) -> Result<GroupId> {
        self.commands.borrow_mut().push(Command::Group(request.clone()));

        let group_id = match request.group_id {
            Some(existing) => existing,
            None => {
                let id = self.allocate_group_id();
                self.groups.borrow_mut().push(TabGroup {
                    id,
                    window_id: request.window_id,
                    title: None,
                    collapsed: false,
                    color: None,
                });
                id
            }
        };

        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab.id.is_some_and(|id| request.tab_ids.contains(&id)) {
                tab.group_id = Some(group_id);
            }
        }
        Ok(group_id)
    }

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<()> {
        self.commands.borrow_mut().push(Command::Ungroup(tab_ids.to_vec()));
        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab.id.is_some_and(|id| tab_ids.contains(&id)) {
                tab.group_id = None;
            }
        }
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<()> {
        self.commands
            .borrow_mut()
            .push(Command::Update(group_id, update.clone()));

        let mut groups = self.groups.borrow_mut();
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| Error::NativeApi(format!("No group with id: {}.", group_id)))?;
        group.title = Some(update.title.clone());
        group.color = update.color;
        group.collapsed = update.collapsed;
        Ok(())
    }

    async fn query_groups(&self, window_id: WindowId, title: &str) -> Result<Vec<TabGroup>> {
        let loose = self.loose_title_match.get();
        Ok(self
            .groups
            .borrow()
            .iter()
            .filter(|g| g.window_id == window_id)
            .filter(|g| loose || g.title.as_deref() == Some(title))
            .cloned()
            .collect())
    }

    fn color_palette(&self) -> Vec<GroupColor> {
        vec![
            GroupColor::Grey,
            GroupColor::Blue,
            GroupColor::Red,
            GroupColor::Yellow,
            GroupColor::Green,
            GroupColor::Pink,
            GroupColor::Purple,
            GroupColor::Cyan,
            GroupColor::Orange,
        ]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            grouping: self.grouping.get(),
        }
    }

    fn on_icon_clicked(&self, listener: IconClickedListener) {
        self.icon_clicked.borrow_mut().push(listener);
    }

    fn on_tab_updated(&self, listener: TabUpdatedListener) {
        self.tab_updated.borrow_mut().push(listener);
    }

    fn on_tab_removed(&self, listener: TabRemovedListener) {
        self.tab_removed.borrow_mut().push(listener);
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        if self.fail_storage_reads.get() {
            return Err(Error::Storage("storage.local is unavailable".to_string()));
        }
        Ok(self.storage.borrow().get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_storage_writes.get() {
            return Err(Error::Storage("QUOTA_BYTES quota exceeded".to_string()));
        }
        self.storage
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        // The browser reports writes to every page, the writer included
        for (watched, listener) in self.setting_changed.borrow().iter() {
            if watched == key {
                listener(Some(value.to_string()));
            }
        }
        Ok(())
    }

    fn on_setting_changed(&self, key: &str, listener: SettingChangedListener) {
        self.setting_changed
            .borrow_mut()
            .push((key.to_string(), listener));
    }
}
