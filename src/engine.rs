/// Tab organizer: the organize pass and the browser event loop
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::{debug, error, info, warn};

use crate::domain::extract_domain;
use crate::error::{Error, Result};
use crate::gateway::{BrowserEvent, BrowserGateway, GroupTabsRequest, GroupUpdate};
use crate::operations::{Bucket, cluster_tabs, color_for, sort_tabs_by_domain};
use crate::storage::SettingsStore;
use crate::tab_data::{GroupColor, GroupId, TabGroup, TabId, WindowId};
use crate::tracker::GroupByTabId;

/// A native group rendered by an organize pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedGroup {
    pub group_id: GroupId,
    pub window_id: WindowId,
    pub title: String,
    pub color: Option<GroupColor>,
    pub collapsed: bool,
    pub tab_ids: Vec<TabId>,
}

/// Outcome of one organize pass, including every command that failed
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub moved: usize,
    pub groups: Vec<RenderedGroup>,
    pub ungrouped: Vec<TabId>,
    pub grouping_skipped: bool,
    pub failures: Vec<Error>,
}

impl OrganizeReport {
    fn fail(&mut self, error: Error) {
        warn!("Organize step failed: {}", error);
        self.failures.push(error);
    }
}

pub struct Organizer {
    gateway: Rc<dyn BrowserGateway>,
    settings: Rc<SettingsStore>,
    tracker: GroupByTabId,
}

impl Organizer {
    pub fn new(gateway: Rc<dyn BrowserGateway>, settings: Rc<SettingsStore>) -> Self {
        Organizer {
            gateway,
            settings,
            tracker: GroupByTabId::new(),
        }
    }

    pub fn tracker(&self) -> &GroupByTabId {
        &self.tracker
    }

    /// Subscribe once to each browser signal, delivering them as messages
    pub fn connect(&self) -> UnboundedReceiver<BrowserEvent> {
        let (events, receiver) = mpsc::unbounded();

        let sender = events.clone();
        self.gateway
            .on_icon_clicked(Box::new(move || deliver(&sender, BrowserEvent::IconClicked)));

        let sender = events.clone();
        self.gateway.on_tab_updated(Box::new(move |tab_id, change| {
            deliver(&sender, BrowserEvent::TabUpdated { tab_id, change })
        }));

        self.gateway.on_tab_removed(Box::new(move |tab_id| {
            deliver(&events, BrowserEvent::TabRemoved { tab_id })
        }));

        receiver
    }

    /// Handle events in delivery order until every sender is gone
    ///
    /// Events that queue up while a pass runs are folded into a single
    /// follow-up pass, so passes never overlap.
    pub async fn run(&mut self, mut events: UnboundedReceiver<BrowserEvent>) {
        while let Some(event) = events.next().await {
            let mut wanted = self.handle_event(event).await;
            while let Ok(Some(event)) = events.try_next() {
                wanted |= self.handle_event(event).await;
            }

            if wanted {
                self.run_pass().await;
            }
        }
        debug!("Browser event stream closed");
    }

    /// Update tab tracking for `event`; true if it calls for an organize pass
    pub async fn handle_event(&mut self, event: BrowserEvent) -> bool {
        match event {
            BrowserEvent::IconClicked => {
                debug!("Icon clicked");
                true
            }
            BrowserEvent::TabUpdated { tab_id, change } => {
                let Some(url) = change.navigation_url() else {
                    return false;
                };

                let domain = extract_domain(url);
                if !self.tracker.record(tab_id, domain) {
                    debug!("Tab {} stayed on the same domain", tab_id);
                    return false;
                }
                self.settings.get_state().await.enable_alphabetic_sorting
            }
            BrowserEvent::TabRemoved { tab_id } => {
                self.tracker.forget(tab_id);
                self.settings.get_state().await.enable_alphabetic_sorting
            }
        }
    }

    async fn run_pass(&self) {
        match self.organize().await {
            Ok(report) if report.failures.is_empty() => {}
            Ok(report) => warn!(
                "Organize pass finished with {} failed steps",
                report.failures.len()
            ),
            Err(e) => error!("Organize pass failed: {}", e),
        }
    }

    /// Sort every tab by domain, then cluster same-domain tabs into groups
    pub async fn organize(&self) -> Result<OrganizeReport> {
        let tabs = self.gateway.query_all_tabs().await?;
        let sorted = sort_tabs_by_domain(tabs);
        let mut report = OrganizeReport::default();

        for entry in &sorted {
            let moved = match entry.tab.require_id() {
                Ok(tab_id) => self.gateway.move_tab_to_end(tab_id).await,
                Err(e) => Err(e),
            };
            match moved {
                Ok(()) => report.moved += 1,
                Err(e) => report.fail(e),
            }
        }

        let settings = self.settings.get_state().await;
        if !self.gateway.capabilities().grouping || !settings.enable_tab_grouping {
            debug!("Grouping unavailable or disabled, sorted only");
            report.grouping_skipped = true;
            info!("Sorted {} tabs", report.moved);
            return Ok(report);
        }

        let plan = cluster_tabs(&sorted);
        let palette = self.gateway.color_palette();

        for (index, bucket) in plan.real.iter().enumerate() {
            let title = settings.group_title(&bucket.key.domain, bucket.tab_ids.len());
            let color = color_for(index, &palette);
            match self.render_group(bucket, title, color).await {
                Ok(group) => report.groups.push(group),
                Err(e) => report.fail(e),
            }
        }

        for bucket in plan.orphans.iter().filter(|b| !b.grouped_tab_ids.is_empty()) {
            match self.gateway.ungroup_tabs(&bucket.grouped_tab_ids).await {
                Ok(()) => report.ungrouped.extend_from_slice(&bucket.grouped_tab_ids),
                Err(e) => report.fail(e),
            }
        }

        info!(
            "Sorted {} tabs into {} groups, released {} tabs",
            report.moved,
            report.groups.len(),
            report.ungrouped.len()
        );
        Ok(report)
    }

    async fn render_group(
        &self,
        bucket: &Bucket,
        title: String,
        color: Option<GroupColor>,
    ) -> Result<RenderedGroup> {
        let window_id = bucket.key.window_id;
        let existing = self.find_group(window_id, &title).await?;
        let collapsed = existing.as_ref().is_some_and(|group| group.collapsed);

        let request = GroupTabsRequest {
            tab_ids: bucket.tab_ids.clone(),
            window_id,
            group_id: existing.map(|group| group.id),
        };
        let group_id = self.gateway.group_tabs(&request).await?;

        let update = GroupUpdate {
            title: title.clone(),
            color,
            collapsed,
        };
        self.gateway.update_group(group_id, &update).await?;

        Ok(RenderedGroup {
            group_id,
            window_id,
            title,
            color,
            collapsed,
            tab_ids: request.tab_ids,
        })
    }

    /// Group in `window_id` titled exactly `title`
    ///
    /// The native query matches titles as patterns; only exact matches count.
    async fn find_group(&self, window_id: WindowId, title: &str) -> Result<Option<TabGroup>> {
        let candidates = self.gateway.query_groups(window_id, title).await?;
        Ok(candidates
            .into_iter()
            .find(|group| group.title.as_deref() == Some(title)))
    }
}

fn deliver(sender: &UnboundedSender<BrowserEvent>, event: BrowserEvent) {
    if sender.unbounded_send(event).is_err() {
        warn!("Organizer stopped, dropping browser event");
    }
}
