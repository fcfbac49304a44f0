/// Cached settings persisted through browser storage
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::gateway::BrowserGateway;
use crate::settings::{Settings, SettingsPatch, SETTINGS_STORAGE_KEY, parse_valid_state};

/// In-memory settings backed by a single serialized storage entry
///
/// Reads and writes wait until the first `load()` finishes. The gate opens
/// whether or not loading succeeded, in which case readers see defaults.
pub struct SettingsStore {
    gateway: Rc<dyn BrowserGateway>,
    state: RefCell<Settings>,
    loaded: Shared<oneshot::Receiver<()>>,
    loaded_tx: RefCell<Option<oneshot::Sender<()>>>,
}

impl SettingsStore {
    pub fn new(gateway: Rc<dyn BrowserGateway>) -> Self {
        let (loaded_tx, loaded) = oneshot::channel();
        SettingsStore {
            gateway,
            state: RefCell::new(Settings::default()),
            loaded: loaded.shared(),
            loaded_tx: RefCell::new(Some(loaded_tx)),
        }
    }

    /// Read the persisted settings and merge their valid, migrated values
    pub async fn load(&self) -> Result<()> {
        let result = self.load_persisted().await;
        if let Some(loaded_tx) = self.loaded_tx.borrow_mut().take() {
            // Nobody waiting is fine
            let _ = loaded_tx.send(());
        }
        result
    }

    async fn load_persisted(&self) -> Result<()> {
        let Some(persisted) = self.gateway.get_setting(SETTINGS_STORAGE_KEY).await? else {
            debug!("No persisted settings, using defaults");
            return Ok(());
        };

        let valid = parse_valid_state(&persisted)?;
        self.state.borrow_mut().merge(valid)?;
        info!("Settings loaded: {:?}", self.state.borrow());
        Ok(())
    }

    /// Follow writes made by other stores, such as the options page
    pub fn watch(self: &Rc<Self>) {
        let store: Weak<SettingsStore> = Rc::downgrade(self);
        self.gateway.on_setting_changed(
            SETTINGS_STORAGE_KEY,
            Box::new(move |persisted: Option<String>| {
                let Some(store) = store.upgrade() else {
                    return;
                };
                if let Err(e) = store.refresh(persisted.as_deref()) {
                    warn!("Keeping current settings, changed value is unusable: {}", e);
                }
            }),
        );
    }

    /// Replace the cached settings with a newly persisted value
    ///
    /// A removed entry resets to defaults. An unusable value leaves the cache
    /// untouched.
    pub fn refresh(&self, persisted: Option<&str>) -> Result<()> {
        let mut settings = Settings::default();
        if let Some(persisted) = persisted {
            settings.merge(parse_valid_state(persisted)?)?;
        }
        debug!("Settings changed: {:?}", settings);
        *self.state.borrow_mut() = settings;
        Ok(())
    }

    pub async fn get_state(&self) -> Settings {
        self.wait_loaded().await;
        self.state.borrow().clone()
    }

    /// Merge `patch` into the cached settings, then persist the full state
    ///
    /// The in-memory change stays even if the write fails.
    pub async fn set_state(&self, patch: SettingsPatch) -> Result<Settings> {
        self.wait_loaded().await;

        let updated = {
            let mut state = self.state.borrow_mut();
            state.apply(patch);
            state.clone()
        };

        let serialized =
            serde_json::to_string(&updated).map_err(|e| Error::Storage(e.to_string()))?;
        self.gateway
            .set_setting(SETTINGS_STORAGE_KEY, &serialized)
            .await?;
        Ok(updated)
    }

    async fn wait_loaded(&self) {
        // A dropped sender means the store never loads; treat it as open
        let _ = self.loaded.clone().await;
    }
}
