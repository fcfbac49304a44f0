/// `BrowserGateway` over the chrome.* extension APIs
use async_trait::async_trait;
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::{Error, Result};
use crate::gateway::{
    BrowserGateway, Capabilities, GroupTabsRequest, GroupUpdate, IconClickedListener,
    SettingChangedListener, TabRemovedListener, TabUpdatedListener,
};
use crate::tab_data::{GroupColor, GroupId, Tab, TabChangeInfo, TabGroup, TabId, WindowId};

// Import JS bridge functions
#[wasm_bindgen(module = "/browser.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryAllTabs() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTabToEnd(tab_id: i32) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(request: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, update: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups(window_id: i32, title: &str) -> std::result::Result<JsValue, JsValue>;

    fn groupColors() -> JsValue;

    fn hasGroupingSupport() -> bool;

    fn addIconClickedListener(listener: &Closure<dyn Fn()>);

    fn addTabUpdatedListener(listener: &Closure<dyn Fn(i32, JsValue)>);

    fn addTabRemovedListener(listener: &Closure<dyn Fn(i32)>);

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: &str) -> std::result::Result<(), JsValue>;

    fn addStorageChangedListener(key: &str, listener: &Closure<dyn Fn(JsValue)>);
}

#[derive(Debug, Default)]
pub struct ChromeGateway;

impl ChromeGateway {
    pub fn new() -> Self {
        ChromeGateway
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn native_error(value: JsValue) -> Error {
    Error::NativeApi(js_message(&value))
}

fn storage_error(value: JsValue) -> Error {
    Error::Storage(js_message(&value))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| Error::NativeApi(format!("Failed to serialize: {}", e)))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| Error::NativeApi(format!("Failed to parse: {}", e)))
}

#[async_trait(?Send)]
impl BrowserGateway for ChromeGateway {
    async fn query_all_tabs(&self) -> Result<Vec<Tab>> {
        let tabs = queryAllTabs().await.map_err(native_error)?;
        from_js(tabs)
    }

    async fn move_tab_to_end(&self, tab_id: TabId) -> Result<()> {
        moveTabToEnd(tab_id).await.map_err(native_error)
    }

    async fn group_tabs(&self, request: &GroupTabsRequest) -> Result<GroupId> {
        let group_id = groupTabs(to_js(request)?).await.map_err(native_error)?;
        from_js(group_id)
    }

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<()> {
        ungroupTabs(to_js(&tab_ids)?).await.map_err(native_error)
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<()> {
        updateGroup(group_id, to_js(update)?)
            .await
            .map_err(native_error)
    }

    async fn query_groups(&self, window_id: WindowId, title: &str) -> Result<Vec<TabGroup>> {
        let groups = queryGroups(window_id, title).await.map_err(native_error)?;
        from_js(groups)
    }

    fn color_palette(&self) -> Vec<GroupColor> {
        // Colors this build does not know about are skipped
        let colors: Vec<String> =
            serde_wasm_bindgen::from_value(groupColors()).unwrap_or_default();
        colors
            .into_iter()
            .filter_map(|color| serde_json::from_value(serde_json::Value::String(color)).ok())
            .collect()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            grouping: hasGroupingSupport(),
        }
    }

    fn on_icon_clicked(&self, listener: IconClickedListener) {
        let closure = Closure::wrap(listener);
        addIconClickedListener(&closure);
        // Listeners live as long as the extension
        closure.forget();
    }

    fn on_tab_updated(&self, listener: TabUpdatedListener) {
        let closure = Closure::wrap(Box::new(move |tab_id: i32, change: JsValue| {
            match serde_wasm_bindgen::from_value::<TabChangeInfo>(change) {
                Ok(change) => listener(tab_id, change),
                Err(e) => warn!("Ignoring update of tab {}: {:?}", tab_id, e),
            }
        }) as Box<dyn Fn(i32, JsValue)>);
        addTabUpdatedListener(&closure);
        closure.forget();
    }

    fn on_tab_removed(&self, listener: TabRemovedListener) {
        let closure = Closure::wrap(listener);
        addTabRemovedListener(&closure);
        closure.forget();
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = getStorage(key).await.map_err(storage_error)?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        value.as_string().map(Some).ok_or_else(|| {
            Error::InvalidStorageFormat(format!("expected serialized settings, found {:?}", value))
        })
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        setStorage(key, value).await.map_err(storage_error)
    }

    fn on_setting_changed(&self, key: &str, listener: SettingChangedListener) {
        let closure = Closure::wrap(Box::new(move |value: JsValue| {
            if value.is_null() || value.is_undefined() {
                listener(None);
            } else if let Some(serialized) = value.as_string() {
                listener(Some(serialized));
            } else {
                warn!("Ignoring settings change that is not serialized: {:?}", value);
            }
        }) as Box<dyn Fn(JsValue)>);
        addStorageChangedListener(key, &closure);
        closure.forget();
    }
}
