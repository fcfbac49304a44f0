/// Tab Sorter - Chrome Extension that sorts and groups tabs by domain
/// Built with Rust + WASM + Yew

pub mod chrome;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod operations;
pub mod settings;
pub mod storage;
pub mod tab_data;
pub mod tracker;
pub mod ui;

#[cfg(test)]
mod testing;

use std::rc::Rc;

use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::ChromeGateway;
use crate::engine::Organizer;
use crate::gateway::BrowserGateway;
use crate::storage::SettingsStore;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export domain resolution for JavaScript access
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> String {
    domain::extract_domain(url)
}

// Start the background organizer. Listeners are registered before returning.
#[wasm_bindgen]
pub fn start_background() {
    let gateway: Rc<dyn BrowserGateway> = Rc::new(ChromeGateway::new());
    let settings = Rc::new(SettingsStore::new(gateway.clone()));
    settings.watch();
    let mut organizer = Organizer::new(gateway, settings.clone());
    let events = organizer.connect();

    spawn_local(async move {
        if let Err(e) = settings.load().await {
            error!("Failed to load settings: {}", e);
        }
    });

    spawn_local(async move {
        organizer.run(events).await;
    });
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}
