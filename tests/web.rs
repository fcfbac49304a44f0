//! Browser tests for the exported entry points; run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use tab_sorter::settings::{Settings, parse_valid_state};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_extract_domain_export() {
    assert_eq!(tab_sorter::extract_domain("https://news.bbc.co.uk/sport"), "bbc.co.uk");
    assert_eq!(tab_sorter::extract_domain("chrome://newtab/"), "new");
}

#[wasm_bindgen_test]
fn test_settings_migration_in_wasm() {
    let mut settings = Settings::default();
    settings
        .merge(parse_valid_state(r#"{"enableAutomaticSorting": false}"#).unwrap())
        .unwrap();

    assert!(!settings.enable_alphabetic_sorting);
}
