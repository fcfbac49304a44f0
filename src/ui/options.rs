/// Options page for Tab Sorter settings

use std::rc::Rc;

use patternfly_yew::prelude::{Alert, AlertType, Spinner};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::chrome::ChromeGateway;
use crate::settings::{DOMAIN_PLACEHOLDER, Settings, SettingsPatch, is_valid_title_format};
use crate::storage::SettingsStore;

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Idle,
    Error(String),
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let store = use_memo((), |_| SettingsStore::new(Rc::new(ChromeGateway::new())));
    let state = use_state(|| PageState::Loading);
    let settings = use_state(|| None::<Settings>);

    // Load settings on mount
    {
        let store = store.clone();
        let state = state.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let result = store.load().await;
                settings.set(Some(store.get_state().await));
                match result {
                    Ok(()) => state.set(PageState::Idle),
                    Err(e) => state.set(PageState::Error(format!("Failed to load: {}", e))),
                }
            });
            || ()
        });
    }

    // Persist a patch and show what is now in effect
    let save = {
        let store = store.clone();
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |patch: SettingsPatch| {
            let store = store.clone();
            let state = state.clone();
            let settings = settings.clone();

            spawn_local(async move {
                match store.set_state(patch).await {
                    Ok(saved) => {
                        settings.set(Some(saved));
                        state.set(PageState::Idle);
                    }
                    Err(e) => {
                        settings.set(Some(store.get_state().await));
                        state.set(PageState::Error(format!("Failed to save: {}", e)));
                    }
                }
            });
        })
    };

    let on_toggle = |make_patch: fn(bool) -> SettingsPatch| {
        let save = save.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            save.emit(make_patch(input.checked()));
        })
    };

    let on_title_change = {
        let save = save.clone();
        let state = state.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if !is_valid_title_format(&input.value()) {
                state.set(PageState::Error(format!(
                    "Group title must contain {}",
                    DOMAIN_PLACEHOLDER
                )));
                return;
            }
            save.emit(SettingsPatch {
                group_title_format: Some(input.value()),
                ..SettingsPatch::default()
            });
        })
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Sorter"}</h1>

            {match &*state {
                PageState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PageState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                PageState::Idle => html! {}
            }}

            if let Some(current) = (*settings).clone() {
                <div class="flex-column-gap">
                    <label class="option-row">
                        <input
                            type="checkbox"
                            checked={current.enable_alphabetic_sorting}
                            onchange={on_toggle(|enabled| SettingsPatch {
                                enable_alphabetic_sorting: Some(enabled),
                                ..SettingsPatch::default()
                            })}
                        />
                        {" Sort tabs automatically when they load or close"}
                    </label>
                    <label class="option-row">
                        <input
                            type="checkbox"
                            checked={current.enable_tab_grouping}
                            onchange={on_toggle(|enabled| SettingsPatch {
                                enable_tab_grouping: Some(enabled),
                                ..SettingsPatch::default()
                            })}
                        />
                        {" Group tabs from the same domain"}
                    </label>
                    <label class="option-row">
                        {"Group title "}
                        <input
                            type="text"
                            value={current.group_title_format.clone()}
                            onchange={on_title_change}
                        />
                    </label>
                </div>
            }

            <p class="footer-popup">
                {"Tab Sorter v0.1.0"}
            </p>
        </div>
    }
}
