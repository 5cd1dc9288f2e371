/// UI surfaces: the settings popup and the side panel
pub mod components;
pub mod popup;
pub mod side_panel;

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::chrome::ChromeHost;
use crate::host::SettingsStore;
use crate::settings::{SYNC_AREA, Settings, SettingsUpdate};

/// Settings as shown by one surface
#[derive(Clone, PartialEq)]
pub enum SettingsState {
    Loading,
    Ready(Settings),
    Error(String),
}

pub enum SettingsAction {
    Loaded(Settings),
    Failed(String),
    /// A write made here or on another surface
    Apply(SettingsUpdate),
}

impl Reducible for SettingsState {
    type Action = SettingsAction;

    fn reduce(self: Rc<Self>, action: SettingsAction) -> Rc<Self> {
        match action {
            SettingsAction::Loaded(settings) => Rc::new(SettingsState::Ready(settings)),
            SettingsAction::Failed(e) => Rc::new(SettingsState::Error(e)),
            SettingsAction::Apply(update) => match &*self {
                SettingsState::Ready(settings) => {
                    let mut settings = settings.clone();
                    settings.apply(&update);
                    Rc::new(SettingsState::Ready(settings))
                }
                // The pending load will read the write
                _ => self,
            },
        }
    }
}

/// Load the settings once and follow every later write to the sync area
#[hook]
pub fn use_synced_settings() -> UseReducerHandle<SettingsState> {
    let state = use_reducer(|| SettingsState::Loading);

    {
        let state = state.clone();
        use_effect_with((), move |_| {
            let loader = state.clone();
            spawn_local(async move {
                match ChromeHost.load_settings().await {
                    Ok(settings) => loader.dispatch(SettingsAction::Loaded(settings)),
                    Err(e) => loader.dispatch(SettingsAction::Failed(format!("Failed to load: {}", e))),
                }
            });

            let listener = ChromeHost::subscribe_settings(move |area, change| {
                if area == SYNC_AREA {
                    state.dispatch(SettingsAction::Apply(change.update));
                }
            });

            move || drop(listener)
        });
    }

    state
}

/// Show `update` right away and write it to the sync area
///
/// `on_saved` gets the outcome once the write settles.
pub fn save_settings(
    state: &UseReducerHandle<SettingsState>,
    update: SettingsUpdate,
    on_saved: Callback<Result<(), String>>,
) {
    state.dispatch(SettingsAction::Apply(update.clone()));

    spawn_local(async move {
        let result = ChromeHost
            .update_settings(&update)
            .await
            .map_err(|e| format!("Failed to save: {}", e));
        on_saved.emit(result);
    });
}
