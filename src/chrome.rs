/// `chrome.*` implementation of the host traits, through the `extension.js` bridge

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::host::{
    CompanionStore, HostError, MenuEntry, MenuHost, PanelHost, PanelMessage, RuleEngine,
    SettingsStore, WindowHost,
};
use crate::rules::RuleUpdate;
use crate::session::CompanionWindowState;
use crate::settings::{Settings, SettingsChange, SettingsUpdate};
use crate::window_data::{CreateTab, CreateWindow, TabId, TabInfo, WindowBounds, WindowId, WindowInfo};

const COMPANION_KEY: &str = "secondaryWindowId";

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncSettings() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncSettings(values: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getLocal(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setLocal(values: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeLocal(key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getDynamicRuleIds() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateDynamicRules(options: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getWindow(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateWindow(window_id: i32, info: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createWindow(info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryWindowTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTabUrl(tab_id: i32, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(props: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createContextMenu(props: JsValue) -> Result<(), JsValue>;

    fn getUiLanguage() -> String;

    fn addStorageListener(callback: &js_sys::Function) -> JsValue;

    fn removeStorageListener(listener: &JsValue);

    fn addMessageListener(callback: &js_sys::Function) -> JsValue;

    fn removeMessageListener(listener: &JsValue);
}

/// The browser's display language, e.g. "zh-TW"
pub fn ui_language() -> String {
    getUiLanguage()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, HostError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| HostError::Serialization(format!("Failed to serialize: {:?}", e)))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError::Serialization(format!("Failed to parse: {:?}", e)))
}

fn js_error(kind: fn(String) -> HostError) -> impl Fn(JsValue) -> HostError {
    move |e| kind(format!("{:?}", e))
}

/// Host backed by the real browser APIs
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

#[async_trait(?Send)]
impl SettingsStore for ChromeHost {
    async fn load_settings(&self) -> Result<Settings, HostError> {
        let values = getSyncSettings().await.map_err(js_error(HostError::Storage))?;
        if values.is_null() || values.is_undefined() {
            return Ok(Settings::new());
        }
        from_js(values)
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), HostError> {
        if update.is_empty() {
            return Ok(());
        }
        setSyncSettings(to_js(update)?)
            .await
            .map_err(js_error(HostError::Storage))
    }
}

#[async_trait(?Send)]
impl CompanionStore for ChromeHost {
    async fn load_companion(&self) -> Result<CompanionWindowState, HostError> {
        let values = getLocal(COMPANION_KEY).await.map_err(js_error(HostError::Storage))?;
        if values.is_null() || values.is_undefined() {
            return Ok(CompanionWindowState::default());
        }
        from_js(values)
    }

    async fn save_companion(&self, state: &CompanionWindowState) -> Result<(), HostError> {
        setLocal(to_js(state)?)
            .await
            .map_err(js_error(HostError::Storage))
    }

    async fn clear_companion(&self) -> Result<(), HostError> {
        removeLocal(COMPANION_KEY)
            .await
            .map_err(js_error(HostError::Storage))
    }
}

#[async_trait(?Send)]
impl RuleEngine for ChromeHost {
    async fn installed_rule_ids(&self) -> Result<Vec<u32>, HostError> {
        let ids = getDynamicRuleIds().await.map_err(js_error(HostError::Rules))?;
        from_js(ids)
    }

    async fn update_rules(&self, update: &RuleUpdate) -> Result<(), HostError> {
        updateDynamicRules(to_js(update)?)
            .await
            .map_err(js_error(HostError::Rules))
    }
}

#[async_trait(?Send)]
impl WindowHost for ChromeHost {
    async fn get_window(&self, id: WindowId) -> Result<Option<WindowInfo>, HostError> {
        let window = getWindow(id).await.map_err(js_error(HostError::Window))?;
        if window.is_null() || window.is_undefined() {
            return Ok(None);
        }
        from_js(window).map(Some)
    }

    async fn update_window(&self, id: WindowId, bounds: &WindowBounds) -> Result<(), HostError> {
        updateWindow(id, to_js(bounds)?)
            .await
            .map_err(js_error(HostError::Window))
    }

    async fn create_window(&self, request: &CreateWindow) -> Result<WindowInfo, HostError> {
        let window = createWindow(to_js(request)?)
            .await
            .map_err(js_error(HostError::Window))?;
        from_js(window)
    }

    async fn tabs_in_window(&self, id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        let tabs = queryWindowTabs(id).await.map_err(js_error(HostError::Tab))?;
        from_js(tabs)
    }

    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        updateTabUrl(tab_id, url)
            .await
            .map_err(js_error(HostError::Tab))
    }

    async fn create_tab(&self, request: &CreateTab) -> Result<(), HostError> {
        createTab(to_js(request)?)
            .await
            .map_err(js_error(HostError::Tab))
    }
}

#[async_trait(?Send)]
impl PanelHost for ChromeHost {
    async fn send_panel_message(&self, message: &PanelMessage) -> Result<(), HostError> {
        sendRuntimeMessage(to_js(message)?)
            .await
            .map_err(js_error(HostError::Panel))
    }

    async fn sleep_ms(&self, millis: u32) {
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}

#[async_trait(?Send)]
impl MenuHost for ChromeHost {
    async fn create_menu_entry(&self, entry: &MenuEntry) -> Result<(), HostError> {
        createContextMenu(to_js(entry)?)
            .await
            .map_err(js_error(HostError::Menu))
    }
}

/// A registered browser event listener, removed on drop
pub struct Listener {
    handle: JsValue,
    remove: fn(&JsValue),
    _callback: Closure<dyn Fn(JsValue, JsValue)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        (self.remove)(&self.handle);
    }
}

impl ChromeHost {
    /// Call `on_change(area, change)` for every settings store write
    pub fn subscribe_settings(on_change: impl Fn(String, SettingsChange) + 'static) -> Listener {
        let callback = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
            let area = area.as_string().unwrap_or_default();
            let parsed = serde_wasm_bindgen::from_value::<serde_json::Value>(changes)
                .map_err(|e| e.to_string())
                .and_then(|changes| SettingsChange::from_changes(changes).map_err(|e| e.to_string()));

            match parsed {
                Ok(change) => on_change(area, change),
                Err(e) => log::warn!("Ignoring unreadable settings change: {}", e),
            }
        }) as Box<dyn Fn(JsValue, JsValue)>);

        let handle = addStorageListener(callback.as_ref().unchecked_ref());
        Listener {
            handle,
            remove: removeStorageListener,
            _callback: callback,
        }
    }

    /// Call `on_message` for every panel message sent by the extension
    pub fn subscribe_panel_messages(on_message: impl Fn(PanelMessage) + 'static) -> Listener {
        let callback = Closure::wrap(Box::new(move |message: JsValue, _sender: JsValue| {
            if let Ok(message) = serde_wasm_bindgen::from_value::<PanelMessage>(message) {
                on_message(message);
            }
        }) as Box<dyn Fn(JsValue, JsValue)>);

        let handle = addMessageListener(callback.as_ref().unchecked_ref());
        Listener {
            handle,
            remove: removeMessageListener,
            _callback: callback,
        }
    }
}
