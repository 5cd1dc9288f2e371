/// Split View Search - open selected text beside the current window
/// Built with Rust + WASM + Yew

mod background;
mod chrome;
mod dispatch;
mod domain;
mod host;
mod providers;
mod rules;
mod session;
mod settings;
mod split;
mod sync;
mod window_data;
pub mod ui;

#[cfg(test)]
mod testing;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::chrome::ChromeHost;
use crate::dispatch::MenuClick;
use crate::window_data::WindowId;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export core domain functions for JavaScript access
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> Option<String> {
    domain::extract_domain(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the side panel
#[wasm_bindgen]
pub fn start_side_panel() {
    yew::Renderer::<ui::side_panel::SidePanel>::new().render();
}

/// `chrome.runtime.onInstalled`
#[wasm_bindgen]
pub async fn handle_installed() {
    background::on_installed(&ChromeHost).await;
}

/// `chrome.storage.onChanged`
#[wasm_bindgen]
pub async fn handle_storage_changed(changes: JsValue, area: String) {
    let changes = match serde_wasm_bindgen::from_value::<serde_json::Value>(changes) {
        Ok(changes) => changes,
        Err(e) => {
            log::error!("Failed to read storage changes: {:?}", e);
            return;
        }
    };

    match settings::SettingsChange::from_changes(changes) {
        Ok(change) => background::on_settings_changed(&ChromeHost, &area, &change).await,
        Err(e) => log::error!("Failed to parse storage changes: {}", e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClickedTab {
    #[serde(default)]
    window_id: Option<WindowId>,
}

/// `chrome.contextMenus.onClicked`
#[wasm_bindgen]
pub async fn handle_menu_click(info: JsValue, tab: JsValue) {
    let click: MenuClick = match serde_wasm_bindgen::from_value(info) {
        Ok(click) => click,
        Err(e) => {
            log::error!("Failed to parse menu click: {:?}", e);
            return;
        }
    };

    // Tabs outside any window report a negative id
    let window_id = serde_wasm_bindgen::from_value::<Option<ClickedTab>>(tab)
        .ok()
        .flatten()
        .and_then(|tab| tab.window_id)
        .filter(|id| *id >= 0);

    background::on_menu_clicked(&ChromeHost, &click, window_id, &chrome::ui_language()).await;
}
