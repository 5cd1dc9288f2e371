/// Capabilities the extension needs from the browser
///
/// Every workflow is written against these traits so it runs on the real
/// `chrome.*` bridge or on an in-memory browser in tests. Futures are not
/// `Send`; the extension lives on a single-threaded WASM event loop

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::RuleUpdate;
use crate::session::CompanionWindowState;
use crate::settings::{Settings, SettingsUpdate};
use crate::window_data::{CreateTab, CreateWindow, TabId, TabInfo, WindowBounds, WindowId, WindowInfo};

/// Failures reported by a host call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Rule engine error: {0}")]
    Rules(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Tab error: {0}")]
    Tab(String),

    #[error("Side panel error: {0}")]
    Panel(String),

    #[error("Context menu error: {0}")]
    Menu(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// The synchronized settings record
#[async_trait(?Send)]
pub trait SettingsStore {
    /// Read the full record; missing fields take their defaults
    async fn load_settings(&self) -> Result<Settings, HostError>;

    /// Write only the fields present in `update`
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), HostError>;
}

/// The device-local companion window record
#[async_trait(?Send)]
pub trait CompanionStore {
    async fn load_companion(&self) -> Result<CompanionWindowState, HostError>;

    async fn save_companion(&self, state: &CompanionWindowState) -> Result<(), HostError>;

    async fn clear_companion(&self) -> Result<(), HostError>;
}

/// The declarative header-rewrite engine
#[async_trait(?Send)]
pub trait RuleEngine {
    async fn installed_rule_ids(&self) -> Result<Vec<u32>, HostError>;

    /// Removals are applied before additions, in one host call
    async fn update_rules(&self, update: &RuleUpdate) -> Result<(), HostError>;
}

/// Window and tab queries and mutations
#[async_trait(?Send)]
pub trait WindowHost {
    /// `Ok(None)` when no window has that id
    async fn get_window(&self, id: WindowId) -> Result<Option<WindowInfo>, HostError>;

    async fn update_window(&self, id: WindowId, bounds: &WindowBounds) -> Result<(), HostError>;

    async fn create_window(&self, request: &CreateWindow) -> Result<WindowInfo, HostError>;

    async fn tabs_in_window(&self, id: WindowId) -> Result<Vec<TabInfo>, HostError>;

    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError>;

    async fn create_tab(&self, request: &CreateTab) -> Result<(), HostError>;
}

/// Messages to an already-open side panel
#[async_trait(?Send)]
pub trait PanelHost {
    async fn send_panel_message(&self, message: &PanelMessage) -> Result<(), HostError>;

    async fn sleep_ms(&self, millis: u32);
}

/// Context menu registration
#[async_trait(?Send)]
pub trait MenuHost {
    async fn create_menu_entry(&self, entry: &MenuEntry) -> Result<(), HostError>;
}

/// Cross-surface message understood by the side panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum PanelMessage {
    #[serde(rename = "loadUrl")]
    LoadUrl { url: String },
}

/// A context menu entry definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: String,
    pub title: String,
    pub contexts: Vec<String>,
}
