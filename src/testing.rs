/// In-memory browser used by the workflow tests

use std::cell::RefCell;
use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::host::{
    CompanionStore, HostError, MenuEntry, MenuHost, PanelHost, PanelMessage, RuleEngine,
    SettingsStore, WindowHost,
};
use crate::rules::{HeaderRule, RuleUpdate};
use crate::session::CompanionWindowState;
use crate::settings::{Settings, SettingsUpdate};
use crate::window_data::{
    CreateTab, CreateWindow, TabId, TabInfo, WindowBounds, WindowId, WindowInfo, WindowType,
};

#[derive(Default)]
struct Failures {
    settings: bool,
    rules: bool,
    window_lookup: bool,
    window_create: bool,
    panel_messages: bool,
}

#[derive(Default)]
struct State {
    next_id: i32,
    settings: Settings,
    companion: CompanionWindowState,
    rules: Vec<HeaderRule>,
    rule_updates: usize,
    windows: BTreeMap<WindowId, WindowInfo>,
    tabs: Vec<TabInfo>,
    created_window_types: Vec<WindowType>,
    opened_tabs: Vec<String>,
    slept_ms: Vec<u32>,
    panel_messages: Vec<PanelMessage>,
    menu_entries: Vec<MenuEntry>,
    failures: Failures,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    state: RefCell<State>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window with a fresh id; the id in `window` is ignored
    pub fn add_window(&self, window: WindowInfo) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.windows.insert(id, WindowInfo { id, ..window });
        id
    }

    pub fn close_window(&self, id: WindowId) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&id);
        state.tabs.retain(|tab| tab.window_id != id);
    }

    pub fn close_tabs(&self, window_id: WindowId) {
        self.state.borrow_mut().tabs.retain(|tab| tab.window_id != window_id);
    }

    pub fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.state.borrow().windows.get(&id).cloned()
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn tab_urls(&self, window_id: WindowId) -> Vec<String> {
        self.state
            .borrow()
            .tabs
            .iter()
            .filter(|tab| tab.window_id == window_id)
            .map(|tab| tab.url.clone())
            .collect()
    }

    pub fn set_settings(&self, settings: Settings) {
        self.state.borrow_mut().settings = settings;
    }

    pub fn apply_settings(&self, update: &SettingsUpdate) {
        self.state.borrow_mut().settings.apply(update);
    }

    pub fn companion(&self) -> CompanionWindowState {
        self.state.borrow().companion.clone()
    }

    pub fn installed_rules(&self) -> Vec<HeaderRule> {
        self.state.borrow().rules.clone()
    }

    pub fn rule_update_count(&self) -> usize {
        self.state.borrow().rule_updates
    }

    pub fn created_window_types(&self) -> Vec<WindowType> {
        self.state.borrow().created_window_types.clone()
    }

    /// URLs of tabs opened outside any particular window
    pub fn opened_tabs(&self) -> Vec<String> {
        self.state.borrow().opened_tabs.clone()
    }

    pub fn slept_ms(&self) -> Vec<u32> {
        self.state.borrow().slept_ms.clone()
    }

    pub fn panel_messages(&self) -> Vec<PanelMessage> {
        self.state.borrow().panel_messages.clone()
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.state.borrow().menu_entries.clone()
    }

    pub fn fail_settings(&self, fail: bool) {
        self.state.borrow_mut().failures.settings = fail;
    }

    pub fn fail_rules(&self, fail: bool) {
        self.state.borrow_mut().failures.rules = fail;
    }

    pub fn fail_window_lookup(&self, fail: bool) {
        self.state.borrow_mut().failures.window_lookup = fail;
    }

    pub fn fail_window_create(&self, fail: bool) {
        self.state.borrow_mut().failures.window_create = fail;
    }

    pub fn fail_panel_messages(&self, fail: bool) {
        self.state.borrow_mut().failures.panel_messages = fail;
    }
}

#[async_trait(?Send)]
impl SettingsStore for FakeBrowser {
    async fn load_settings(&self) -> Result<Settings, HostError> {
        let state = self.state.borrow();
        if state.failures.settings {
            return Err(HostError::Storage("sync storage unavailable".to_string()));
        }
        Ok(state.settings.clone())
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.failures.settings {
            return Err(HostError::Storage("sync storage unavailable".to_string()));
        }
        state.settings.apply(update);
        Ok(())
    }
}

#[async_trait(?Send)]
impl CompanionStore for FakeBrowser {
    async fn load_companion(&self) -> Result<CompanionWindowState, HostError> {
        Ok(self.state.borrow().companion.clone())
    }

    async fn save_companion(&self, companion: &CompanionWindowState) -> Result<(), HostError> {
        self.state.borrow_mut().companion = companion.clone();
        Ok(())
    }

    async fn clear_companion(&self) -> Result<(), HostError> {
        self.state.borrow_mut().companion = CompanionWindowState::default();
        Ok(())
    }
}

#[async_trait(?Send)]
impl RuleEngine for FakeBrowser {
    async fn installed_rule_ids(&self) -> Result<Vec<u32>, HostError> {
        let state = self.state.borrow();
        if state.failures.rules {
            return Err(HostError::Rules("rule engine unavailable".to_string()));
        }
        Ok(state.rules.iter().map(|rule| rule.id).collect())
    }

    async fn update_rules(&self, update: &RuleUpdate) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.failures.rules {
            return Err(HostError::Rules("rule engine unavailable".to_string()));
        }

        let mut rules: Vec<HeaderRule> = state
            .rules
            .iter()
            .filter(|rule| !update.remove_rule_ids.contains(&rule.id))
            .cloned()
            .collect();
        for rule in &update.add_rules {
            if rules.iter().any(|existing| existing.id == rule.id) {
                return Err(HostError::Rules(format!("Rule with id {} already exists", rule.id)));
            }
            rules.push(rule.clone());
        }

        state.rules = rules;
        state.rule_updates += 1;
        Ok(())
    }
}

#[async_trait(?Send)]
impl WindowHost for FakeBrowser {
    async fn get_window(&self, id: WindowId) -> Result<Option<WindowInfo>, HostError> {
        let state = self.state.borrow();
        if state.failures.window_lookup {
            return Err(HostError::Window(format!("No window with id: {}", id)));
        }
        Ok(state.windows.get(&id).cloned())
    }

    async fn update_window(&self, id: WindowId, bounds: &WindowBounds) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let window = state
            .windows
            .get_mut(&id)
            .ok_or_else(|| HostError::Window(format!("No window with id: {}", id)))?;

        if let Some(left) = bounds.left {
            window.left = left;
        }
        if let Some(top) = bounds.top {
            window.top = top;
        }
        if let Some(width) = bounds.width {
            window.width = width;
        }
        if let Some(height) = bounds.height {
            window.height = height;
        }
        Ok(())
    }

    async fn create_window(&self, request: &CreateWindow) -> Result<WindowInfo, HostError> {
        let mut state = self.state.borrow_mut();
        if state.failures.window_create {
            return Err(HostError::Window("window creation refused".to_string()));
        }

        let id = state.next_id();
        let window = WindowInfo::new(id, request.left, request.top, request.width, request.height);
        state.windows.insert(id, window.clone());
        state.created_window_types.push(request.kind);

        let tab_id = state.next_id();
        state.tabs.push(TabInfo {
            id: tab_id,
            window_id: id,
            url: request.url.clone(),
        });
        Ok(window)
    }

    async fn tabs_in_window(&self, id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        Ok(self
            .state
            .borrow()
            .tabs
            .iter()
            .filter(|tab| tab.window_id == id)
            .cloned()
            .collect())
    }

    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let tab = state
            .tabs
            .iter_mut()
            .find(|tab| tab.id == tab_id)
            .ok_or_else(|| HostError::Tab(format!("No tab with id: {}", tab_id)))?;
        tab.url = url.to_string();
        Ok(())
    }

    async fn create_tab(&self, request: &CreateTab) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        match request.window_id {
            Some(window_id) => {
                let id = state.next_id();
                state.tabs.push(TabInfo {
                    id,
                    window_id,
                    url: request.url.clone(),
                });
            }
            None => state.opened_tabs.push(request.url.clone()),
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PanelHost for FakeBrowser {
    async fn send_panel_message(&self, message: &PanelMessage) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.failures.panel_messages {
            return Err(HostError::Panel(
                "Could not establish connection. Receiving end does not exist.".to_string(),
            ));
        }
        state.panel_messages.push(message.clone());
        Ok(())
    }

    async fn sleep_ms(&self, millis: u32) {
        self.state.borrow_mut().slept_ms.push(millis);
    }
}

#[async_trait(?Send)]
impl MenuHost for FakeBrowser {
    async fn create_menu_entry(&self, entry: &MenuEntry) -> Result<(), HostError> {
        self.state.borrow_mut().menu_entries.push(entry.clone());
        Ok(())
    }
}
