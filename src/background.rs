/// Background event handlers: install, settings change and menu click
///
/// Each handler runs one event to completion, logs whatever went wrong and
/// returns normally; the next event starts from a fresh read.
use log::{debug, error};

use crate::dispatch::{MenuClick, open, plan_open, resolve_url};
use crate::host::{
    CompanionStore, HostError, MenuEntry, MenuHost, PanelHost, RuleEngine, SettingsStore, WindowHost,
};
use crate::settings::{SYNC_AREA, SettingsChange};
use crate::sync::sync_rules;
use crate::window_data::WindowId;

pub const MENU_ID: &str = "split-view-search";
pub const MENU_TITLE: &str = "Search in Split View";

pub fn menu_entry() -> MenuEntry {
    MenuEntry {
        id: MENU_ID.to_string(),
        title: MENU_TITLE.to_string(),
        contexts: vec!["selection".to_string()],
    }
}

/// Register the context menu and install the first rule set
pub async fn on_installed<H>(host: &H)
where
    H: MenuHost + SettingsStore + RuleEngine,
{
    if let Err(e) = host.create_menu_entry(&menu_entry()).await {
        error!("Failed to create context menu: {}", e);
    }
    refresh_rules(host).await;
}

/// React to a settings write from any surface
pub async fn on_settings_changed<H>(host: &H, area: &str, change: &SettingsChange)
where
    H: SettingsStore + RuleEngine,
{
    if area != SYNC_AREA || !change.touches_rules() {
        return;
    }
    refresh_rules(host).await;
}

async fn refresh_rules<H>(host: &H)
where
    H: SettingsStore + RuleEngine,
{
    if let Err(e) = sync_rules(host).await {
        error!("Error updating dynamic rules: {}", e);
    }
}

/// Route a context-menu selection to the configured destination
pub async fn on_menu_clicked<H>(host: &H, click: &MenuClick, window_id: Option<WindowId>, ui_language: &str)
where
    H: SettingsStore + CompanionStore + WindowHost + PanelHost,
{
    if let Err(e) = handle_menu_click(host, click, window_id, ui_language).await {
        error!("Failed to open selection: {}", e);
    }
}

async fn handle_menu_click<H>(
    host: &H,
    click: &MenuClick,
    window_id: Option<WindowId>,
    ui_language: &str,
) -> Result<(), HostError>
where
    H: SettingsStore + CompanionStore + WindowHost + PanelHost,
{
    if click.menu_item_id != MENU_ID {
        return Ok(());
    }
    let Some(selection) = click.selection_text.as_deref().filter(|text| !text.is_empty()) else {
        return Ok(());
    };

    let settings = host.load_settings().await?;
    let url = resolve_url(&settings, selection, ui_language);

    match plan_open(&settings, url, window_id) {
        Some(plan) => open(host, &plan).await,
        None => {
            debug!("No window for {:?} mode, ignoring click", settings.open_mode);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::PANEL_LOAD_DELAY_MS;
    use crate::host::PanelMessage;
    use crate::settings::{CustomSite, OpenMode, Settings, SettingsUpdate};
    use crate::testing::FakeBrowser;
    use crate::window_data::WindowInfo;
    use futures::executor::block_on;
    use serde_json::json;

    fn click(text: &str) -> MenuClick {
        MenuClick {
            menu_item_id: MENU_ID.to_string(),
            selection_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_on_installed_creates_menu_and_rules() {
        let browser = FakeBrowser::new();

        block_on(on_installed(&browser));

        assert_eq!(browser.menu_entries(), vec![menu_entry()]);
        assert_eq!(browser.installed_rules().len(), 7);
    }

    #[test]
    fn test_on_installed_survives_rule_failure() {
        let browser = FakeBrowser::new();
        browser.fail_rules(true);

        block_on(on_installed(&browser));

        assert_eq!(browser.menu_entries().len(), 1);
        assert!(browser.installed_rules().is_empty());
    }

    #[test]
    fn test_settings_change_resyncs_rules() {
        let browser = FakeBrowser::new();
        block_on(on_installed(&browser));
        let sites = vec![CustomSite {
            name: "Wiki".to_string(),
            url: "https://en.wikipedia.org/wiki/%s".to_string(),
        }];
        browser.set_settings(Settings {
            custom_sites: sites.clone(),
            ..Settings::default()
        });

        let change = SettingsChange::from_changes(json!({
            "customSites": {"oldValue": [], "newValue": sites}
        }))
        .unwrap();
        block_on(on_settings_changed(&browser, "sync", &change));

        assert_eq!(browser.installed_rules().len(), 8);
    }

    #[test]
    fn test_settings_change_ignores_other_keys_and_areas() {
        let browser = FakeBrowser::new();
        let ratio_only = SettingsChange::from_changes(json!({"splitRatio": {"newValue": 40}})).unwrap();
        let provider = SettingsChange::from_changes(json!({"serviceProvider": {"newValue": "x"}})).unwrap();

        block_on(on_settings_changed(&browser, "sync", &ratio_only));
        block_on(on_settings_changed(&browser, "local", &provider));

        assert_eq!(browser.rule_update_count(), 0);
    }

    #[test]
    fn test_menu_click_split_mode() {
        let browser = FakeBrowser::new();
        let primary = browser.add_window(WindowInfo::new(0, 0, 0, 1600, 900));

        block_on(on_menu_clicked(&browser, &click("Paris"), Some(primary), "en"));

        let companion = browser.companion().secondary_window_id.unwrap();
        assert_eq!(
            browser.tab_urls(companion),
            vec!["https://www.google.com/search?q=Paris".to_string()]
        );
    }

    #[test]
    fn test_menu_click_tab_mode() {
        let browser = FakeBrowser::new();
        browser.apply_settings(&SettingsUpdate {
            open_mode: Some(OpenMode::Tab),
            ..SettingsUpdate::default()
        });

        block_on(on_menu_clicked(&browser, &click("Paris"), None, "en"));

        assert_eq!(
            browser.opened_tabs(),
            vec!["https://www.google.com/search?q=Paris".to_string()]
        );
    }

    #[test]
    fn test_menu_click_side_panel_mode() {
        let browser = FakeBrowser::new();
        browser.apply_settings(&SettingsUpdate {
            open_mode: Some(OpenMode::SidePanel),
            service_provider: Some("https://www.bing.com/search?q=%s".to_string()),
            ..SettingsUpdate::default()
        });

        block_on(on_menu_clicked(&browser, &click("Rust"), Some(2), "en"));

        assert_eq!(browser.window_count(), 0);
        assert_eq!(browser.slept_ms(), vec![PANEL_LOAD_DELAY_MS]);
        assert_eq!(
            browser.panel_messages(),
            vec![PanelMessage::LoadUrl { url: "https://www.bing.com/search?q=Rust".to_string() }]
        );
    }

    #[test]
    fn test_menu_click_ignored_without_selection_or_other_menu() {
        let browser = FakeBrowser::new();
        let primary = browser.add_window(WindowInfo::new(0, 0, 0, 1600, 900));

        let empty = MenuClick {
            menu_item_id: MENU_ID.to_string(),
            selection_text: None,
        };
        let other = MenuClick {
            menu_item_id: "something-else".to_string(),
            selection_text: Some("Paris".to_string()),
        };
        block_on(on_menu_clicked(&browser, &empty, Some(primary), "en"));
        block_on(on_menu_clicked(&browser, &other, Some(primary), "en"));

        assert_eq!(browser.window_count(), 1);
        assert!(browser.opened_tabs().is_empty());
    }

    #[test]
    fn test_menu_click_settings_failure_opens_nothing() {
        let browser = FakeBrowser::new();
        let primary = browser.add_window(WindowInfo::new(0, 0, 0, 1600, 900));
        browser.fail_settings(true);

        block_on(on_menu_clicked(&browser, &click("Paris"), Some(primary), "en"));

        assert_eq!(browser.window_count(), 1);
    }
}
