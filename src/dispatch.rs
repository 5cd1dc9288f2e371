/// Turns a context-menu selection into a destination URL and opens it

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::host::{CompanionStore, HostError, PanelHost, PanelMessage, WindowHost};
use crate::providers::{answer_language_instruction, fill_template, is_ai_provider};
use crate::settings::{OpenMode, Settings, SplitRatio};
use crate::split::launch_split;
use crate::window_data::{CreateTab, WindowId};

/// Time the side panel gets to start listening before the URL is sent
pub const PANEL_LOAD_DELAY_MS: u32 = 300;

/// Context-menu click as delivered by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClick {
    #[serde(default)]
    pub menu_item_id: String,
    #[serde(default)]
    pub selection_text: Option<String>,
}

/// Build the destination URL for `selection` from the active provider
///
/// AI answer engines also get an instruction to reply in the browser's
/// display language; the whole query is then encoded into the template.
pub fn resolve_url(settings: &Settings, selection: &str, ui_language: &str) -> String {
    let template = settings.active_template();

    let query = if is_ai_provider(template) {
        format!("{}{}", selection, answer_language_instruction(ui_language))
    } else {
        selection.to_string()
    };

    fill_template(template, &query)
}

/// How a resolved URL will be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPlan {
    Tab {
        url: String,
    },
    SidePanel {
        window_id: WindowId,
        url: String,
    },
    Split {
        window_id: WindowId,
        url: String,
        ratio: SplitRatio,
    },
}

/// Pick the open path for `url`; panel and split need the triggering window
pub fn plan_open(settings: &Settings, url: String, window_id: Option<WindowId>) -> Option<OpenPlan> {
    match settings.open_mode {
        OpenMode::Tab => Some(OpenPlan::Tab { url }),
        OpenMode::SidePanel => window_id.map(|window_id| OpenPlan::SidePanel { window_id, url }),
        OpenMode::Split => window_id.map(|window_id| OpenPlan::Split {
            window_id,
            url,
            ratio: settings.split_ratio,
        }),
    }
}

/// Carry out an [`OpenPlan`]
pub async fn open<H>(host: &H, plan: &OpenPlan) -> Result<(), HostError>
where
    H: CompanionStore + WindowHost + PanelHost,
{
    match plan {
        OpenPlan::Tab { url } => {
            host.create_tab(&CreateTab {
                url: url.clone(),
                window_id: None,
                active: true,
            })
            .await
        }
        OpenPlan::SidePanel { window_id, url } => {
            debug!("Handing {} to the side panel of window {}", url, window_id);
            send_to_side_panel(host, url).await
        }
        OpenPlan::Split {
            window_id,
            url,
            ratio,
        } => launch_split(host, *window_id, url, *ratio).await.map(|_| ()),
    }
}

/// Give the side panel a moment to start listening, then ask it to load `url`
///
/// The panel itself is opened by the click listener while the user gesture is
/// still live. It may not be listening yet; a failed hand-off is logged and dropped.
pub async fn send_to_side_panel<H>(host: &H, url: &str) -> Result<(), HostError>
where
    H: PanelHost,
{
    host.sleep_ms(PANEL_LOAD_DELAY_MS).await;

    let message = PanelMessage::LoadUrl {
        url: url.to_string(),
    };
    if let Err(e) = host.send_panel_message(&message).await {
        warn!("Side panel did not take the URL: {}", e);
    }
    Ok(())
}
