/// Side panel: shows the last URL sent by the background worker

use yew::prelude::*;

use crate::chrome::ChromeHost;
use crate::host::PanelMessage;
use crate::settings::{SettingsUpdate, SplitRatio};
use crate::ui::components::{RatioSlider, Status, StatusLine, flash_status};
use crate::ui::{SettingsState, save_settings, use_synced_settings};

#[function_component(SidePanel)]
pub fn side_panel() -> Html {
    let settings = use_synced_settings();
    let frame_url = use_state(|| None::<String>);
    let status = use_state(|| None::<Status>);

    // Follow loadUrl messages for as long as the panel is open
    {
        let frame_url = frame_url.clone();
        use_effect_with((), move |_| {
            let listener = ChromeHost::subscribe_panel_messages(move |message| match message {
                PanelMessage::LoadUrl { url } if !url.is_empty() => frame_url.set(Some(url)),
                PanelMessage::LoadUrl { .. } => {}
            });
            move || drop(listener)
        });
    }

    let on_ratio = {
        let settings = settings.clone();
        let status = status.clone();
        Callback::from(move |ratio: SplitRatio| {
            let update = SettingsUpdate {
                split_ratio: Some(ratio),
                ..SettingsUpdate::default()
            };
            let status = status.clone();
            let on_saved = Callback::from(move |result: Result<(), String>| {
                if let Err(e) = result {
                    flash_status(&status, Status::error(e));
                }
            });
            save_settings(&settings, update, on_saved);
        })
    };

    let ratio = match &*settings {
        SettingsState::Ready(loaded) => Some(loaded.split_ratio),
        _ => None,
    };

    html! {
        <div class="side-panel">
            <div class="side-panel-toolbar">
                <RatioSlider
                    value={ratio.unwrap_or_default()}
                    on_change={on_ratio}
                    disabled={ratio.is_none()}
                />
                <StatusLine status={(*status).clone()} />
            </div>
            {match &*frame_url {
                Some(url) => html! {
                    <iframe id="content-frame" class="content-frame" src={url.clone()}></iframe>
                },
                None => html! {
                    <div class="empty-state">
                        <p>{"Select text on a page and choose \"Search in Split View\"."}</p>
                    </div>
                },
            }}
        </div>
    }
}
