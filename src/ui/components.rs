/// Reusable UI components

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::settings::{MAX_SPLIT_RATIO, MIN_SPLIT_RATIO, SplitRatio};

#[derive(Properties, PartialEq)]
pub struct RatioSliderProps {
    pub value: SplitRatio,
    pub on_change: Callback<SplitRatio>,
    #[prop_or_default]
    pub disabled: bool,
}

/// Slider for the share of the screen the current window keeps
#[function_component(RatioSlider)]
pub fn ratio_slider(props: &RatioSliderProps) -> Html {
    let percent = props.value.clamped();

    let on_input = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                if let Ok(value) = input.value().parse::<u32>() {
                    on_change.emit(SplitRatio::new(value));
                }
            }
        })
    };

    html! {
        <div class="ratio-group">
            <label class="ratio-label">
                {"Current window width: "}
                <span class="ratio-display">{format!("{}%", percent)}</span>
            </label>
            <input
                type="range"
                class="ratio-slider"
                min={MIN_SPLIT_RATIO.to_string()}
                max={MAX_SPLIT_RATIO.to_string()}
                step="5"
                value={percent.to_string()}
                disabled={props.disabled}
                oninput={on_input}
            />
        </div>
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
}

/// A short message shown after a write
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn success(message: &str) -> Status {
        Status {
            message: message.to_string(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Status {
        Status {
            message: message.into(),
            kind: StatusKind::Error,
        }
    }

    /// How long the message stays up
    pub fn duration_ms(&self) -> u32 {
        match self.kind {
            StatusKind::Success => 1500,
            StatusKind::Error => 2000,
        }
    }
}

/// Show `status`, then clear it after its duration
pub fn flash_status(handle: &UseStateHandle<Option<Status>>, status: Status) {
    let duration = status.duration_ms();
    handle.set(Some(status));

    let handle = handle.clone();
    spawn_local(async move {
        TimeoutFuture::new(duration).await;
        handle.set(None);
    });
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    #[prop_or_default]
    pub status: Option<Status>,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    let Some(status) = &props.status else {
        return html! { <div class="status-line"></div> };
    };

    let color = match status.kind {
        StatusKind::Success => "#4caf50",
        StatusKind::Error => "#f44336",
    };

    html! {
        <div class="status-line" style={format!("color: {}; font-size: 12px; min-height: 16px;", color)}>
            {&status.message}
        </div>
    }
}
