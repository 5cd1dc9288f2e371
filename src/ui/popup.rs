/// Settings popup for Split View Search

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::chrome::{ChromeHost, ui_language};
use crate::host::SettingsStore;
use crate::providers::{BUILT_IN_PROVIDERS, CUSTOM_SENTINEL, is_translate_template, localize_template};
use crate::settings::{CustomSite, OpenMode, Settings, SettingsUpdate, SplitRatio};
use crate::ui::components::{RatioSlider, Status, StatusLine, flash_status};
use crate::ui::{SettingsState, save_settings, use_synced_settings};

const OPEN_MODES: &[(OpenMode, &str)] = &[
    (OpenMode::Split, "Split screen"),
    (OpenMode::SidePanel, "Side panel"),
    (OpenMode::Tab, "New tab"),
];

/// One row of the provider list
#[derive(Clone, PartialEq)]
struct ProviderOption {
    value: String,
    label: String,
    /// Position in `customSites` for user-added entries
    custom_index: Option<usize>,
}

fn provider_options(sites: &[CustomSite], language: &str) -> Vec<ProviderOption> {
    let built_ins = BUILT_IN_PROVIDERS.iter().map(|provider| ProviderOption {
        value: localize_template(provider.template, language),
        label: provider.label.to_string(),
        custom_index: None,
    });

    let custom = sites.iter().enumerate().map(|(index, site)| ProviderOption {
        value: site.url.clone(),
        label: site.name.clone(),
        custom_index: Some(index),
    });

    built_ins.chain(custom).collect()
}

/// Build a write from the stored settings as they are now
///
/// Another surface may have changed the site list since the popup last rendered.
async fn edit_stored<H, T, F>(host: &H, edit: F) -> Result<T, String>
where
    H: SettingsStore,
    F: FnOnce(&Settings) -> Result<T, String>,
{
    let stored = host
        .load_settings()
        .await
        .map_err(|e| format!("Failed to load: {}", e))?;
    edit(&stored)
}

#[function_component(App)]
pub fn app() -> Html {
    let settings = use_synced_settings();
    let status = use_state(|| None::<Status>);
    let adding_site = use_state(|| false);
    let new_site_name = use_state(String::new);
    let new_site_url = use_state(String::new);
    let language = use_memo((), |_| ui_language());

    let on_saved = {
        let status = status.clone();
        Callback::from(move |result: Result<(), String>| match result {
            Ok(()) => flash_status(&status, Status::success("Saved")),
            Err(e) => flash_status(&status, Status::error(e)),
        })
    };

    // Point a stored translate provider at the user's language
    {
        let settings = settings.clone();
        let on_saved = on_saved.clone();
        let language = language.clone();
        let provider = match &*settings {
            SettingsState::Ready(loaded) => Some(loaded.service_provider.clone()),
            _ => None,
        };

        use_effect_with(provider, move |provider| {
            if let Some(provider) = provider.as_deref().filter(|p| is_translate_template(p)) {
                let localized = localize_template(provider, &language);
                if localized != provider {
                    let update = SettingsUpdate {
                        service_provider: Some(localized),
                        ..SettingsUpdate::default()
                    };
                    save_settings(&settings, update, on_saved);
                }
            }
            || ()
        });
    }

    let current = match &*settings {
        SettingsState::Ready(loaded) => loaded.clone(),
        SettingsState::Loading => {
            return html! {
                <div class="padding-20 loading-text-center">
                    <Spinner />
                </div>
            };
        }
        SettingsState::Error(err) => {
            return html! {
                <div class="padding-20">
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                </div>
            };
        }
    };

    let on_mode = {
        let settings = settings.clone();
        let on_saved = on_saved.clone();
        move |mode: OpenMode| {
            let settings = settings.clone();
            let on_saved = on_saved.clone();
            Callback::from(move |_: Event| {
                let update = SettingsUpdate {
                    open_mode: Some(mode),
                    ..SettingsUpdate::default()
                };
                save_settings(&settings, update, on_saved.clone());
            })
        }
    };

    let on_ratio = {
        let settings = settings.clone();
        let on_saved = on_saved.clone();
        Callback::from(move |ratio: SplitRatio| {
            let update = SettingsUpdate {
                split_ratio: Some(ratio),
                ..SettingsUpdate::default()
            };
            save_settings(&settings, update, on_saved.clone());
        })
    };

    let on_select_provider = {
        let settings = settings.clone();
        let on_saved = on_saved.clone();
        let adding_site = adding_site.clone();
        Callback::from(move |value: String| {
            adding_site.set(false);
            let update = SettingsUpdate {
                service_provider: Some(value),
                ..SettingsUpdate::default()
            };
            save_settings(&settings, update, on_saved.clone());
        })
    };

    let on_delete_site = {
        let settings = settings.clone();
        let status = status.clone();
        Callback::from(move |index: usize| {
            let settings = settings.clone();
            let status = status.clone();
            spawn_local(async move {
                match edit_stored(&ChromeHost, |stored| Ok(stored.remove_custom_site(index))).await {
                    Ok(Some(update)) => {
                        let status = status.clone();
                        let on_deleted = Callback::from(move |result: Result<(), String>| match result {
                            Ok(()) => flash_status(&status, Status::success("Site deleted")),
                            Err(e) => flash_status(&status, Status::error(e)),
                        });
                        save_settings(&settings, update, on_deleted);
                    }
                    Ok(None) => {}
                    Err(e) => flash_status(&status, Status::error(e)),
                }
            });
        })
    };

    let on_start_adding = {
        let adding_site = adding_site.clone();
        Callback::from(move |_| adding_site.set(true))
    };

    let on_name_input = {
        let new_site_name = new_site_name.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_site_name.set(input.value());
            }
        })
    };

    let on_url_input = {
        let new_site_url = new_site_url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_site_url.set(input.value());
            }
        })
    };

    let on_add_site = {
        let settings = settings.clone();
        let status = status.clone();
        let on_saved = on_saved.clone();
        let adding_site = adding_site.clone();
        let new_site_name = new_site_name.clone();
        let new_site_url = new_site_url.clone();
        Callback::from(move |_| {
            let settings = settings.clone();
            let status = status.clone();
            let on_saved = on_saved.clone();
            let adding_site = adding_site.clone();
            let new_site_name = new_site_name.clone();
            let new_site_url = new_site_url.clone();
            spawn_local(async move {
                let name = (*new_site_name).clone();
                let url = (*new_site_url).clone();
                let edit = |stored: &Settings| stored.add_custom_site(&name, &url).map_err(|e| e.to_string());
                match edit_stored(&ChromeHost, edit).await {
                    Ok(update) => {
                        save_settings(&settings, update, on_saved);
                        new_site_name.set(String::new());
                        new_site_url.set(String::new());
                        adding_site.set(false);
                    }
                    Err(e) => flash_status(&status, Status::error(e)),
                }
            });
        })
    };

    let selected = localize_template(&current.service_provider, &language);
    let options = provider_options(&current.custom_sites, &language);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Split View Search"}</h1>

            <div class="settings-group">
                <h2 class="settings-title">{"Open results in"}</h2>
                {for OPEN_MODES.iter().map(|(mode, label)| html! {
                    <label class="radio-row">
                        <input
                            type="radio"
                            name="openMode"
                            value={mode.as_str()}
                            checked={current.open_mode == *mode}
                            onchange={on_mode(*mode)}
                        />
                        {*label}
                    </label>
                })}
            </div>

            if current.open_mode == OpenMode::Split {
                <RatioSlider value={current.split_ratio} on_change={on_ratio} />
            }

            <div class="settings-group">
                <h2 class="settings-title">{"Search with"}</h2>
                <div class="provider-list">
                    {for options.iter().map(|option| provider_row(option, &selected, &on_select_provider, &on_delete_site))}
                    <div
                        class={if *adding_site { "provider-option selected" } else { "provider-option" }}
                        data-value={CUSTOM_SENTINEL}
                        onclick={on_start_adding}
                    >
                        <span class="option-text">{"+ Add Custom Site..."}</span>
                    </div>
                </div>
            </div>

            if *adding_site {
                <div class="settings-group custom-site-form">
                    <input
                        type="text"
                        placeholder="Site name"
                        value={(*new_site_name).clone()}
                        oninput={on_name_input}
                        class="site-input"
                    />
                    <input
                        type="text"
                        placeholder="https://example.com/search?q=%s"
                        value={(*new_site_url).clone()}
                        oninput={on_url_input}
                        class="site-input"
                    />
                    <Button onclick={on_add_site} variant={ButtonVariant::Secondary} block={true}>
                        {"Add"}
                    </Button>
                </div>
            }

            <StatusLine status={(*status).clone()} />
        </div>
    }
}

fn provider_row(
    option: &ProviderOption,
    selected: &str,
    on_select: &Callback<String>,
    on_delete: &Callback<usize>,
) -> Html {
    let class = if option.value == selected {
        "provider-option selected"
    } else {
        "provider-option"
    };

    let onclick = on_select.reform({
        let value = option.value.clone();
        move |_: MouseEvent| value.clone()
    });

    html! {
        <div {class} data-value={option.value.clone()} {onclick}>
            <span class="option-text">{&option.label}</span>
            if let Some(index) = option.custom_index {
                <button
                    class="delete-btn"
                    title="Remove this site"
                    onclick={on_delete.reform(move |e: MouseEvent| {
                        e.stop_propagation();
                        index
                    })}
                >
                    {"❌"}
                </button>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBrowser;
    use futures::executor::block_on;

    fn site(name: &str, url: &str) -> CustomSite {
        CustomSite {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_provider_options_localize_translate() {
        let options = provider_options(&[], "zh-TW");

        assert_eq!(options.len(), BUILT_IN_PROVIDERS.len());
        assert!(options.iter().any(|option| option.value == "https://translate.google.com/?sl=auto&tl=zh-tw&text=%s"));
        assert!(options.iter().all(|option| option.custom_index.is_none()));
    }

    #[test]
    fn test_provider_options_list_custom_sites_last() {
        let sites = vec![
            CustomSite {
                name: "Wiki".to_string(),
                url: "https://en.wikipedia.org/wiki/%s".to_string(),
            },
            CustomSite {
                name: "Docs".to_string(),
                url: "https://docs.rs/%s".to_string(),
            },
        ];

        let options = provider_options(&sites, "en");

        let custom: Vec<_> = options
            .iter()
            .filter_map(|option| option.custom_index.map(|index| (index, option.label.as_str())))
            .collect();
        assert_eq!(custom, vec![(0, "Wiki"), (1, "Docs")]);
        assert_eq!(options.last().map(|option| option.value.as_str()), Some("https://docs.rs/%s"));
    }

    #[test]
    fn test_default_provider_is_selected() {
        let settings = Settings::new();
        let options = provider_options(&settings.custom_sites, "en");

        let selected = localize_template(&settings.service_provider, "en");

        assert_eq!(
            options.iter().find(|option| option.value == selected).map(|option| option.label.as_str()),
            Some("Google Search (Default)")
        );
    }

    #[test]
    fn test_add_site_keeps_sites_saved_elsewhere() {
        // The popup rendered with one site; another surface has since added a second
        let browser = FakeBrowser::new();
        browser.apply_settings(&SettingsUpdate {
            custom_sites: Some(vec![
                site("Wiki", "https://en.wikipedia.org/wiki/%s"),
                site("Docs", "https://docs.rs/%s"),
            ]),
            ..SettingsUpdate::default()
        });

        let update = block_on(edit_stored(&browser, |stored| {
            stored
                .add_custom_site("Crates", "https://crates.io/search?q=%s")
                .map_err(|e| e.to_string())
        }))
        .unwrap();

        let names: Vec<_> = update
            .custom_sites
            .unwrap_or_default()
            .into_iter()
            .map(|site| site.name)
            .collect();
        assert_eq!(names, vec!["Wiki", "Docs", "Crates"]);
    }

    #[test]
    fn test_delete_site_uses_stored_list() {
        let browser = FakeBrowser::new();
        browser.apply_settings(&SettingsUpdate {
            custom_sites: Some(vec![site("Docs", "https://docs.rs/%s")]),
            ..SettingsUpdate::default()
        });

        let update = block_on(edit_stored(&browser, |stored| Ok(stored.remove_custom_site(0)))).unwrap();
        assert_eq!(update.and_then(|update| update.custom_sites), Some(Vec::new()));

        let stale_index = block_on(edit_stored(&browser, |stored| Ok(stored.remove_custom_site(1)))).unwrap();
        assert_eq!(stale_index, None);
    }

    #[test]
    fn test_edit_stored_reports_load_failure() {
        let browser = FakeBrowser::new();
        browser.fail_settings(true);

        let result = block_on(edit_stored(&browser, |stored| Ok(stored.custom_sites.len())));

        assert!(result.unwrap_err().starts_with("Failed to load"));
    }
}
