/// Provider catalog, template filling and answer-language hints
use crate::domain::{extract_domain, host_matches};

/// Token replaced by the encoded selection text
pub const PLACEHOLDER: &str = "%s";

/// Provider used when nothing has been chosen yet
pub const DEFAULT_TEMPLATE: &str = "https://www.google.com/search?q=%s";

/// Destination used when the stored provider resolves to nothing
pub const FALLBACK_TEMPLATE: &str = "https://www.google.com/maps/search/?api=1&query=%s";

/// Provider value meaning "use the legacy custom URL field"
pub const CUSTOM_SENTINEL: &str = "custom";

const TRANSLATE_HOST: &str = "translate.google.com";

/// Hosts that answer questions rather than list results
const AI_PROVIDER_HOSTS: &[&str] = &["felo.ai", "perplexity.ai"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub label: &'static str,
    pub template: &'static str,
}

pub const BUILT_IN_PROVIDERS: &[Provider] = &[
    Provider {
        label: "Google Search (Default)",
        template: DEFAULT_TEMPLATE,
    },
    Provider {
        label: "Google Maps",
        template: FALLBACK_TEMPLATE,
    },
    Provider {
        label: "Google Translate (Auto -> your language)",
        template: "https://translate.google.com/?sl=auto&tl=en&text=%s",
    },
    Provider {
        label: "Bing",
        template: "https://www.bing.com/search?q=%s",
    },
    Provider {
        label: "DuckDuckGo",
        template: "https://duckduckgo.com/?ia=web&q=%s",
    },
    Provider {
        label: "Yahoo Finance",
        template: "https://finance.yahoo.com/quote/%s",
    },
    Provider {
        label: "Felo",
        template: "https://felo.ai/search?q=%s",
    },
    Provider {
        label: "Perplexity",
        template: "https://www.perplexity.ai/?q=%s",
    },
];

/// Whether the template points at an AI answer engine
pub fn is_ai_provider(template: &str) -> bool {
    extract_domain(template).is_some_and(|host| {
        AI_PROVIDER_HOSTS
            .iter()
            .any(|ai_host| host_matches(&host, ai_host))
    })
}

/// Human-readable name for a browser language code
///
/// Lookup order: full locale ("zh-tw"), then the base language ("zh"),
/// then the code exactly as given.
pub fn language_name(code: &str) -> String {
    let lower = code.to_lowercase();
    let base = lower.split('-').next().unwrap_or_default();

    known_language(&lower)
        .or_else(|| known_language(base))
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

fn known_language(code: &str) -> Option<&'static str> {
    let name = match code {
        "zh-tw" | "zh-hk" => "繁體中文",
        "zh-cn" => "簡體中文",
        "zh" => "中文",
        "en" | "en-us" | "en-gb" => "English",
        "ja" => "日本語",
        "ko" => "한국어",
        "fr" => "Français",
        "de" => "Deutsch",
        "es" => "Español",
        "pt" => "Português",
        "it" => "Italiano",
        "ru" => "Русский",
        "ar" => "العربية",
        "th" => "ภาษาไทย",
        "vi" => "Tiếng Việt",
        "id" => "Bahasa Indonesia",
        "ms" => "Bahasa Melayu",
        "nl" => "Nederlands",
        "pl" => "Polski",
        "tr" => "Türkçe",
        "uk" => "Українська",
        "sv" => "Svenska",
        "da" => "Dansk",
        "fi" => "Suomi",
        "no" => "Norsk",
        "hi" => "हिन्दी",
        _ => return None,
    };
    Some(name)
}

/// Instruction appended to the query so the answer comes back in `ui_language`
pub fn answer_language_instruction(ui_language: &str) -> String {
    format!(" 請用{}來回答", language_name(ui_language))
}

/// Characters `encodeURIComponent` leaves alone that `urlencoding` escapes
const COMPONENT_MARKS: &[char] = &['!', '\'', '(', ')', '*'];

/// Percent-encode `text` the way `encodeURIComponent` does
pub fn encode_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if COMPONENT_MARKS.contains(&c) {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// Substitute the percent-encoded text into the first placeholder
///
/// Templates without a placeholder are fixed destinations and come back unchanged.
pub fn fill_template(template: &str, text: &str) -> String {
    if template.contains(PLACEHOLDER) {
        template.replacen(PLACEHOLDER, &encode_component(text), 1)
    } else {
        template.to_string()
    }
}

/// Google Translate template targeting the user's language
pub fn translate_template(ui_language: &str) -> String {
    format!(
        "https://{}/?sl=auto&tl={}&text={}",
        TRANSLATE_HOST,
        ui_language.to_lowercase(),
        PLACEHOLDER
    )
}

pub fn is_translate_template(template: &str) -> bool {
    extract_domain(template).is_some_and(|host| host == TRANSLATE_HOST)
}

/// Rewrite a translate provider to target the user's language; other templates pass through
pub fn localize_template(template: &str, ui_language: &str) -> String {
    if is_translate_template(template) {
        translate_template(ui_language)
    } else {
        template.to_string()
    }
}

/// Label for a template among the built-ins, if it is one
pub fn built_in_label(template: &str) -> Option<&'static str> {
    BUILT_IN_PROVIDERS
        .iter()
        .find(|provider| {
            provider.template == template
                || (is_translate_template(provider.template) && is_translate_template(template))
        })
        .map(|provider| provider.label)
}
