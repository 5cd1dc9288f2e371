/// Persisted configuration shared by the background worker and every UI surface
use std::collections::BTreeSet;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::providers::{CUSTOM_SENTINEL, DEFAULT_TEMPLATE, FALLBACK_TEMPLATE, PLACEHOLDER};

pub const MIN_SPLIT_RATIO: u32 = 20;
pub const MAX_SPLIT_RATIO: u32 = 80;
pub const DEFAULT_SPLIT_RATIO: u32 = 50;

/// Where a search result is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    Tab,
    #[default]
    Split,
    SidePanel,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Tab => "tab",
            OpenMode::Split => "split",
            OpenMode::SidePanel => "sidePanel",
        }
    }

    /// Unknown values open in split view
    pub fn parse(raw: &str) -> OpenMode {
        match raw {
            "tab" => OpenMode::Tab,
            "sidePanel" => OpenMode::SidePanel,
            _ => OpenMode::Split,
        }
    }
}

impl Serialize for OpenMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpenMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(OpenMode::parse).unwrap_or_default())
    }
}

/// Share of the screen kept by the primary window, in percent
///
/// Stored as whatever the slider produced; read leniently because older
/// surfaces wrote the value as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SplitRatio(u32);

impl SplitRatio {
    pub fn new(percent: u32) -> SplitRatio {
        SplitRatio(percent)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// The ratio limited to the supported range
    pub fn clamped(&self) -> u32 {
        self.0.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO)
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        SplitRatio(DEFAULT_SPLIT_RATIO)
    }
}

impl<'de> Deserialize<'de> for SplitRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(IgnoredAny),
        }

        let number = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Some(n),
            Raw::Text(text) => text.trim().parse::<f64>().ok(),
            Raw::Other(_) => None,
        };

        Ok(number
            .filter(|n| n.is_finite())
            .map(|n| SplitRatio(n.round().max(0.0) as u32))
            .unwrap_or_default())
    }
}

/// A user-added provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSite {
    pub name: String,
    pub url: String,
}

impl CustomSite {
    /// Whether the URL takes the selection text; otherwise it is a fixed destination
    pub fn is_template(&self) -> bool {
        self.url.contains(PLACEHOLDER)
    }
}

/// The synchronized settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub open_mode: OpenMode,
    pub split_ratio: SplitRatio,
    pub service_provider: String,
    /// Destination for the legacy "custom" provider entry
    pub custom_url: String,
    pub custom_sites: Vec<CustomSite>,
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            open_mode: OpenMode::default(),
            split_ratio: SplitRatio::default(),
            service_provider: DEFAULT_TEMPLATE.to_string(),
            custom_url: String::new(),
            custom_sites: Vec::new(),
        }
    }

    /// The provider template a selection is sent to
    pub fn active_template(&self) -> &str {
        let template = if self.service_provider == CUSTOM_SENTINEL {
            self.custom_url.as_str()
        } else {
            self.service_provider.as_str()
        };

        if template.trim().is_empty() {
            FALLBACK_TEMPLATE
        } else {
            template
        }
    }

    /// Copy every field present in `update` onto this record
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(mode) = update.open_mode {
            self.open_mode = mode;
        }
        if let Some(ratio) = update.split_ratio {
            self.split_ratio = ratio;
        }
        if let Some(provider) = &update.service_provider {
            self.service_provider = provider.clone();
        }
        if let Some(custom_url) = &update.custom_url {
            self.custom_url = custom_url.clone();
        }
        if let Some(sites) = &update.custom_sites {
            self.custom_sites = sites.clone();
        }
    }

    /// Append a custom site and make it the active provider
    ///
    /// Returns the write to persist; `self` is left untouched.
    pub fn add_custom_site(&self, name: &str, url: &str) -> Result<SettingsUpdate, SettingsError> {
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() {
            return Err(SettingsError::MissingName);
        }
        if url.is_empty() {
            return Err(SettingsError::MissingUrl);
        }

        let mut sites = self.custom_sites.clone();
        sites.push(CustomSite {
            name: name.to_string(),
            url: url.to_string(),
        });

        Ok(SettingsUpdate {
            custom_sites: Some(sites),
            service_provider: Some(url.to_string()),
            ..SettingsUpdate::default()
        })
    }

    /// Remove the custom site at `index`
    ///
    /// When the removed site was the active provider the provider goes back
    /// to the default. Returns `None` when `index` is out of range.
    pub fn remove_custom_site(&self, index: usize) -> Option<SettingsUpdate> {
        if index >= self.custom_sites.len() {
            return None;
        }

        let mut sites = self.custom_sites.clone();
        let removed = sites.remove(index);

        let service_provider =
            (self.service_provider == removed.url).then(|| DEFAULT_TEMPLATE.to_string());

        Some(SettingsUpdate {
            custom_sites: Some(sites),
            service_provider,
            ..SettingsUpdate::default()
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// A partial write: only the fields that are set are stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_mode: Option<OpenMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_ratio: Option<SplitRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sites: Option<Vec<CustomSite>>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == SettingsUpdate::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Enter a site name")]
    MissingName,

    #[error("Enter a URL")]
    MissingUrl,
}

/// Storage area name for the synchronized record
pub const SYNC_AREA: &str = "sync";

/// One change notification from the settings store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsChange {
    pub keys: BTreeSet<String>,
    pub update: SettingsUpdate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredChange {
    #[serde(default)]
    new_value: Option<serde_json::Value>,
}

impl SettingsChange {
    /// Parse the host's `{key: {oldValue, newValue}}` change map
    pub fn from_changes(changes: serde_json::Value) -> Result<SettingsChange, serde_json::Error> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_value(changes)?;

        let mut keys = BTreeSet::new();
        let mut new_values = serde_json::Map::new();
        for (key, entry) in entries {
            let change: StoredChange = serde_json::from_value(entry)?;
            if let Some(value) = change.new_value {
                new_values.insert(key.clone(), value);
            }
            keys.insert(key);
        }

        let update = serde_json::from_value(serde_json::Value::Object(new_values))?;
        Ok(SettingsChange { keys, update })
    }

    /// Whether the header rules depend on anything that changed
    pub fn touches_rules(&self) -> bool {
        self.keys.contains("serviceProvider") || self.keys.contains("customSites")
    }
}
