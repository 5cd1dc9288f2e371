/// Tracks the single companion window opened beside the primary window
use log::debug;
use serde::{Deserialize, Serialize};

use crate::host::{CompanionStore, HostError, WindowHost};
use crate::window_data::{WindowId, WindowInfo};

/// Device-local record of the companion window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionWindowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_window_id: Option<WindowId>,
}

impl CompanionWindowState {
    pub fn new(window_id: WindowId) -> CompanionWindowState {
        CompanionWindowState {
            secondary_window_id: Some(window_id),
        }
    }
}

/// Validates and updates the persisted companion window id
///
/// Holds no state of its own; every call reads the store afresh so a window
/// closed between two calls is noticed on the next one.
pub struct WindowSession<'a, H> {
    host: &'a H,
}

impl<'a, H> WindowSession<'a, H>
where
    H: CompanionStore + WindowHost,
{
    pub fn new(host: &'a H) -> Self {
        WindowSession { host }
    }

    /// The companion window, if the stored id still names an open window
    ///
    /// A stored id that no longer resolves is cleared before returning `None`.
    pub async fn get_existing(&self) -> Result<Option<WindowInfo>, HostError> {
        let state = self.host.load_companion().await?;
        let Some(window_id) = state.secondary_window_id else {
            return Ok(None);
        };

        match self.host.get_window(window_id).await {
            Ok(Some(window)) => Ok(Some(window)),
            Ok(None) | Err(_) => {
                debug!("Companion window {} is gone, clearing it", window_id);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Remember `window_id` as the companion, replacing any previous one
    pub async fn record(&self, window_id: WindowId) -> Result<(), HostError> {
        self.host
            .save_companion(&CompanionWindowState::new(window_id))
            .await
    }

    pub async fn clear(&self) -> Result<(), HostError> {
        self.host.clear_companion().await
    }
}
