/// Split-screen launcher: resize the primary window and fill the space beside it
use log::{debug, info};

use crate::host::{CompanionStore, HostError, WindowHost};
use crate::session::WindowSession;
use crate::settings::SplitRatio;
use crate::window_data::{
    CreateTab, CreateWindow, TabId, WindowBounds, WindowId, WindowInfo, WindowState, WindowType,
};

/// Where the two halves of a split go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitGeometry {
    pub left: i32,
    pub top: i32,
    pub height: u32,
    pub primary_width: u32,
    pub companion_width: u32,
}

impl SplitGeometry {
    /// Divide the primary window's width by `ratio` (clamped to 20–80 percent)
    pub fn compute(primary: &WindowInfo, ratio: SplitRatio) -> SplitGeometry {
        let percent = u64::from(ratio.clamped());
        let primary_width = (u64::from(primary.width) * percent / 100) as u32;

        SplitGeometry {
            left: primary.left,
            top: primary.top,
            height: primary.height,
            primary_width,
            companion_width: primary.width - primary_width,
        }
    }

    pub fn companion_left(&self) -> i32 {
        self.left.saturating_add(self.primary_width as i32)
    }

    pub fn primary_bounds(&self) -> WindowBounds {
        WindowBounds {
            left: Some(self.left),
            top: Some(self.top),
            width: Some(self.primary_width),
            height: None,
            state: Some(WindowState::Normal),
        }
    }

    pub fn companion_window(&self, url: &str) -> CreateWindow {
        CreateWindow {
            url: url.to_string(),
            kind: WindowType::Popup,
            left: self.companion_left(),
            top: self.top,
            width: self.companion_width,
            height: self.height,
        }
    }
}

/// What a split launch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The existing companion was pointed at the new URL
    Reused {
        window_id: WindowId,
        tab_id: Option<TabId>,
    },
    /// A new companion window was opened and recorded
    Created {
        window_id: WindowId,
        geometry: SplitGeometry,
    },
    /// The triggering window could not be found; nothing was changed
    PrimaryMissing,
}

/// Show `url` beside `primary_id`, keeping at most one companion window
pub async fn launch_split<H>(
    host: &H,
    primary_id: WindowId,
    url: &str,
    ratio: SplitRatio,
) -> Result<SplitOutcome, HostError>
where
    H: CompanionStore + WindowHost,
{
    let Some(primary) = host.get_window(primary_id).await.ok().flatten() else {
        debug!("Primary window {} not found, skipping split", primary_id);
        return Ok(SplitOutcome::PrimaryMissing);
    };

    let session = WindowSession::new(host);

    if let Some(companion) = session.get_existing().await? {
        return reuse_companion(host, companion.id, url).await;
    }

    let geometry = SplitGeometry::compute(&primary, ratio);
    host.update_window(primary.id, &geometry.primary_bounds())
        .await?;

    let created = host.create_window(&geometry.companion_window(url)).await?;
    session.record(created.id).await?;

    info!(
        "Opened companion window {} ({}px) beside window {} ({}px)",
        created.id, geometry.companion_width, primary.id, geometry.primary_width
    );
    Ok(SplitOutcome::Created {
        window_id: created.id,
        geometry,
    })
}

/// Navigate the companion's first tab, or open one if the window is empty
async fn reuse_companion<H>(host: &H, window_id: WindowId, url: &str) -> Result<SplitOutcome, HostError>
where
    H: WindowHost,
{
    let tabs = host.tabs_in_window(window_id).await?;

    let tab_id = match tabs.first() {
        Some(tab) => {
            host.update_tab_url(tab.id, url).await?;
            Some(tab.id)
        }
        None => {
            host.create_tab(&CreateTab {
                url: url.to_string(),
                window_id: Some(window_id),
                active: true,
            })
            .await?;
            None
        }
    };

    debug!("Reused companion window {}", window_id);
    Ok(SplitOutcome::Reused { window_id, tab_id })
}
