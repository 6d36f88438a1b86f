//! Scripted host input for simulations
//!
//! ```toml
//! visible = true
//! duration_ms = 8000
//!
//! [carousel]
//! interval_ms = 2000
//!
//! [[items]]
//! id = "a"
//! media_ref = "img/a.jpg"
//!
//! [[events]]
//! at_ms = 500
//! kind = "drag_start"
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use carousel_core::{CarouselConfig, CarouselItem, Error};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::event::HostEvent;

/// One host event and when to deliver it, relative to replay start
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub items: Vec<CarouselItem>,
    /// Overrides the `[carousel]` section of the app config
    #[serde(default)]
    pub carousel: Option<CarouselConfig>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// How long to run; the caller's default applies when absent
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn default_visible() -> bool {
    true
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scenario: Scenario = toml::from_str(s).map_err(|e| Error::Scenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    /// A visible carousel with `item_count` generated items and no input
    pub fn idle(item_count: usize) -> Self {
        Self {
            items: (0..item_count)
                .map(|i| CarouselItem::new(format!("item-{i}"), format!("media/{i}")))
                .collect(),
            carousel: None,
            visible: true,
            duration_ms: None,
            events: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Invalid scenario {}", path.display()))
    }

    fn validate(&self) -> carousel_core::Result<()> {
        if let Some(pair) = self.events.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(Error::Scenario(format!(
                "events must be ordered by at_ms ({} after {})",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        if let Some(config) = &self.carousel {
            config.validate()?;
        }
        Ok(())
    }

    pub fn duration(&self, default: Duration) -> Duration {
        self.duration_ms.map(Duration::from_millis).unwrap_or(default)
    }
}

/// Deliver scripted events at their scheduled times.
/// Stops early if the runtime hangs up.
pub async fn replay(events: Vec<ScriptedEvent>, tx: mpsc::UnboundedSender<HostEvent>) {
    let start = Instant::now();
    for scripted in events {
        tokio::time::sleep_until(start + Duration::from_millis(scripted.at_ms)).await;
        debug!(at_ms = scripted.at_ms, event = ?scripted.event, "Replaying host event");
        if tx.send(scripted.event).is_err() {
            warn!("Runtime stopped before the scenario finished");
            return;
        }
    }
}
