use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::geometry::Viewport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Carousel behaviour and geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Auto-advance period in milliseconds (0 = disabled)
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Width of a single item; all items share it
    #[serde(default = "default_item_width")]
    pub item_width: f64,
    /// Width of the visible window
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    /// Height of the carousel (presentational)
    #[serde(default = "default_height")]
    pub height: f64,
    /// Show page indicators (presentational)
    #[serde(default = "default_true")]
    pub show_indicators: bool,
    /// Fraction of an item that must be visible for it to count as active
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
    /// Animate scheduler-issued scrolls
    #[serde(default = "default_true")]
    pub animated: bool,
    /// Align the viewport to the active item when a drag ends
    #[serde(default = "default_true")]
    pub snap_on_release: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            item_width: default_item_width(),
            container_width: default_container_width(),
            height: default_height(),
            show_indicators: default_true(),
            visibility_threshold: default_visibility_threshold(),
            animated: default_true(),
            snap_on_release: default_true(),
        }
    }
}

impl CarouselConfig {
    /// Auto-advance period, `None` when auto-advance is disabled
    pub fn interval(&self) -> Option<Duration> {
        if self.interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.interval_ms))
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            container_width: self.container_width,
            item_width: self.item_width,
        }
    }

    /// Reject settings the controller cannot work with.
    ///
    /// Non-positive widths are accepted: the controller treats them as
    /// "geometry not known yet" and stays idle until real widths arrive.
    pub fn validate(&self) -> crate::Result<()> {
        let t = self.visibility_threshold;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(crate::Error::Config(format!(
                "visibility_threshold must be in (0, 1], got {}",
                t
            )));
        }
        if !self.viewport().is_valid() {
            tracing::warn!(
                item_width = self.item_width,
                container_width = self.container_width,
                "Carousel geometry is not positive; auto-advance stays idle"
            );
        }
        Ok(())
    }
}

/// Easing curve used by the host scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

/// Host-side scroll animation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Enable animated scrolling
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Duration of one animated scroll in milliseconds
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    /// Easing curve
    #[serde(default)]
    pub easing: EasingType,
    /// Frames per second while animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    2000
}

fn default_item_width() -> f64 {
    300.0
}

fn default_container_width() -> f64 {
    300.0
}

fn default_height() -> f64 {
    300.0
}

fn default_visibility_threshold() -> f64 {
    0.8
}

fn default_animation_duration() -> u64 {
    300
}

fn default_animation_fps() -> u32 {
    60
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.carousel.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/carousel/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("carousel")
            .join("config.toml")
    }
}
