use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Failure to read or parse the plugin configuration document.
///
/// This is the only error surface of the crate: everything past startup
/// degrades to a silent no-op instead of failing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ── Stage configuration ──────────────────────────────────────────────────────

/// Static configuration for the portrait stage.
///
/// Loaded once at startup. Out-of-range values are never rejected here;
/// they are clamped at the point of use (`height_rate`, fade durations,
/// `dim_brightness`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Fade-in duration for `\SHOW`, in frames.
    pub fade_in_frames: u32,
    /// Fade-out duration for `\HIDE`, in frames.
    pub fade_out_frames: u32,
    /// Horizontal padding inside each L/C/R region, in pixels.
    pub padding_x: f32,
    /// Gap between a portrait's bottom edge and the message-box top, in pixels.
    pub gap_y: f32,
    /// Fraction of the space above the message box a region may use.
    /// Clamped to [0.10, 1.00] at use time.
    pub height_rate: f32,
    /// Speaker-emphasis mode: non-speaker slots are dimmed.
    pub dim_enabled: bool,
    /// Brightness applied to non-speaker slots while dim mode is active.
    pub dim_brightness: f32,
    /// Frames over which brightness converges toward its target.
    pub dim_fade_frames: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            fade_in_frames: 30,
            fade_out_frames: 30,
            padding_x: 8.0,
            gap_y: 8.0,
            height_rate: 0.85,
            dim_enabled: false,
            dim_brightness: 0.7,
            dim_fade_frames: 15,
        }
    }
}

impl StageConfig {
    /// `height_rate` with the use-time safety clamp applied.
    pub fn clamped_height_rate(&self) -> f32 {
        self.height_rate.clamp(0.10, 1.00)
    }

    /// Fade-in duration, never below one frame.
    pub fn fade_in(&self) -> u32 {
        self.fade_in_frames.max(1)
    }

    /// Fade-out duration, never below one frame.
    pub fn fade_out(&self) -> u32 {
        self.fade_out_frames.max(1)
    }
}

// ── Overlay configuration ────────────────────────────────────────────────────

/// Static configuration for the debug overlay window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub show_frame: bool,
    /// Background opacity, 0–255.
    pub back_opacity: u8,
    pub show_party: bool,
    pub show_variables: bool,
    pub show_switches: bool,
    /// Variable ids to display, as a comma-separated list (e.g. `"1,2,3"`).
    pub variable_ids: String,
    /// Switch ids to display, as a comma-separated list.
    pub switch_ids: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            window_width: 260,
            window_height: 370,
            show_frame: true,
            back_opacity: 10,
            show_party: true,
            show_variables: true,
            show_switches: true,
            variable_ids: "1,2,3,4,5".to_string(),
            switch_ids: "1,2,3,4,5".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn variable_id_list(&self) -> Vec<u32> {
        parse_id_list(&self.variable_ids)
    }

    pub fn switch_id_list(&self) -> Vec<u32> {
        parse_id_list(&self.switch_ids)
    }
}

/// Parse `"1, 2,3"` into `[1, 2, 3]`. Non-numeric and non-positive entries
/// are dropped silently.
pub fn parse_id_list(input: &str) -> Vec<u32> {
    input
        .split(',')
        .filter_map(|tok| tok.trim().parse::<u32>().ok())
        .filter(|&id| id > 0)
        .collect()
}

// ── Top-level document ───────────────────────────────────────────────────────

/// The whole plugin-configuration document.
///
/// Every field has a default, so an empty JSON object (or a document with
/// only one section) is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub stage: StageConfig,
    pub overlay: OverlayConfig,
}

impl PluginConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
