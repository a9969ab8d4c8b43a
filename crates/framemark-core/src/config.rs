//! Session configuration.

use crate::frame_clock::{DEFAULT_FRAME_RATE, FrameClock};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::shapes::{ArrowHead, ColorError, SerializableColor, ShapeStyle};
use crate::tools::BuilderLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Invalid default color: {0}")]
    Color(#[from] ColorError),
}

/// Tunables for an annotation session. Every field has a default, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Video frames per second.
    pub frame_rate: f64,
    /// Maximum undo depth.
    pub history_limit: usize,
    /// Rectangles must exceed this width and height.
    pub min_rect_size: f64,
    /// Arrows must exceed this length.
    pub min_arrow_length: f64,
    /// Length of each arrowhead segment.
    pub arrow_head_length: f64,
    /// Angle between shaft and arrowhead segment, in radians.
    pub arrow_head_angle: f64,
    /// Stroke width applied to every new object.
    pub stroke_width: f64,
    /// Quiet period before an edit is written to the frame store.
    pub save_debounce_ms: u64,
    /// Delay between leaving a frame and hydrating the next one.
    pub settle_delay_ms: u64,
    /// Color active when a session starts.
    pub default_color: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        let head = ArrowHead::default();
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            min_rect_size: 5.0,
            min_arrow_length: 10.0,
            arrow_head_length: head.length,
            arrow_head_angle: head.half_angle,
            stroke_width: ShapeStyle::default().stroke_width,
            save_debounce_ms: 100,
            settle_delay_ms: 0,
            default_color: SerializableColor::red().to_hex(),
        }
    }
}

impl AnnotatorConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(invalid("frame_rate", "must be a positive number"));
        }
        if self.history_limit == 0 {
            return Err(invalid("history_limit", "must be at least 1"));
        }
        let non_negative = [
            ("min_rect_size", self.min_rect_size),
            ("min_arrow_length", self.min_arrow_length),
            ("arrow_head_length", self.arrow_head_length),
            ("arrow_head_angle", self.arrow_head_angle),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be zero or positive"));
            }
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(invalid("stroke_width", "must be a positive number"));
        }
        SerializableColor::from_hex(&self.default_color)?;
        Ok(())
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.frame_rate)
    }

    pub fn builder_limits(&self) -> BuilderLimits {
        BuilderLimits {
            min_rect_size: self.min_rect_size,
            min_arrow_length: self.min_arrow_length,
            arrow_head: ArrowHead {
                length: self.arrow_head_length,
                half_angle: self.arrow_head_angle,
            },
        }
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Parsed default color, falling back to red if it does not parse.
    pub fn initial_color(&self) -> SerializableColor {
        SerializableColor::from_hex(&self.default_color).unwrap_or_else(|e| {
            log::warn!("{e}; using red");
            SerializableColor::red()
        })
    }
}
