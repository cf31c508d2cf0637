// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router configuration.
//!
//! Every field is optional in TOML; missing fields take their defaults.
//!
//! ```
//! use glance_router::config::{GazeConfig, TriggerMode};
//!
//! let cfg = GazeConfig::from_toml_str("dwell_threshold = 1.5\ntrigger_mode = \"both\"").unwrap();
//! assert_eq!(cfg.dwell_threshold, 1.5);
//! assert_eq!(cfg.debounce, 0.1);
//! assert_eq!(cfg.trigger_mode, TriggerMode::Both);
//! ```

use std::fs;
use std::path::Path;

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Where trigger edges come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Dwell completion commits.
    #[default]
    Dwell,
    /// An external button drives press and release.
    External,
    /// Both sources are live.
    Both,
}

impl TriggerMode {
    /// Whether dwell completions commit.
    pub fn uses_dwell(self) -> bool {
        matches!(self, Self::Dwell | Self::Both)
    }

    /// Whether the external button is read.
    pub fn uses_external(self) -> bool {
        matches!(self, Self::External | Self::Both)
    }
}

/// Tunables for [`GazeRouter`](crate::router::GazeRouter).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Seconds of continuous gaze before a dwell commit.
    pub dwell_threshold: f64,
    /// Seconds after a release during which presses are rejected.
    pub debounce: f64,
    /// Collider ray length.
    pub max_distance: f32,
    /// Normalized screen position of the gaze point, `[x, y]` in `[0, 1]`.
    pub hotspot: [f64; 2],
    /// Head travel in radians before a held press becomes a drag.
    pub drag_threshold: f64,
    /// Collider layers the ray can hit.
    pub layer_mask: u32,
    /// Trigger source.
    pub trigger_mode: TriggerMode,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            dwell_threshold: 2.0,
            debounce: 0.1,
            max_distance: 100.0,
            hotspot: [0.5, 0.5],
            drag_threshold: 0.02,
            layer_mask: u32::MAX,
            trigger_mode: TriggerMode::Dwell,
        }
    }
}

impl GazeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`GazeConfig::load`], falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("{err}. Using default gaze config");
                Self::default()
            }
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dwell_threshold.is_finite() && self.dwell_threshold > 0.0) {
            return Err(invalid("dwell_threshold", "must be finite and positive"));
        }
        if !(self.debounce.is_finite() && self.debounce >= 0.0) {
            return Err(invalid("debounce", "must be finite and non-negative"));
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            return Err(invalid("max_distance", "must be finite and positive"));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(invalid("drag_threshold", "must be finite and non-negative"));
        }
        if !self.hotspot.iter().all(|v| (0.0..=1.0).contains(v)) {
            return Err(invalid("hotspot", "components must lie in [0, 1]"));
        }
        Ok(())
    }

    /// Gaze point in screen pixels for a viewport of `size`.
    pub fn screen_point(&self, size: Size) -> Point {
        Point::new(size.width * self.hotspot[0], size.height * self.hotspot[1])
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
