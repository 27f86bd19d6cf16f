#![forbid(unsafe_code)]

//! Tour appearance and behaviour settings.
//!
//! Defaults give a 320px card with an assumed 200px height, a 16px gap,
//! 20px edge margins and a 4px highlight inset. The mask is 60% black at
//! z 50 under the card at z 60, and off-screen targets get a smooth,
//! centred scroll.
//!
//! # Loading
//!
//! With the `policy-config` feature the config loads from TOML or JSON.
//! Missing keys fall back to defaults.
//!
//! ```toml
//! card_width = 360.0
//! gap = 12.0
//!
//! [scroll]
//! behavior = "instant"
//! inline = "nearest"
//! ```
//!
//! ```rust,ignore
//! let config = TourConfig::from_toml_file("waypoint.toml")?;
//! ```

#[cfg(feature = "policy-config")]
use std::path::Path;

use crate::page::{ScrollAlign, ScrollBehavior, ScrollIntoView};
use crate::placement::CardMetrics;

/// Tour configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TourConfig {
    /// Card width used for placement.
    pub card_width: f64,
    /// Assumed card height used for the vertical flip.
    pub card_height: f64,
    /// Distance between target and card.
    pub gap: f64,
    /// Minimum horizontal distance between card and viewport edges.
    pub edge_margin: f64,
    /// How far the highlight outline sits outside the target.
    pub outline_inset: f64,
    /// Rendered card width is capped at this fraction of the viewport width.
    pub card_max_width_ratio: f64,
    /// Mask opacity in `[0, 1]`.
    pub mask_opacity: f64,
    /// Stacking order of the mask layer.
    pub mask_z_index: i32,
    /// Stacking order of the card. Must sit above the mask.
    pub card_z_index: i32,
    /// Presenter transition duration for mask/outline movement.
    pub transition_ms: u64,
    /// Scroll request issued for off-screen targets.
    pub scroll: ScrollIntoView,
}

impl Default for TourConfig {
    fn default() -> Self {
        let metrics = CardMetrics::default();
        Self {
            card_width: metrics.width,
            card_height: metrics.height,
            gap: metrics.gap,
            edge_margin: metrics.edge_margin,
            outline_inset: 4.0,
            card_max_width_ratio: 0.9,
            mask_opacity: 0.6,
            mask_z_index: 50,
            card_z_index: 60,
            transition_ms: 300,
            scroll: ScrollIntoView::default(),
        }
    }
}

impl TourConfig {
    /// Set card width.
    #[must_use]
    pub fn card_width(mut self, width: f64) -> Self {
        self.card_width = width;
        self
    }

    /// Set the assumed card height.
    #[must_use]
    pub fn card_height(mut self, height: f64) -> Self {
        self.card_height = height;
        self
    }

    /// Set the target/card gap.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the edge margin.
    #[must_use]
    pub fn edge_margin(mut self, margin: f64) -> Self {
        self.edge_margin = margin;
        self
    }

    /// Set the outline inset.
    #[must_use]
    pub fn outline_inset(mut self, inset: f64) -> Self {
        self.outline_inset = inset;
        self
    }

    /// Set mask opacity.
    #[must_use]
    pub fn mask_opacity(mut self, opacity: f64) -> Self {
        self.mask_opacity = opacity;
        self
    }

    /// Set scroll behaviour for off-screen targets.
    #[must_use]
    pub fn scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll.behavior = behavior;
        self
    }

    /// Set scroll alignment for off-screen targets.
    #[must_use]
    pub fn scroll_align(mut self, block: ScrollAlign, inline: ScrollAlign) -> Self {
        self.scroll.block = block;
        self.scroll.inline = inline;
        self
    }

    /// Solver metrics derived from this config.
    #[must_use]
    pub fn card_metrics(&self) -> CardMetrics {
        CardMetrics {
            width: self.card_width,
            height: self.card_height,
            gap: self.gap,
            edge_margin: self.edge_margin,
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("card_width", self.card_width),
            ("card_height", self.card_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be finite and > 0, got {value}"));
            }
        }

        for (name, value) in [
            ("gap", self.gap),
            ("edge_margin", self.edge_margin),
            ("outline_inset", self.outline_inset),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }

        if !(self.card_max_width_ratio > 0.0 && self.card_max_width_ratio <= 1.0) {
            errors.push(format!(
                "card_max_width_ratio must be in (0, 1], got {}",
                self.card_max_width_ratio
            ));
        }

        if !(0.0..=1.0).contains(&self.mask_opacity) {
            errors.push(format!(
                "mask_opacity must be in [0, 1], got {}",
                self.mask_opacity
            ));
        }

        if self.card_z_index <= self.mask_z_index {
            errors.push(format!(
                "card_z_index ({}) must be above mask_z_index ({})",
                self.card_z_index, self.mask_z_index
            ));
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, TourConfigError> {
        let config: Self = toml::from_str(s).map_err(TourConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TourConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TourConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, TourConfigError> {
        let config: Self = serde_json::from_str(s).map_err(TourConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TourConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TourConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a file, choosing the format by extension (`.json` is JSON,
    /// anything else TOML).
    #[cfg(feature = "policy-config")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TourConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Serialize as pretty TOML.
    #[cfg(feature = "policy-config")]
    pub fn to_toml_string(&self) -> Result<String, TourConfigError> {
        toml::to_string_pretty(self).map_err(TourConfigError::TomlSer)
    }

    /// Return `self` if valid, otherwise the collected validation errors.
    pub fn validated(self) -> Result<Self, TourConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(TourConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a tour configuration.
#[derive(Debug)]
pub enum TourConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "policy-config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for TourConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for TourConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
