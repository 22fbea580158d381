//! Tunables for the crop viewport and export pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;

/// Default upper zoom bound, as a multiple of the base zoom.
pub const DEFAULT_MAX_ZOOM_FACTOR: f64 = 5.0;

/// Errors raised when validating a [`CropConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_zoom_factor must be a finite value >= 1, got {0}")]
    InvalidZoomFactor(f64),

    #[error("min_pinch_distance must be finite and non-negative, got {0}")]
    InvalidPinchDistance(f64),
}

/// Viewport and export settings.
///
/// Every field has a default, so a partial JSON/JS object is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Zoom ceiling relative to the image's base zoom.
    pub max_zoom_factor: f64,
    /// Resampling filter used when scaling the cropped region to the output.
    pub filter: FilterType,
    /// Pinch baselines shorter than this (display pixels) are ignored.
    pub min_pinch_distance: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            max_zoom_factor: DEFAULT_MAX_ZOOM_FACTOR,
            filter: FilterType::Lanczos3,
            min_pinch_distance: 1.0,
        }
    }
}

impl CropConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_zoom_factor.is_finite() || self.max_zoom_factor < 1.0 {
            return Err(ConfigError::InvalidZoomFactor(self.max_zoom_factor));
        }
        if !self.min_pinch_distance.is_finite() || self.min_pinch_distance < 0.0 {
            return Err(ConfigError::InvalidPinchDistance(self.min_pinch_distance));
        }
        Ok(())
    }
}
