//! Viewport transform engine.
//!
//! Owns the zoom and offset for the image currently being edited and keeps
//! the scaled image covering the whole frame.
//!
//! # Cover Clamp
//!
//! For one axis with frame extent `F` and scaled image extent `S`:
//!
//! ```text
//! S >= F  =>  offset clamped to [F - S, 0]
//! S <  F  =>  offset = (F - S) / 2
//! ```
//!
//! The second branch is only reachable through floating-point error at the
//! base zoom; the image is centred there instead of clamping against an
//! inverted range.

use thiserror::Error;

use crate::config::CropConfig;
use crate::geometry::{FrameSize, ImageSize, Rect, Transform};

/// Errors raised when a viewport cannot be built.
#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    /// Frame or image has a zero, negative or non-finite extent.
    #[error("Invalid viewport geometry: frame {frame_width}x{frame_height}, image {image_width}x{image_height}")]
    InvalidGeometry {
        frame_width: f64,
        frame_height: f64,
        image_width: u32,
        image_height: u32,
    },
}

/// Minimum zoom at which a width-fitted image covers the frame vertically.
///
/// Returns exactly `1.0` when the width-fitted height already reaches the
/// frame height.
pub fn compute_base_zoom(frame: FrameSize, image: ImageSize) -> f64 {
    let fitted_height = image.height as f64 * frame.width / image.width as f64;
    if fitted_height >= frame.height {
        1.0
    } else {
        frame.height / fitted_height
    }
}

/// Project one axis offset onto the cover-clamp range.
pub fn clamp_axis(frame_extent: f64, scaled_extent: f64, offset: f64) -> f64 {
    if scaled_extent >= frame_extent {
        offset.clamp(frame_extent - scaled_extent, 0.0)
    } else {
        (frame_extent - scaled_extent) / 2.0
    }
}

/// Zoom/offset state for one image inside one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    frame: FrameSize,
    image: ImageSize,
    base_zoom: f64,
    max_zoom: f64,
    transform: Transform,
}

impl Viewport {
    /// Initialize the viewport at the base zoom with the image centred.
    ///
    /// # Errors
    ///
    /// Returns `ViewportError::InvalidGeometry` when either size is unusable;
    /// no clamp is evaluated in that case.
    pub fn new(
        frame: FrameSize,
        image: ImageSize,
        config: &CropConfig,
    ) -> Result<Self, ViewportError> {
        if !frame.is_valid() || !image.is_valid() {
            return Err(ViewportError::InvalidGeometry {
                frame_width: frame.width,
                frame_height: frame.height,
                image_width: image.width,
                image_height: image.height,
            });
        }

        let base_zoom = compute_base_zoom(frame, image);
        let mut viewport = Self {
            frame,
            image,
            base_zoom,
            max_zoom: base_zoom * config.max_zoom_factor,
            transform: Transform {
                zoom: base_zoom,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        };
        viewport.center();

        tracing::debug!(
            frame_width = frame.width,
            frame_height = frame.height,
            image_width = image.width,
            image_height = image.height,
            base_zoom,
            "viewport initialized"
        );
        Ok(viewport)
    }

    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    pub fn image(&self) -> ImageSize {
        self.image
    }

    pub fn base_zoom(&self) -> f64 {
        self.base_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Scaled image extents in display pixels at the current zoom.
    pub fn scaled_size(&self) -> (f64, f64) {
        let zoom = self.transform.zoom;
        let fit_scale = self.frame.width / self.image.width as f64;
        (
            self.frame.width * zoom,
            self.image.height as f64 * fit_scale * zoom,
        )
    }

    /// Where the scaled image sits in frame coordinates.
    pub fn display_rect(&self) -> Rect {
        let (width, height) = self.scaled_size();
        Rect::new(
            self.transform.offset_x,
            self.transform.offset_y,
            width,
            height,
        )
    }

    /// Project a proposed offset onto the cover-clamp range for the current zoom.
    ///
    /// Pure and idempotent.
    pub fn clamp_offset(&self, offset_x: f64, offset_y: f64) -> (f64, f64) {
        let (sw, sh) = self.scaled_size();
        (
            clamp_axis(self.frame.width, sw, offset_x),
            clamp_axis(self.frame.height, sh, offset_y),
        )
    }

    /// Clamp and apply a proposed offset.
    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) {
        let (x, y) = self.clamp_offset(offset_x, offset_y);
        self.transform.offset_x = x;
        self.transform.offset_y = y;
    }

    /// Clamp and apply a proposed zoom, then re-clamp the current offset.
    ///
    /// Non-finite proposals are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.transform.zoom = zoom.clamp(self.base_zoom, self.max_zoom);
        self.set_offset(self.transform.offset_x, self.transform.offset_y);
    }

    /// Return to the base zoom with the image centred.
    pub fn reset(&mut self) {
        self.transform.zoom = self.base_zoom;
        self.center();
    }

    fn center(&mut self) {
        let (sw, sh) = self.scaled_size();
        self.transform.offset_x = (self.frame.width - sw) / 2.0;
        self.transform.offset_y = (self.frame.height - sh) / 2.0;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
