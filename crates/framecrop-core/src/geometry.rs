//! Geometry value types shared by the viewport, gesture and extraction code.
//!
//! # Coordinate System
//!
//! - Frame and offsets are in display pixels, origin at the frame's top-left
//! - Source rectangles are in natural image pixels, origin at top-left
//! - A positive offset moves the image right/down inside the frame

use serde::{Deserialize, Serialize};

/// Output aspect ratio as (width, height).
pub const FRAME_ASPECT: (u32, u32) = (3, 4);

/// Output raster width in pixels.
pub const OUTPUT_WIDTH: u32 = 900;

/// Output raster height in pixels.
pub const OUTPUT_HEIGHT: u32 = 1200;

/// Measured size of the on-screen crop frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a 3:4 frame from its measured width.
    pub fn from_width(width: f64) -> Self {
        let (aw, ah) = FRAME_ASPECT;
        Self {
            width,
            height: width * ah as f64 / aw as f64,
        }
    }

    /// True when both extents are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        is_positive(self.width) && is_positive(self.height)
    }
}

/// Natural pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// How the source image is displayed inside the frame.
///
/// At `zoom == 1` the image exactly fills the frame width. The image is then
/// scaled by `zoom` about its top-left corner and translated by the offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// A contact position in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A floating-point rectangle, before snapping to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when `other` lies entirely inside this rectangle, within `eps`.
    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        self.x <= other.x + eps
            && self.y <= other.y + eps
            && self.right() + eps >= other.right()
            && self.bottom() + eps >= other.bottom()
    }
}

/// An integer sampling rectangle in natural source pixels.
///
/// Always non-empty and inside the image it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle is non-empty and fits inside `image`.
    pub fn fits_within(&self, image: ImageSize) -> bool {
        self.width >= 1
            && self.height >= 1
            && self.x as u64 + self.width as u64 <= image.width as u64
            && self.y as u64 + self.height as u64 <= image.height as u64
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
