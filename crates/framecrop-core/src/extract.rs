//! Crop extraction: map the on-screen viewport back to source pixels.
//!
//! # Mapping
//!
//! At zoom 1 the image fills the frame width, so one frame pixel covers
//! `natural_width / frame_width` source pixels. With zoom applied:
//!
//! ```text
//! scale = natural_width / (frame_width * zoom)
//! x     = -offset_x * scale
//! y     = -offset_y * scale
//! w     = frame_width * scale
//! h     = frame_height * scale
//! ```
//!
//! Before any interaction the transform is ignored and a centred 3:4 crop is
//! taken instead.
//!
//! # Rounding
//!
//! Start edges are rounded up and end edges rounded down, then the result is
//! clamped into the image and to a minimum of 1×1 (see [`snap_to_pixels`]).
//! Adjacent extractions therefore never overlap, and sampling never reads
//! outside the source. The snapped rectangle may drift marginally from 3:4;
//! the final scale-to-fill absorbs it.

use crate::decode::DecodedImage;
use crate::geometry::{
    FrameSize, ImageSize, Rect, SourceRect, Transform, FRAME_ASPECT, OUTPUT_HEIGHT, OUTPUT_WIDTH,
};
use crate::raster::{RasterError, Rasterizer};

/// Centred crop at the output aspect ratio, in fractional source pixels.
///
/// Wider images keep full height and lose equal side margins; taller images
/// keep full width and lose equal top/bottom margins.
pub fn center_crop_rect(image: ImageSize) -> Rect {
    let (aw, ah) = FRAME_ASPECT;
    let target = aw as f64 / ah as f64;
    let w = image.width as f64;
    let h = image.height as f64;

    if image.aspect() > target {
        let crop_w = h * target;
        Rect::new((w - crop_w) / 2.0, 0.0, crop_w, h)
    } else {
        let crop_h = w / target;
        Rect::new(0.0, (h - crop_h) / 2.0, w, crop_h)
    }
}

/// Source-space rectangle currently visible through the frame.
pub fn viewport_crop_rect(image: ImageSize, frame: FrameSize, transform: Transform) -> Rect {
    let scale = image.width as f64 / (frame.width * transform.zoom);
    Rect::new(
        -transform.offset_x * scale,
        -transform.offset_y * scale,
        frame.width * scale,
        frame.height * scale,
    )
}

/// Snap a fractional rectangle to a valid, non-empty, in-bounds pixel rectangle.
///
/// Start coordinates round up, end coordinates round down. Negative starts
/// clamp to 0, sizes to at least 1, and sizes shrink so the rectangle ends
/// at the image edge at most. `image` must be non-empty.
pub fn snap_to_pixels(rect: Rect, image: ImageSize) -> SourceRect {
    let (x, width) = snap_axis(rect.x, rect.right(), image.width);
    let (y, height) = snap_axis(rect.y, rect.bottom(), image.height);
    SourceRect::new(x, y, width, height)
}

fn snap_axis(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let limit = i64::from(limit.max(1));
    let start_px = finite_or_zero(start).ceil() as i64;
    let end_px = finite_or_zero(end).floor() as i64;

    let mut size = end_px - start_px;
    let start_px = start_px.clamp(0, limit - 1);
    size = size.max(1);
    if start_px + size > limit {
        size = limit - start_px;
    }
    (start_px as u32, size as u32)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Pixel rectangle to sample for the given viewport state.
pub fn source_rect(
    image: ImageSize,
    frame: FrameSize,
    transform: Transform,
    interacted: bool,
) -> SourceRect {
    let rect = if interacted {
        viewport_crop_rect(image, frame, transform)
    } else {
        center_crop_rect(image)
    };
    snap_to_pixels(rect, image)
}

/// Extract the visible region into a fixed 900×1200 raster.
///
/// Deterministic for identical inputs. Degenerate geometry is corrected by
/// [`snap_to_pixels`]; only a rasterizer failure is reported.
pub fn extract(
    image: &DecodedImage,
    frame: FrameSize,
    transform: Transform,
    interacted: bool,
    rasterizer: &dyn Rasterizer,
) -> Result<DecodedImage, RasterError> {
    let src = source_rect(image.size(), frame, transform, interacted);
    tracing::debug!(
        x = src.x,
        y = src.y,
        width = src.width,
        height = src.height,
        interacted,
        "extracting crop"
    );
    rasterizer.draw_region(image, src, OUTPUT_WIDTH, OUTPUT_HEIGHT)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
