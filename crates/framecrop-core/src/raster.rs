//! Rasterization: sample a source rectangle into a fixed-size output.
//!
//! The [`Rasterizer`] trait is the boundary the extraction mapper draws
//! through. [`ImageRasterizer`] is the production implementation on top of
//! the `image` crate's crop and resize operations.

use thiserror::Error;

use crate::decode::{DecodedImage, FilterType};
use crate::geometry::SourceRect;

/// Errors that can occur while drawing a region.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    /// Destination width or height is zero.
    #[error("Invalid destination size: {width}x{height}")]
    InvalidDestination { width: u32, height: u32 },

    /// Source rectangle is empty or leaves the image.
    #[error("Region {rect:?} is outside the {image_width}x{image_height} source")]
    RegionOutOfBounds {
        rect: SourceRect,
        image_width: u32,
        image_height: u32,
    },

    /// The image's pixel buffer does not match its dimensions.
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBufferMismatch { expected: usize, actual: usize },

    /// The backend failed for another reason.
    #[error("Rasterization failed: {0}")]
    Failed(String),
}

/// Draws `src` from `image`, scaled (not cropped) to exactly fill the
/// destination size.
pub trait Rasterizer {
    fn draw_region(
        &self,
        image: &DecodedImage,
        src: SourceRect,
        dest_width: u32,
        dest_height: u32,
    ) -> Result<DecodedImage, RasterError>;
}

/// `image`-crate backed rasterizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageRasterizer {
    filter: FilterType,
}

impl ImageRasterizer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Rasterizer for ImageRasterizer {
    fn draw_region(
        &self,
        image: &DecodedImage,
        src: SourceRect,
        dest_width: u32,
        dest_height: u32,
    ) -> Result<DecodedImage, RasterError> {
        if dest_width == 0 || dest_height == 0 {
            return Err(RasterError::InvalidDestination {
                width: dest_width,
                height: dest_height,
            });
        }
        if !src.fits_within(image.size()) {
            return Err(RasterError::RegionOutOfBounds {
                rect: src,
                image_width: image.width,
                image_height: image.height,
            });
        }

        let source = image
            .to_rgb_image()
            .ok_or(RasterError::PixelBufferMismatch {
                expected: (image.width as usize) * (image.height as usize) * 3,
                actual: image.pixels.len(),
            })?;

        let region =
            image::imageops::crop_imm(&source, src.x, src.y, src.width, src.height).to_image();

        // Fast path: region already has the output size
        if region.dimensions() == (dest_width, dest_height) {
            return Ok(DecodedImage::from_rgb_image(region));
        }

        let scaled = image::imageops::resize(
            &region,
            dest_width,
            dest_height,
            self.filter.to_image_filter(),
        );
        Ok(DecodedImage::from_rgb_image(scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half red, right half blue.
    fn split_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..height {
            for x in 0..width {
                if x < width / 2 {
                    pixels.extend_from_slice(&[255, 0, 0]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255]);
                }
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_draw_region_output_size() {
        let img = split_image(100, 80);
        let out = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(10, 10, 30, 40), 90, 120)
            .unwrap();

        assert_eq!((out.width, out.height), (90, 120));
        assert_eq!(out.pixels.len(), 90 * 120 * 3);
    }

    #[test]
    fn test_draw_region_samples_the_requested_area() {
        let img = split_image(100, 80);
        let rasterizer = ImageRasterizer::new(FilterType::Nearest);

        let left = rasterizer
            .draw_region(&img, SourceRect::new(0, 0, 40, 40), 30, 40)
            .unwrap();
        assert!(left.pixels.chunks(3).all(|p| p == [255, 0, 0]));

        let right = rasterizer
            .draw_region(&img, SourceRect::new(60, 20, 30, 40), 30, 40)
            .unwrap();
        assert!(right.pixels.chunks(3).all(|p| p == [0, 0, 255]));
    }

    #[test]
    fn test_same_size_region_is_copied() {
        let img = split_image(6, 8);
        let out = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(0, 0, 6, 8), 6, 8)
            .unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_offset_region_copies_exact_pixels() {
        let pixels: Vec<u8> = (0..8 * 6 * 3).map(|i| i as u8).collect();
        let img = DecodedImage::new(8, 6, pixels);
        let out = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(3, 2, 3, 4), 3, 4)
            .unwrap();

        for y in 0..4usize {
            for x in 0..3usize {
                let src = ((y + 2) * 8 + (x + 3)) * 3;
                let dst = (y * 3 + x) * 3;
                assert_eq!(out.pixels[dst..dst + 3], img.pixels[src..src + 3]);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_region_is_rejected() {
        let img = split_image(10, 10);
        let err = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(5, 0, 6, 10), 3, 4)
            .unwrap_err();
        assert!(matches!(err, RasterError::RegionOutOfBounds { .. }));
    }

    #[test]
    fn test_zero_destination_is_rejected() {
        let img = split_image(10, 10);
        let err = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(0, 0, 10, 10), 0, 4)
            .unwrap_err();
        assert_eq!(
            err,
            RasterError::InvalidDestination {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 12],
        };
        let err = ImageRasterizer::default()
            .draw_region(&img, SourceRect::new(0, 0, 1, 1), 3, 4)
            .unwrap_err();
        assert!(matches!(err, RasterError::PixelBufferMismatch { .. }));
    }

    #[test]
    fn test_all_filter_types() {
        let img = split_image(64, 48);
        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let out = ImageRasterizer::new(filter)
                .draw_region(&img, SourceRect::new(8, 0, 36, 48), 9, 12)
                .unwrap();
            assert_eq!((out.width, out.height), (9, 12));
        }
    }
}
