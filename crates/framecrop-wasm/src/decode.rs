//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG or PNG file, applying EXIF orientation
//! - [`crop_region`] - Sample a source rectangle into a fixed-size image
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@framecrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{filter_from_u8, js_error, JsDecodedImage};
use framecrop_core::{decode, ImageRasterizer, Rasterizer, SourceRect};
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG image from bytes.
///
/// EXIF orientation is applied, so the returned pixels are upright.
///
/// # Errors
///
/// Returns an error if the format is not recognized, the data is corrupted,
/// or the image has no pixels.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Draw the rectangle `(x, y, width, height)` of `image` scaled to
/// `dest_width`×`dest_height`.
///
/// `filter`: 0=Nearest, 1=Bilinear, 2=Lanczos3.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn crop_region(
    image: &JsDecodedImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    dest_width: u32,
    dest_height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    ImageRasterizer::new(filter_from_u8(filter))
        .draw_region(
            &image.to_decoded(),
            SourceRect::new(x, y, width, height),
            dest_width,
            dest_height,
        )
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecrop_core::encode_png;

    #[test]
    fn test_decode_image_png() {
        let png = encode_png(&[200u8; 4 * 3 * 3], 4, 3).unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert!(image.pixels().iter().all(|&b| b == 200));
    }

    #[test]
    fn test_crop_region_output_size() {
        let image = JsDecodedImage::new(8, 8, vec![90u8; 8 * 8 * 3]);
        let out = crop_region(&image, 2, 0, 6, 8, 3, 4, 1).unwrap();
        assert_eq!((out.width(), out.height()), (3, 4));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_crop_region_out_of_bounds() {
        let image = JsDecodedImage::new(4, 4, vec![0u8; 4 * 4 * 3]);
        assert!(crop_region(&image, 2, 2, 4, 4, 3, 4, 0).is_err());
    }
}
