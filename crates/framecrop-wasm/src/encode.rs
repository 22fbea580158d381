//! Image encoding WASM bindings.
//!
//! Committed crops are exported as PNG.
//!
//! ```typescript
//! import { encode_png_from_image } from '@framecrop/wasm';
//!
//! const png = encode_png_from_image(image);
//! const blob = new Blob([png], { type: 'image/png' });
//! ```

use crate::types::{js_error, JsDecodedImage};
use framecrop_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data (3 bytes per pixel, row-major) to PNG bytes.
///
/// # Errors
///
/// Returns an error if the pixel data length doesn't match
/// `width * height * 3` or either dimension is zero.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(js_error)
}

/// Encode a JsDecodedImage to PNG bytes.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    let decoded = image.to_decoded();
    encode::encode_png(&decoded.pixels, decoded.width, decoded.height).map_err(js_error)
}
