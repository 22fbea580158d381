//! Framecrop WASM - WebAssembly bindings for Framecrop
//!
//! This crate exposes framecrop-core to the browser page that hosts the crop
//! frame.
//!
//! # Module Structure
//!
//! - `session` - the crop session: frame size, pointer input, commits, outputs
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - image decoding and region sampling bindings
//! - `encode` - PNG export bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@framecrop/wasm';
//!
//! await init();
//! const session = new JsCropSession();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod session;
mod types;

pub use decode::{crop_region, decode_image};
pub use encode::{encode_png, encode_png_from_image};
pub use session::JsCropSession;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "framecrop-wasm {} ready",
        version()
    )));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Output dimensions as `[width, height]`.
#[wasm_bindgen]
pub fn output_size() -> Vec<u32> {
    vec![framecrop_core::OUTPUT_WIDTH, framecrop_core::OUTPUT_HEIGHT]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_output_size_is_three_by_four() {
        let size = output_size();
        assert_eq!(size, vec![900, 1200]);
        assert_eq!(size[0] * 4, size[1] * 3);
    }
}
