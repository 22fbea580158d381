//! Output encoding for Framecrop.
//!
//! Cropped rasters are encoded losslessly as PNG so the exported bytes are
//! exactly the pixels produced by the extraction step.
//!
//! # Examples
//!
//! ```ignore
//! use framecrop_core::encode::encode_png;
//!
//! let pixels = vec![128u8; 900 * 1200 * 3];
//! let png_bytes = encode_png(&pixels, 900, 1200).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError};
