//! Source image decoding for Framecrop.
//!
//! This module is the image acquisition boundary: it turns the bytes of a
//! user-selected file into a [`DecodedImage`] with upright natural
//! dimensions, ready to be queued in a [`CropSession`](crate::session::CropSession).
//!
//! # Examples
//!
//! ```ignore
//! use framecrop_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::{decode_image, read_orientation};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
