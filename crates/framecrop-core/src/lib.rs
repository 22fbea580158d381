//! Framecrop Core - crop viewport library
//!
//! This crate provides the core of Framecrop: a pan/zoom viewport over a
//! source image that always covers a fixed 3:4 frame, the gesture handling
//! that drives it, the mapping from the on-screen viewport back to source
//! pixels, and the batch session that walks a queue of images to a list of
//! 900×1200 outputs.
//!
//! # Module Structure
//!
//! - `gesture` - pointer contacts to pan/pinch updates
//! - `viewport` - zoom/offset state and the cover clamp
//! - `extract` - viewport to source-rectangle mapping and extraction
//! - `session` - Idle/Editing/Done batch state machine
//! - `raster` - region sampling behind the `Rasterizer` trait
//! - `decode` / `encode` - image acquisition and PNG export

pub mod config;
pub mod decode;
pub mod encode;
pub mod extract;
pub mod geometry;
pub mod gesture;
pub mod raster;
pub mod session;
pub mod viewport;

pub use config::{ConfigError, CropConfig};
pub use decode::{decode_image, DecodeError, DecodedImage, FilterType};
pub use encode::{encode_png, EncodeError};
pub use extract::{extract, snap_to_pixels, source_rect};
pub use geometry::{
    FrameSize, ImageSize, Point, Rect, SourceRect, Transform, OUTPUT_HEIGHT, OUTPUT_WIDTH,
};
pub use gesture::{GestureController, GesturePhase, PointerId};
pub use raster::{ImageRasterizer, RasterError, Rasterizer};
pub use session::{
    CommitOutcome, CommitRequest, CommitTicket, CropSession, CroppedImage, LoadTicket,
    SessionError, SessionPhase,
};
pub use viewport::{Viewport, ViewportError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode, pan, commit and export one image end to end.
    #[test]
    fn test_single_image_round_trip() {
        let pixels: Vec<u8> = (0..120 * 90 * 3).map(|i| (i % 200) as u8).collect();
        let png = encode_png(&pixels, 120, 90).unwrap();

        let mut config = CropConfig::default();
        config.filter = FilterType::Bilinear;
        let mut session = CropSession::new(config).unwrap();
        session.set_frame(FrameSize::from_width(300.0));
        let ticket = session.begin_load();
        session
            .complete_load(ticket, decode_image(&png).map(|img| vec![img]))
            .unwrap();

        session.pointer_down(1, Point::new(150.0, 200.0));
        session.pointer_move(1, Point::new(120.0, 200.0));
        session.pointer_up(1);

        assert_eq!(
            session.commit().unwrap(),
            CommitOutcome::Finished { count: 1 }
        );

        let output = &session.outputs()[0];
        assert_eq!(output.image().width, OUTPUT_WIDTH);
        assert_eq!(output.image().height, OUTPUT_HEIGHT);

        let files = session.export_png().unwrap();
        assert_eq!(files[0].0, "output-1.png");
        let reread = decode_image(&files[0].1).unwrap();
        assert_eq!(&reread, output.image());
    }
}
