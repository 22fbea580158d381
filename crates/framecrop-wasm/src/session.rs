//! Crop session WASM bindings.
//!
//! [`JsCropSession`] wraps the core `CropSession` so the page can forward
//! pointer events, read back the transform for rendering and collect the
//! committed outputs.
//!
//! # Example
//!
//! ```typescript
//! import { JsCropSession } from '@framecrop/wasm';
//!
//! const session = new JsCropSession();
//! session.set_frame(frame.clientWidth, frame.clientHeight);
//!
//! session.begin_load();
//! for (const file of files) {
//!   session.push_image(new Uint8Array(await file.arrayBuffer()));
//! }
//! session.finish_load();
//!
//! frame.onpointermove = (e) => {
//!   if (session.pointer_move(e.pointerId, e.offsetX, e.offsetY)) render();
//! };
//!
//! while (!session.commit()) { /* next image */ }
//! const png = session.output_png(0);
//! ```

use crate::types::{js_error, JsDecodedImage};
use framecrop_core::{
    decode_image, CommitOutcome, CropConfig, CropSession, DecodedImage, FrameSize, LoadTicket,
    Point, Rect, SessionPhase, Transform, Viewport,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Everything the page needs to render one frame, as a plain JS object.
#[derive(Debug, Serialize)]
struct RenderState {
    phase: SessionPhase,
    index: Option<usize>,
    count: usize,
    transform: Option<Transform>,
    display: Option<Rect>,
    interacted: bool,
}

/// Images decoded so far for an in-progress load.
struct PendingLoad {
    ticket: LoadTicket,
    images: Vec<DecodedImage>,
}

#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
    pending: Option<PendingLoad>,
}

impl Default for JsCropSession {
    fn default() -> Self {
        Self {
            inner: CropSession::default(),
            pending: None,
        }
    }
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsCropSession {
        Self::default()
    }

    /// Create a session from a partial config object, e.g.
    /// `{ max_zoom_factor: 4, filter: "bilinear" }`.
    pub fn with_config(config: JsValue) -> Result<JsCropSession, JsValue> {
        let config: CropConfig = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let inner = CropSession::new(config).map_err(js_error)?;
        Ok(Self {
            inner,
            pending: None,
        })
    }

    /// Record the frame's measured size in display pixels.
    pub fn set_frame(&mut self, width: f64, height: f64) {
        self.inner.set_frame(FrameSize::new(width, height));
    }

    /// Start a new load, discarding whatever the session held.
    pub fn begin_load(&mut self) {
        let ticket = self.inner.begin_load();
        self.pending = Some(PendingLoad {
            ticket,
            images: Vec::new(),
        });
    }

    /// Decode one selected file and queue it, in selection order.
    ///
    /// A file that fails to decode aborts the whole load.
    pub fn push_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(js_error("push_image called without begin_load"));
        };
        match decode_image(bytes) {
            Ok(image) => {
                pending.images.push(image);
                Ok(())
            }
            Err(err) => {
                let ticket = pending.ticket;
                self.pending = None;
                self.inner.complete_load(ticket, Err(err)).map_err(js_error)
            }
        }
    }

    /// Hand the queued images to the session and start editing.
    pub fn finish_load(&mut self) -> Result<(), JsValue> {
        let Some(PendingLoad { ticket, images }) = self.pending.take() else {
            return Err(js_error("finish_load called without begin_load"));
        };
        self.inner.complete_load(ticket, Ok(images)).map_err(js_error)
    }

    pub fn pointer_down(&mut self, id: i32, x: f64, y: f64) {
        self.inner.pointer_down(id, Point::new(x, y));
    }

    /// Returns `true` when the transform changed and the image needs redrawing.
    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64) -> bool {
        self.inner.pointer_move(id, Point::new(x, y))
    }

    pub fn pointer_up(&mut self, id: i32) {
        self.inner.pointer_up(id);
    }

    pub fn pointer_cancel(&mut self, id: i32) {
        self.inner.pointer_up(id);
    }

    /// Rasterize the current crop and advance.
    ///
    /// Returns `true` once the last image has been committed.
    pub fn commit(&mut self) -> Result<bool, JsValue> {
        match self.inner.commit().map_err(js_error)? {
            CommitOutcome::Advanced { .. } => Ok(false),
            CommitOutcome::Finished { .. } => Ok(true),
        }
    }

    /// Return to idle, dropping images and outputs.
    pub fn reset(&mut self) {
        self.pending = None;
        self.inner.reset();
    }

    /// `"idle"`, `"editing"` or `"done"`.
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.inner.phase().as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn current_index(&self) -> Option<u32> {
        self.inner.current_index().map(|i| i as u32)
    }

    #[wasm_bindgen(getter)]
    pub fn image_count(&self) -> u32 {
        self.inner.image_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn interacted(&self) -> bool {
        self.inner.interacted()
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.zoom)
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.offset_x)
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.offset_y)
    }

    #[wasm_bindgen(getter)]
    pub fn base_zoom(&self) -> Option<f64> {
        self.inner.viewport().map(Viewport::base_zoom)
    }

    /// Rendered image size in display pixels.
    #[wasm_bindgen(getter)]
    pub fn display_width(&self) -> Option<f64> {
        self.inner.viewport().map(|v| v.display_rect().width)
    }

    #[wasm_bindgen(getter)]
    pub fn display_height(&self) -> Option<f64> {
        self.inner.viewport().map(|v| v.display_rect().height)
    }

    /// Snapshot of phase, index and placement for the renderer.
    pub fn render_state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.snapshot())?)
    }

    /// The image being edited, for drawing into the frame.
    pub fn current_image(&self) -> Option<JsDecodedImage> {
        self.inner
            .current_image()
            .cloned()
            .map(JsDecodedImage::from_decoded)
    }

    #[wasm_bindgen(getter)]
    pub fn output_count(&self) -> u32 {
        self.inner.outputs().len() as u32
    }

    /// Download name of output `index`, e.g. `output-1.png`.
    pub fn output_name(&self, index: u32) -> Option<String> {
        self.inner
            .outputs()
            .get(index as usize)
            .map(|output| output.file_name())
    }

    pub fn output_image(&self, index: u32) -> Option<JsDecodedImage> {
        self.inner
            .outputs()
            .get(index as usize)
            .map(|output| JsDecodedImage::from_decoded(output.image().clone()))
    }

    /// PNG bytes for output `index`.
    pub fn output_png(&self, index: u32) -> Result<Vec<u8>, JsValue> {
        let output = self
            .inner
            .outputs()
            .get(index as usize)
            .ok_or_else(|| js_error(format!("no output at index {index}")))?;
        output.encode_png().map_err(js_error)
    }
}

impl JsCropSession {
    fn snapshot(&self) -> RenderState {
        RenderState {
            phase: self.inner.phase(),
            index: self.inner.current_index(),
            count: self.inner.image_count(),
            transform: self.inner.transform(),
            display: self.inner.viewport().map(Viewport::display_rect),
            interacted: self.inner.interacted(),
        }
    }
}
