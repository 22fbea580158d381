//! Batch crop session: sequences a queue of images through the viewport.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --load--> Editing(0) --commit--> Editing(1) ... --commit--> Done
//!   ^                                                                |
//!   +--------------------------- reset (from any state) -------------+
//! ```
//!
//! Each state carries only the data valid in it: a transform exists only
//! while editing, outputs are read-only once done.
//!
//! # Two-phase Operations
//!
//! Decoding and rasterization may complete later than they were requested.
//! `begin_load`/`begin_commit` hand out tickets stamped with the session
//! generation (and the image index for commits); `complete_load`/
//! `complete_commit` reject tickets that no longer match, so a late result
//! can never land in a session that was reset or has moved on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, CropConfig};
use crate::decode::{DecodeError, DecodedImage};
use crate::encode::{encode_png, EncodeError};
use crate::extract::source_rect;
use crate::geometry::{FrameSize, Point, SourceRect, Transform, OUTPUT_HEIGHT, OUTPUT_WIDTH};
use crate::gesture::{GestureController, PointerId};
use crate::raster::{ImageRasterizer, RasterError, Rasterizer};
use crate::viewport::Viewport;

/// Errors reported by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No images were selected")]
    NoImages,

    #[error("Session is not editing")]
    NotEditing,

    #[error("Session is not finished")]
    NotDone,

    #[error("Frame geometry is not available yet")]
    ViewportPending,

    #[error("A commit is already in progress")]
    CommitPending,

    #[error("Result belongs to a previous session state and was discarded")]
    Stale,

    #[error("Failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to rasterize crop: {0}")]
    Raster(#[from] RasterError),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] EncodeError),
}

/// Coarse lifecycle state, for display and bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Editing,
    Done,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Editing => "editing",
            SessionPhase::Done => "done",
        }
    }
}

/// Proof that a load was requested in a given session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Proof that a commit was requested for a given image of a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTicket {
    generation: u64,
    index: usize,
}

impl CommitTicket {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Everything a rasterizer needs to produce the output for one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRequest {
    pub ticket: CommitTicket,
    pub src: SourceRect,
    pub dest_width: u32,
    pub dest_height: u32,
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Moved on to the image at `index`.
    Advanced { index: usize },
    /// Last image committed; `count` outputs are ready.
    Finished { count: usize },
}

/// One exported crop with its stable name (`output-1`, `output-2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    name: String,
    image: DecodedImage,
}

impl CroppedImage {
    fn new(position: usize, image: DecodedImage) -> Self {
        Self {
            name: format!("output-{}", position + 1),
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        encode_png(&self.image.pixels, self.image.width, self.image.height)
    }
}

/// Per-image editing state, rebuilt whenever the index changes.
#[derive(Debug)]
struct ImageEdit {
    /// `None` until valid frame geometry is known.
    viewport: Option<Viewport>,
    gestures: GestureController,
    interacted: bool,
}

#[derive(Debug)]
struct Editing {
    images: Vec<DecodedImage>,
    index: usize,
    outputs: Vec<CroppedImage>,
    edit: ImageEdit,
    pending_commit: Option<CommitTicket>,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Editing(Editing),
    Done { outputs: Vec<CroppedImage> },
}

/// Owns the image queue, the active viewport and the collected outputs.
#[derive(Debug)]
pub struct CropSession {
    config: CropConfig,
    rasterizer: ImageRasterizer,
    frame: Option<FrameSize>,
    generation: u64,
    state: SessionState,
}

impl Default for CropSession {
    fn default() -> Self {
        let config = CropConfig::default();
        Self {
            rasterizer: ImageRasterizer::new(config.filter),
            config,
            frame: None,
            generation: 0,
            state: SessionState::Idle,
        }
    }
}

impl CropSession {
    pub fn new(config: CropConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            rasterizer: ImageRasterizer::new(config.filter),
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Rasterizer used by [`commit`](Self::commit), built from the configured filter.
    pub fn rasterizer(&self) -> &ImageRasterizer {
        &self.rasterizer
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Editing(_) => SessionPhase::Editing,
            SessionState::Done { .. } => SessionPhase::Done,
        }
    }

    /// Monotonic counter bumped on every reset and load request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame(&self) -> Option<FrameSize> {
        self.frame
    }

    /// Index of the image being edited.
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            SessionState::Editing(editing) => Some(editing.index),
            _ => None,
        }
    }

    /// Number of images in the current queue (0 when not editing).
    pub fn image_count(&self) -> usize {
        match &self.state {
            SessionState::Editing(editing) => editing.images.len(),
            _ => 0,
        }
    }

    pub fn current_image(&self) -> Option<&DecodedImage> {
        match &self.state {
            SessionState::Editing(editing) => editing.images.get(editing.index),
            _ => None,
        }
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        match &self.state {
            SessionState::Editing(editing) => editing.edit.viewport.as_ref(),
            _ => None,
        }
    }

    pub fn transform(&self) -> Option<Transform> {
        self.viewport().map(Viewport::transform)
    }

    /// Whether the user has touched the current image.
    pub fn interacted(&self) -> bool {
        match &self.state {
            SessionState::Editing(editing) => editing.edit.interacted,
            _ => false,
        }
    }

    pub fn commit_pending(&self) -> bool {
        matches!(&self.state, SessionState::Editing(e) if e.pending_commit.is_some())
    }

    /// Outputs collected so far, in input order.
    pub fn outputs(&self) -> &[CroppedImage] {
        match &self.state {
            SessionState::Idle => &[],
            SessionState::Editing(editing) => &editing.outputs,
            SessionState::Done { outputs } => outputs,
        }
    }

    /// Record the measured frame size.
    ///
    /// While editing, a changed frame re-initializes the current image's
    /// viewport; a viewport waiting for geometry is initialized now.
    pub fn set_frame(&mut self, frame: FrameSize) {
        let changed = self.frame != Some(frame);
        self.frame = Some(frame);

        let config = &self.config;
        if let SessionState::Editing(editing) = &mut self.state {
            if changed || editing.edit.viewport.is_none() {
                editing.edit = ImageEdit::new(config, Some(frame), &editing.images[editing.index]);
            }
        }
    }

    /// Start loading a new selection; the current session is discarded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.discard("load requested");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// A decode failure aborts to `Idle`; no image is skipped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<DecodedImage>, DecodeError>,
    ) -> Result<(), SessionError> {
        if ticket.generation != self.generation || !matches!(self.state, SessionState::Idle) {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale load"
            );
            return Err(SessionError::Stale);
        }

        let images = match result {
            Ok(images) => images,
            Err(err) => {
                tracing::warn!(error = %err, "decode failed, aborting session");
                self.discard("decode failed");
                return Err(err.into());
            }
        };
        if images.is_empty() {
            return Err(SessionError::NoImages);
        }
        if let Some(empty) = images.iter().find(|img| img.is_empty()) {
            let err = DecodeError::EmptyImage {
                width: empty.width,
                height: empty.height,
            };
            self.discard("empty image");
            return Err(err.into());
        }

        tracing::info!(count = images.len(), "session editing");
        let edit = ImageEdit::new(&self.config, self.frame, &images[0]);
        self.state = SessionState::Editing(Editing {
            images,
            index: 0,
            outputs: Vec::new(),
            edit,
            pending_commit: None,
        });
        Ok(())
    }

    /// Load already-decoded images in one step.
    pub fn load(&mut self, images: Vec<DecodedImage>) -> Result<(), SessionError> {
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(images))
    }

    /// A contact went down on the frame.
    pub fn pointer_down(&mut self, id: PointerId, position: Point) {
        if let Some((gestures, interacted, viewport)) = self.gesture_target() {
            gestures.contact_start(id, position, viewport);
            *interacted = true;
        }
    }

    /// A contact moved. Returns `true` when the transform changed.
    pub fn pointer_move(&mut self, id: PointerId, position: Point) -> bool {
        match self.gesture_target() {
            Some((gestures, interacted, viewport)) => {
                // Hover moves from a pointer that never went down do not count
                if gestures.is_active(id) {
                    *interacted = true;
                }
                gestures.contact_move(id, position, viewport)
            }
            None => false,
        }
    }

    /// A contact lifted or was cancelled.
    pub fn pointer_up(&mut self, id: PointerId) {
        if let Some((gestures, _, viewport)) = self.gesture_target() {
            gestures.contact_end(id, viewport);
        }
    }

    /// Input reaches the current image only while editing with a ready
    /// viewport and no commit in flight.
    fn gesture_target(&mut self) -> Option<(&mut GestureController, &mut bool, &mut Viewport)> {
        let SessionState::Editing(editing) = &mut self.state else {
            return None;
        };
        if editing.pending_commit.is_some() {
            return None;
        }
        let ImageEdit {
            viewport,
            gestures,
            interacted,
        } = &mut editing.edit;
        Some((gestures, interacted, viewport.as_mut()?))
    }

    /// Freeze the current transform into a rasterization request.
    pub fn begin_commit(&mut self) -> Result<CommitRequest, SessionError> {
        let SessionState::Editing(editing) = &mut self.state else {
            return Err(SessionError::NotEditing);
        };
        if editing.pending_commit.is_some() {
            return Err(SessionError::CommitPending);
        }
        let viewport = editing
            .edit
            .viewport
            .as_ref()
            .ok_or(SessionError::ViewportPending)?;

        let src = source_rect(
            viewport.image(),
            viewport.frame(),
            viewport.transform(),
            editing.edit.interacted,
        );
        let ticket = CommitTicket {
            generation: self.generation,
            index: editing.index,
        };
        editing.pending_commit = Some(ticket);

        tracing::debug!(index = editing.index, ?src, "commit requested");
        Ok(CommitRequest {
            ticket,
            src,
            dest_width: OUTPUT_WIDTH,
            dest_height: OUTPUT_HEIGHT,
        })
    }

    /// Finish a commit started with [`begin_commit`](Self::begin_commit).
    ///
    /// A rasterization error leaves outputs and index untouched so the
    /// commit can be retried.
    pub fn complete_commit(
        &mut self,
        ticket: CommitTicket,
        result: Result<DecodedImage, RasterError>,
    ) -> Result<CommitOutcome, SessionError> {
        let generation = self.generation;
        let SessionState::Editing(editing) = &mut self.state else {
            tracing::warn!(index = ticket.index, "discarding commit for inactive session");
            return Err(SessionError::Stale);
        };
        if ticket.generation != generation || editing.pending_commit != Some(ticket) {
            tracing::warn!(
                index = ticket.index,
                current = editing.index,
                "discarding stale commit"
            );
            return Err(SessionError::Stale);
        }
        editing.pending_commit = None;

        let output = result?;
        editing
            .outputs
            .push(CroppedImage::new(editing.index, output));

        if editing.index + 1 < editing.images.len() {
            editing.index += 1;
            editing.edit = ImageEdit::new(&self.config, self.frame, &editing.images[editing.index]);
            tracing::debug!(index = editing.index, "advanced to next image");
            return Ok(CommitOutcome::Advanced {
                index: editing.index,
            });
        }

        let outputs = std::mem::take(&mut editing.outputs);
        let count = outputs.len();
        self.state = SessionState::Done { outputs };
        tracing::info!(count, "session done");
        Ok(CommitOutcome::Finished { count })
    }

    /// Commit the current crop synchronously with the configured filter.
    pub fn commit(&mut self) -> Result<CommitOutcome, SessionError> {
        let rasterizer = self.rasterizer;
        self.commit_with(&rasterizer)
    }

    /// Commit the current crop synchronously through `rasterizer`.
    pub fn commit_with(
        &mut self,
        rasterizer: &dyn Rasterizer,
    ) -> Result<CommitOutcome, SessionError> {
        let request = self.begin_commit()?;
        let result = match self.current_image() {
            Some(image) => {
                rasterizer.draw_region(image, request.src, request.dest_width, request.dest_height)
            }
            None => return Err(SessionError::NotEditing),
        };
        self.complete_commit(request.ticket, result)
    }

    /// Encode every output as PNG, as `(file name, bytes)` in order.
    pub fn export_png(&self) -> Result<Vec<(String, Vec<u8>)>, SessionError> {
        let SessionState::Done { outputs } = &self.state else {
            return Err(SessionError::NotDone);
        };
        outputs
            .iter()
            .map(|output| Ok((output.file_name(), output.encode_png()?)))
            .collect()
    }

    /// Return to `Idle`, dropping images, outputs and transform state.
    pub fn reset(&mut self) {
        self.discard("reset");
    }

    fn discard(&mut self, reason: &str) {
        self.generation += 1;
        if !matches!(self.state, SessionState::Idle) {
            tracing::info!(reason, generation = self.generation, "session idle");
        }
        self.state = SessionState::Idle;
    }
}

impl ImageEdit {
    fn new(config: &CropConfig, frame: Option<FrameSize>, image: &DecodedImage) -> Self {
        let viewport = frame.and_then(|frame| match Viewport::new(frame, image.size(), config) {
            Ok(viewport) => Some(viewport),
            Err(err) => {
                tracing::debug!(error = %err, "deferring viewport initialization");
                None
            }
        });
        Self {
            viewport,
            gestures: GestureController::new(config.min_pinch_distance),
            interacted: false,
        }
    }
}
