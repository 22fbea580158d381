//! Pointer gesture classification: one contact pans, two contacts pinch-zoom.
//!
//! The controller owns the set of active contacts and the baselines captured
//! when a gesture begins. Every move is turned into a proposed offset or zoom
//! relative to that baseline, not to the previous event, and handed to the
//! [`Viewport`] which clamps it.
//!
//! # Contact Rules
//!
//! - 1st contact: records the pan anchor (pointer position + current offset)
//! - 2nd contact: records the pinch baseline (distance + current zoom); the
//!   pan anchor is dropped
//! - 3rd and later contacts are tracked but never move the viewport
//! - Lifting back to two contacts re-baselines the pinch; lifting back to one
//!   re-anchors the pan at the current offset

use std::collections::BTreeMap;

use crate::geometry::Point;
use crate::viewport::Viewport;

/// Identifier of a pointer/touch contact as reported by the input source.
pub type PointerId = i32;

/// What the active contacts are currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// No contacts down.
    Rest,
    /// One contact dragging the image.
    Pan,
    /// Two contacts scaling the image.
    Pinch,
    /// More than two contacts; input is ignored until some lift.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnchor {
    pointer: Point,
    offset_x: f64,
    offset_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchBaseline {
    distance: f64,
    zoom: f64,
}

/// Tracks contacts and converts their movement into viewport updates.
#[derive(Debug, Clone)]
pub struct GestureController {
    contacts: BTreeMap<PointerId, Point>,
    pan: Option<PanAnchor>,
    pinch: Option<PinchBaseline>,
    min_pinch_distance: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl GestureController {
    /// Create a controller; pinches starting closer than `min_pinch_distance`
    /// wait until the contacts spread before taking a baseline.
    pub fn new(min_pinch_distance: f64) -> Self {
        Self {
            contacts: BTreeMap::new(),
            pan: None,
            pinch: None,
            min_pinch_distance,
        }
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_active(&self, id: PointerId) -> bool {
        self.contacts.contains_key(&id)
    }

    pub fn is_at_rest(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn phase(&self) -> GesturePhase {
        match self.contacts.len() {
            0 => GesturePhase::Rest,
            1 => GesturePhase::Pan,
            2 => GesturePhase::Pinch,
            _ => GesturePhase::Ignored,
        }
    }

    /// Register a new contact.
    ///
    /// A repeated start for an already active id only refreshes its position.
    pub fn contact_start(&mut self, id: PointerId, position: Point, viewport: &Viewport) {
        if let Some(existing) = self.contacts.get_mut(&id) {
            *existing = position;
            return;
        }
        self.contacts.insert(id, position);
        self.rebaseline(viewport);
    }

    /// Update a contact's position and apply the resulting pan or zoom.
    ///
    /// Returns `true` when the viewport transform changed. Moves for unknown
    /// ids are ignored.
    pub fn contact_move(&mut self, id: PointerId, position: Point, viewport: &mut Viewport) -> bool {
        match self.contacts.get_mut(&id) {
            Some(existing) => *existing = position,
            None => return false,
        }

        let before = viewport.transform();
        match self.contacts.len() {
            1 => {
                if let Some(anchor) = self.pan {
                    let dx = position.x - anchor.pointer.x;
                    let dy = position.y - anchor.pointer.y;
                    viewport.set_offset(anchor.offset_x + dx, anchor.offset_y + dy);
                }
            }
            2 => {
                let distance = self.pair_distance();
                match self.pinch {
                    Some(baseline) => {
                        viewport.set_zoom(baseline.zoom * (distance / baseline.distance));
                    }
                    None => self.start_pinch(distance, viewport),
                }
            }
            _ => {}
        }
        viewport.transform() != before
    }

    /// Remove a contact (lift or cancel).
    pub fn contact_end(&mut self, id: PointerId, viewport: &Viewport) {
        if self.contacts.remove(&id).is_none() {
            return;
        }
        self.rebaseline(viewport);
        if self.contacts.is_empty() {
            tracing::debug!("gesture at rest");
        }
    }

    /// Drop all contacts, e.g. when the edited image changes.
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.pan = None;
        self.pinch = None;
    }

    fn rebaseline(&mut self, viewport: &Viewport) {
        self.pan = None;
        self.pinch = None;
        match self.contacts.len() {
            1 => {
                if let Some(&pointer) = self.contacts.values().next() {
                    let t = viewport.transform();
                    self.pan = Some(PanAnchor {
                        pointer,
                        offset_x: t.offset_x,
                        offset_y: t.offset_y,
                    });
                }
            }
            2 => {
                let distance = self.pair_distance();
                self.start_pinch(distance, viewport);
            }
            _ => {}
        }
    }

    fn start_pinch(&mut self, distance: f64, viewport: &Viewport) {
        if distance.is_finite() && distance > 0.0 && distance >= self.min_pinch_distance {
            let zoom = viewport.transform().zoom;
            tracing::debug!(distance, zoom, "pinch baseline");
            self.pinch = Some(PinchBaseline { distance, zoom });
        }
    }

    fn pair_distance(&self) -> f64 {
        let mut points = self.contacts.values();
        match (points.next(), points.next()) {
            (Some(a), Some(b)) => a.distance_to(*b),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CropConfig;
    use crate::geometry::{FrameSize, ImageSize};

    /// Tall image: base zoom 1, free vertical travel of 200px.
    fn tall_viewport() -> Viewport {
        Viewport::new(
            FrameSize::new(300.0, 400.0),
            ImageSize::new(1000, 2000),
            &CropConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_contact_pans() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();
        let start_y = vp.transform().offset_y;

        gestures.contact_start(1, Point::new(100.0, 100.0), &vp);
        assert_eq!(gestures.phase(), GesturePhase::Pan);
        assert!(gestures.contact_move(1, Point::new(100.0, 150.0), &mut vp));

        assert!((vp.transform().offset_y - (start_y + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pan_is_relative_to_anchor() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();
        let start_y = vp.transform().offset_y;

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_move(1, Point::new(0.0, 30.0), &mut vp);
        gestures.contact_move(1, Point::new(0.0, 20.0), &mut vp);

        assert!((vp.transform().offset_y - (start_y + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_move(1, Point::new(500.0, 5000.0), &mut vp);

        assert_eq!(vp.transform().offset_x, 0.0);
        assert_eq!(vp.transform().offset_y, 0.0);
    }

    #[test]
    fn test_pinch_scales_from_baseline() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(100.0, 200.0), &vp);
        gestures.contact_start(2, Point::new(200.0, 200.0), &vp);
        assert_eq!(gestures.phase(), GesturePhase::Pinch);

        gestures.contact_move(2, Point::new(250.0, 200.0), &mut vp);
        assert!((vp.transform().zoom - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_is_capped_at_five_times_base() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(10.0, 0.0), &vp);
        gestures.contact_move(2, Point::new(1000.0, 0.0), &mut vp);

        assert_eq!(vp.transform().zoom, 5.0);
    }

    #[test]
    fn test_pinch_cannot_go_below_base() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(100.0, 0.0), &vp);
        assert!(!gestures.contact_move(2, Point::new(20.0, 0.0), &mut vp));

        assert_eq!(vp.transform().zoom, 1.0);
    }

    #[test]
    fn test_second_contact_abandons_pan() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();
        let before = vp.transform();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(100.0, 0.0), &vp);
        // Contact 1 swings around contact 2 at constant distance: no pan, no zoom
        gestures.contact_move(1, Point::new(100.0, 100.0), &mut vp);

        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn test_three_contacts_ignored() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(100.0, 0.0), &vp);
        gestures.contact_start(3, Point::new(50.0, 50.0), &vp);
        assert_eq!(gestures.phase(), GesturePhase::Ignored);

        let before = vp.transform();
        assert!(!gestures.contact_move(3, Point::new(400.0, 400.0), &mut vp));
        assert!(!gestures.contact_move(1, Point::new(-50.0, 0.0), &mut vp));
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn test_lift_to_one_resumes_pan_without_jump() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(100.0, 0.0), &vp);
        gestures.contact_move(2, Point::new(200.0, 0.0), &mut vp);
        gestures.contact_end(2, &vp);
        assert_eq!(gestures.phase(), GesturePhase::Pan);

        let before = vp.transform();
        // First move after the lift at the same spot leaves the transform alone
        gestures.contact_move(1, Point::new(0.0, 0.0), &mut vp);
        assert_eq!(vp.transform(), before);

        gestures.contact_move(1, Point::new(0.0, -10.0), &mut vp);
        assert!((vp.transform().offset_y - (before.offset_y - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_contacts_defer_baseline() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(50.0, 50.0), &vp);
        gestures.contact_start(2, Point::new(50.0, 50.0), &vp);
        // Baseline taken here, at distance 10
        gestures.contact_move(2, Point::new(60.0, 50.0), &mut vp);
        assert_eq!(vp.transform().zoom, 1.0);

        gestures.contact_move(2, Point::new(70.0, 50.0), &mut vp);
        assert!((vp.transform().zoom - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_contact_ignored() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();
        assert!(!gestures.contact_move(9, Point::new(10.0, 10.0), &mut vp));
        gestures.contact_end(9, &vp);
        assert!(gestures.is_at_rest());
    }

    #[test]
    fn test_all_lifted_is_rest() {
        let vp = tall_viewport();
        let mut gestures = GestureController::default();

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(2, Point::new(10.0, 0.0), &vp);
        gestures.contact_end(1, &vp);
        gestures.contact_end(2, &vp);

        assert!(gestures.is_at_rest());
        assert_eq!(gestures.phase(), GesturePhase::Rest);
    }

    #[test]
    fn test_repeated_start_refreshes_position() {
        let mut vp = tall_viewport();
        let mut gestures = GestureController::default();
        let start_y = vp.transform().offset_y;

        gestures.contact_start(1, Point::new(0.0, 0.0), &vp);
        gestures.contact_start(1, Point::new(0.0, 40.0), &vp);
        assert_eq!(gestures.active_contacts(), 1);

        // Anchor is still the original down position
        gestures.contact_move(1, Point::new(0.0, 40.0), &mut vp);
        assert!((vp.transform().offset_y - (start_y + 40.0)).abs() < 1e-9);
    }
}
