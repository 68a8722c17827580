// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input state: modifier keys and the drag-to-pan gesture.
//!
//! [`PanGesture`] is a small state machine fed with pointer events and millisecond
//! timestamps. It decides how far the diagram pans on each move, whether a click that
//! arrives right after a drag must be ignored, and when a finished pan should be persisted.
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_tree_graph::PanGesture;
//!
//! let mut pan = PanGesture::new(40);
//! pan.press(Point::new(10.0, 10.0));
//! assert_eq!(pan.drag_to(Point::new(25.0, 5.0)), Some(Vec2::new(15.0, -5.0)));
//! pan.release(1_000);
//!
//! // The trailing click of the drag is swallowed until the debounce runs out.
//! assert!(pan.suppresses_click());
//! assert_eq!(pan.poll(1_020), None);
//! assert_eq!(pan.poll(1_040), Some(true));
//! assert!(!pan.suppresses_click());
//! ```

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Modifier keys held during a click.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Control key.
        const CTRL  = 0b0000_0010;
        /// Alt / Option key.
        const ALT   = 0b0000_0100;
        /// Meta / Command / Windows key.
        const META  = 0b0000_1000;
    }
}

/// Drag-to-pan state.
///
/// A press arms the gesture, every move while armed yields the pointer delta since the last
/// event, and a release starts a debounce window. Clicks are suppressed from the first move
/// until the window closes, so the click a platform synthesizes at the end of a drag does not
/// toggle the node under the pointer.
#[derive(Clone, Debug)]
pub struct PanGesture {
    /// Last pointer position while pressed.
    base: Option<Point>,
    /// The pointer moved during the current press.
    dragged: bool,
    /// When the debounce window after a release closes.
    release_deadline: Option<u64>,
    /// Debounce window length in milliseconds.
    pub debounce_ms: u64,
}

impl PanGesture {
    /// Creates an idle gesture with the given debounce window.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            base: None,
            dragged: false,
            release_deadline: None,
            debounce_ms,
        }
    }

    /// Arms the gesture at `at`.
    ///
    /// A press inside the debounce window of the previous drag ends that drag early. Like
    /// [`cancel`](Self::cancel), it then returns whether the drag moved anything and still
    /// needs to be persisted; otherwise `None`.
    pub fn press(&mut self, at: Point) -> Option<bool> {
        let pending = self
            .release_deadline
            .take()
            .map(|_| core::mem::take(&mut self.dragged));
        self.base = Some(at);
        self.dragged = false;
        pending
    }

    /// Returns true while the pointer is held.
    pub fn is_pressed(&self) -> bool {
        self.base.is_some()
    }

    /// Moves the pointer; returns the pan delta if the gesture is armed.
    pub fn drag_to(&mut self, at: Point) -> Option<Vec2> {
        let base = self.base.as_mut()?;
        let delta = at - *base;
        *base = at;
        self.dragged = true;
        Some(delta)
    }

    /// Releases the pointer at time `now`.
    ///
    /// Returns false if the gesture was not armed.
    pub fn release(&mut self, now: u64) -> bool {
        if self.base.take().is_none() {
            return false;
        }
        self.release_deadline = Some(now.saturating_add(self.debounce_ms));
        true
    }

    /// Returns true if a click arriving now belongs to a drag and must be ignored.
    pub fn suppresses_click(&self) -> bool {
        self.dragged
    }

    /// Returns true while a press is held or a debounce window is open.
    pub fn is_active(&self) -> bool {
        self.base.is_some() || self.release_deadline.is_some()
    }

    /// When the open debounce window closes, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.release_deadline
    }

    /// Advances time. Once the debounce window has closed, the gesture resets and this
    /// returns `Some(moved)` where `moved` says whether the pan should be persisted.
    pub fn poll(&mut self, now: u64) -> Option<bool> {
        let deadline = self.release_deadline?;
        if now < deadline {
            return None;
        }
        self.release_deadline = None;
        Some(core::mem::take(&mut self.dragged))
    }

    /// Ends the gesture immediately, as when the pointer leaves the surface.
    ///
    /// Returns `Some(moved)` if a press or debounce window was cut short.
    pub fn cancel(&mut self) -> Option<bool> {
        if !self.is_active() {
            return None;
        }
        self.base = None;
        self.release_deadline = None;
        Some(core::mem::take(&mut self.dragged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_without_press_do_not_pan() {
        let mut pan = PanGesture::new(40);
        assert_eq!(pan.drag_to(Point::new(5.0, 5.0)), None);
        assert!(!pan.suppresses_click());
        assert!(!pan.release(0), "release without press is ignored");
    }

    #[test]
    fn deltas_are_relative_to_previous_event() {
        let mut pan = PanGesture::new(40);
        pan.press(Point::new(0.0, 0.0));
        assert_eq!(pan.drag_to(Point::new(10.0, 0.0)), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(pan.drag_to(Point::new(30.0, -15.0)), Some(Vec2::new(20.0, -15.0)));
    }

    #[test]
    fn plain_click_is_not_suppressed() {
        let mut pan = PanGesture::new(40);
        pan.press(Point::new(3.0, 3.0));
        assert!(pan.release(100));
        assert!(!pan.suppresses_click());
        assert_eq!(pan.poll(140), Some(false), "nothing to persist without movement");
        assert!(!pan.is_active());
    }

    #[test]
    fn debounce_window_is_inclusive_of_deadline() {
        let mut pan = PanGesture::new(40);
        pan.press(Point::ZERO);
        pan.drag_to(Point::new(1.0, 1.0));
        pan.release(10);
        assert_eq!(pan.deadline(), Some(50));
        assert_eq!(pan.poll(49), None);
        assert!(pan.suppresses_click());
        assert_eq!(pan.poll(50), Some(true));
        assert_eq!(pan.poll(60), None, "fires once");
    }

    #[test]
    fn cancel_ends_drag_immediately() {
        let mut pan = PanGesture::new(40);
        assert_eq!(pan.cancel(), None);
        pan.press(Point::ZERO);
        pan.drag_to(Point::new(4.0, 0.0));
        assert_eq!(pan.cancel(), Some(true));
        assert!(!pan.is_active());
        assert!(!pan.suppresses_click());
    }

    #[test]
    fn press_during_debounce_hands_over_pending_drag() {
        let mut pan = PanGesture::new(40);
        assert_eq!(pan.press(Point::ZERO), None, "nothing pending on a first press");
        pan.drag_to(Point::new(30.0, -15.0));
        pan.release(1_000);

        assert_eq!(pan.press(Point::new(35.0, -10.0)), Some(true));
        assert!(!pan.suppresses_click());
        pan.release(1_010);
        assert_eq!(pan.poll(1_050), Some(false), "the second press never moved");
    }

    #[test]
    fn modifiers_combine() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(!Modifiers::default().contains(Modifiers::CTRL));
    }
}
