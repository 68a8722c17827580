// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven animation of layout changes.

use kurbo::Point;
use understory_tree_layout::{TreeModel, VisibleMatrix};

/// How a render request was handled by [`AnimationController::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Begin {
    /// Another cycle is in flight; the request was dropped.
    Dropped,
    /// Nothing moves; paint the final state once and finish now.
    Settled,
    /// An animation started; drive it with [`AnimationController::tick`].
    Animating,
}

/// At-most-one animation cycle with a busy guard.
///
/// There is no queue and no cancellation: a request arriving while a cycle is in flight is
/// dropped, and a started cycle always runs to completion. The host calls
/// [`tick`](Self::tick) once per frame with a millisecond clock; the first tick stamps the
/// start time.
///
/// ```
/// use understory_tree_graph::{AnimationController, Begin};
///
/// let mut anim = AnimationController::new(100);
/// assert_eq!(anim.begin(true), Begin::Animating);
/// assert_eq!(anim.begin(true), Begin::Dropped);
///
/// assert_eq!(anim.tick(5_000), Some(0.0));
/// assert_eq!(anim.tick(5_050), Some(0.5));
/// assert_eq!(anim.tick(5_130), Some(1.0));
/// assert!(!anim.is_busy());
/// assert_eq!(anim.tick(5_140), None);
/// ```
#[derive(Clone, Debug)]
pub struct AnimationController {
    duration_ms: u64,
    busy: bool,
    started: Option<u64>,
}

impl AnimationController {
    /// Creates an idle controller whose cycles last `duration_ms`.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            busy: false,
            started: None,
        }
    }

    /// Length of one cycle in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Returns true while a cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Requests a cycle. `has_motion` says whether any node has somewhere to go.
    pub fn begin(&mut self, has_motion: bool) -> Begin {
        if self.busy {
            tracing::debug!("render request dropped while animating");
            return Begin::Dropped;
        }
        if !has_motion {
            return Begin::Settled;
        }
        self.busy = true;
        self.started = None;
        tracing::debug!(duration_ms = self.duration_ms, "animation started");
        Begin::Animating
    }

    /// Advances the cycle to `now` and returns the progress in `0.0..=1.0`.
    ///
    /// Returns `None` when idle. Progress `1.0` completes the cycle and clears the busy flag.
    pub fn tick(&mut self, now: u64) -> Option<f64> {
        if !self.busy {
            return None;
        }
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_sub(started);
        let pct = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        };
        if pct >= 1.0 {
            self.busy = false;
            self.started = None;
            tracing::debug!(elapsed_ms = elapsed, "animation finished");
        }
        Some(pct)
    }
}

/// Returns true if any visible node has a schedule different from where it is.
pub fn has_motion<D>(model: &TreeModel<D>, matrix: &VisibleMatrix) -> bool {
    matrix
        .iter()
        .filter_map(|id| model.node(id))
        .any(|node| node.is_moving())
}

/// Where a node is drawn at progress `pct` between its committed and scheduled positions.
pub fn interpolate(position: Point, scheduled: Option<Point>, pct: f64) -> Point {
    match scheduled {
        Some(target) => position.lerp(target, pct),
        None => position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_tree_layout::{MonospaceMetrics, NoImages, NodeId, NodeSpec};

    #[test]
    fn still_layout_settles_without_going_busy() {
        let mut anim = AnimationController::new(100);
        assert_eq!(anim.begin(false), Begin::Settled);
        assert!(!anim.is_busy());
        assert_eq!(anim.tick(0), None);
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let mut anim = AnimationController::new(100);
        anim.begin(true);
        let mut last = 0.0;
        for now in [10_u64, 35, 60, 99] {
            let pct = anim.tick(now).unwrap();
            assert!(pct >= last, "progress went backwards at {now}");
            assert!(pct < 1.0);
            last = pct;
        }
        assert_eq!(anim.tick(500), Some(1.0));
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let mut anim = AnimationController::new(0);
        assert_eq!(anim.begin(true), Begin::Animating);
        assert_eq!(anim.tick(7), Some(1.0));
        assert!(!anim.is_busy());
    }

    #[test]
    fn new_cycle_restamps_start() {
        let mut anim = AnimationController::new(100);
        anim.begin(true);
        anim.tick(0);
        anim.tick(100);
        anim.begin(true);
        assert_eq!(anim.tick(1_000), Some(0.0), "start time comes from the new cycle");
    }

    #[test]
    fn interpolation_runs_from_committed_to_scheduled() {
        let from = Point::new(0.0, 10.0);
        let to = Some(Point::new(100.0, 30.0));
        assert_eq!(interpolate(from, to, 0.0), from);
        assert_eq!(interpolate(from, to, 0.25), Point::new(25.0, 15.0));
        assert_eq!(interpolate(from, to, 1.0), Point::new(100.0, 30.0));
        assert_eq!(interpolate(from, None, 0.5), from);
    }

    #[test]
    fn motion_is_detected_on_visible_nodes_only() {
        let mut model: TreeModel = TreeModel::default();
        model.load(
            NodeSpec::new("root").child(NodeSpec::new("a").child(NodeSpec::new("hidden"))),
            &MonospaceMetrics::default(),
            &mut NoImages,
        );
        let matrix = model.visible_matrix();
        assert!(!has_motion(&model, &matrix));

        model.node_mut(NodeId::new(2)).unwrap().scheduled = Some(Point::new(1.0, 1.0));
        assert!(!has_motion(&model, &matrix), "hidden node schedules do not count");

        model.node_mut(NodeId::new(1)).unwrap().scheduled = Some(Point::ZERO);
        assert!(!has_motion(&model, &matrix), "scheduled in place is not motion");

        model.node_mut(NodeId::new(1)).unwrap().scheduled = Some(Point::new(0.0, 5.0));
        assert!(has_motion(&model, &matrix));
    }
}
