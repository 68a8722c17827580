// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interactive widget: ties the model, layout, animation, persistence, and input together.

use alloc::{boxed::Box, string::String};
use core::fmt;
use kurbo::{Point, Size, Vec2};
use understory_tree_layout::{
    ImageSource, LayoutEngine, NoImages, NodeId, NodeSpec, TreeModel, VisibleMatrix,
    node_at_point,
};

use crate::animation::{AnimationController, Begin, has_motion};
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::input::{Modifiers, PanGesture};
use crate::paint::{DisplayList, Renderer, paint};
use crate::snapshot::{NodeSnapshot, Reconciliation, persist, reconcile};
use crate::store::{MemoryStore, SnapshotStore, StorageKey};

/// Callback receiving a copy of the clicked node.
pub type ClickCallback<D> = Box<dyn FnMut(&NodeSnapshot<D>)>;

/// Result of [`TreeGraph::load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    /// How the new tree related to the stored snapshot.
    pub reconciliation: Reconciliation,
    /// Total number of nodes in the new tree.
    pub nodes: usize,
    /// Whether a fly-in animation started. Drive it with [`TreeGraph::frame`].
    pub animating: bool,
}

/// Result of [`TreeGraph::click`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Dropped: an animation is in flight or the click ends a drag.
    Ignored,
    /// No node under the pointer.
    Missed,
    /// Secondary click delivered for the node; fold state untouched.
    Secondary(NodeId),
    /// A childless node was clicked. `notice` is set when no click callback is registered.
    Leaf {
        /// The clicked node.
        node: NodeId,
        /// Fallback notice for hosts without a click callback.
        notice: Option<String>,
    },
    /// The node is expanding; the click callback fires once the animation settles.
    Expanding(NodeId),
    /// The node is collapsing; the click callback fires once the animation settles.
    Collapsing(NodeId),
}

/// Result of [`TreeGraph::pointer_move`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerFeedback {
    /// Ignored while an animation is in flight.
    Ignored,
    /// The hovered node changed; hosts typically update the cursor.
    Hover(Option<NodeId>),
    /// Still hovering the same node (or still nothing).
    HoverUnchanged,
    /// The whole diagram was panned by this delta and repainted.
    Panned(Vec2),
}

/// Work to run once the current render settles.
#[derive(Clone, Copy, Debug)]
enum AfterRender {
    Nothing,
    Persist,
    /// Persist, then report the click on `target`.
    Click { target: NodeId },
    /// Second phase of a collapse: hide the children and settle the layout.
    FinishCollapse { target: NodeId },
    /// Second phase of collapse-all: settle the root-only layout.
    FinishCollapseAll,
}

#[derive(Debug)]
struct InFlight {
    matrix: VisibleMatrix,
    then: AfterRender,
}

/// An interactive, collapsible tree diagram.
///
/// `TreeGraph` owns a [`TreeModel`] and drives it through layout, animation, and
/// persistence in response to host calls. It never blocks and never spawns anything: the
/// host forwards pointer events, calls [`frame`](Self::frame) with a millisecond clock
/// while [`needs_frame`](Self::needs_frame) is true, and draws through its [`Renderer`].
///
/// At most one layout/animation cycle is in flight. Interactive requests arriving during a
/// cycle are dropped, not queued; entry points report this by returning `false` (or
/// [`ClickOutcome::Ignored`]).
///
/// Fold state and pan position are persisted to a [`SnapshotStore`] under a [`StorageKey`]
/// after every change, and carried over when a structurally identical tree is loaded again.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Size};
/// use understory_tree_graph::{
///     ClickOutcome, DisplayList, GraphConfig, MemoryStore, Modifiers, StorageKey, TreeGraph,
/// };
/// use understory_tree_layout::{MonospaceMetrics, NodeSpec};
///
/// let mut graph = TreeGraph::new(
///     GraphConfig::default(),
///     DisplayList::new(MonospaceMetrics::default()),
///     MemoryStore::new(),
///     StorageKey::for_instance("docs"),
/// )
/// .with_viewport(Size::new(800.0, 600.0));
///
/// let spec: NodeSpec = NodeSpec::new("root").child(NodeSpec::new("a").child(NodeSpec::new("a.1")));
/// graph.load(spec).unwrap();
///
/// // Drive the fly-in to completion.
/// let mut now = 0;
/// while graph.needs_frame() {
///     graph.frame(now);
///     now += 16;
/// }
///
/// let a = graph.model().node(graph.visible_matrix().row(1)[0]).unwrap();
/// let outcome = graph.click(a.rect().center(), Modifiers::empty());
/// assert!(matches!(outcome, ClickOutcome::Expanding(_)));
/// ```
pub struct TreeGraph<D = (), R = DisplayList, S = MemoryStore> {
    config: GraphConfig,
    model: TreeModel<D>,
    engine: LayoutEngine,
    animation: AnimationController,
    pan: PanGesture,
    renderer: R,
    store: S,
    key: StorageKey,
    images: Box<dyn ImageSource>,
    viewport: Size,
    hovered: Option<NodeId>,
    in_flight: Option<InFlight>,
    on_click: Option<ClickCallback<D>>,
    on_secondary_click: Option<ClickCallback<D>>,
}

impl<D, R, S> fmt::Debug for TreeGraph<D, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeGraph")
            .field("key", &self.key)
            .field("nodes", &self.model.count_nodes())
            .field("viewport", &self.viewport)
            .field("busy", &self.animation.is_busy())
            .field("hovered", &self.hovered)
            .field("pan_active", &self.pan.is_active())
            .finish_non_exhaustive()
    }
}

impl<D: Clone, R: Renderer, S: SnapshotStore> TreeGraph<D, R, S> {
    /// Creates an empty widget drawing with `renderer` and persisting to `store` under `key`.
    pub fn new(config: GraphConfig, renderer: R, store: S, key: StorageKey) -> Self {
        Self {
            model: TreeModel::new(config.sizing),
            engine: LayoutEngine::new(config.layout),
            animation: AnimationController::new(config.animation_ms),
            pan: PanGesture::new(config.drag_debounce_ms),
            config,
            renderer,
            store,
            key,
            images: Box::new(NoImages),
            viewport: Size::ZERO,
            hovered: None,
            in_flight: None,
            on_click: None,
            on_secondary_click: None,
        }
    }

    /// Resolves node images with `source` on subsequent loads.
    #[must_use]
    pub fn with_images(mut self, source: impl ImageSource + 'static) -> Self {
        self.images = Box::new(source);
        self
    }

    /// Sets the initial viewport size.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Registers the callback for plain clicks on any node.
    ///
    /// For nodes with children it fires after the expand or collapse animation settles.
    pub fn on_click(&mut self, callback: impl FnMut(&NodeSnapshot<D>) + 'static) -> &mut Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    /// Registers the callback for clicks made with the secondary modifier held.
    pub fn on_secondary_click(
        &mut self,
        callback: impl FnMut(&NodeSnapshot<D>) + 'static,
    ) -> &mut Self {
        self.on_secondary_click = Some(Box::new(callback));
        self
    }

    /// Replaces the displayed tree with `spec`.
    ///
    /// If the stored snapshot describes the same tree, its fold state is restored and, if the
    /// diagram had been panned, nodes fly to their stored positions. Otherwise the new tree is
    /// stored with default fold state and laid out around the root anchor.
    ///
    /// Fails with [`GraphError::Busy`] while an animation is in flight, and with a persistence
    /// error if the fresh snapshot cannot be written.
    pub fn load(&mut self, spec: NodeSpec<D>) -> Result<LoadOutcome, GraphError> {
        if self.animation.is_busy() {
            return Err(GraphError::Busy);
        }
        self.model.load(spec, &self.renderer, &mut *self.images);
        self.hovered = None;

        let (reconciliation, previous) = reconcile(&mut self.model, &mut self.store, &self.key)?;
        tracing::debug!(?reconciliation, nodes = self.model.count_nodes(), "tree loaded");

        let matrix = self.model.visible_matrix();
        self.engine.arrange(&mut self.model, &matrix);
        match previous {
            Some(previous) if previous.root_position() != Point::ZERO => {
                previous.schedule_positions(&mut self.model);
            }
            _ => self.engine.anchor_root(&mut self.model, &matrix, self.viewport),
        }
        self.render(matrix, AfterRender::Nothing);

        Ok(LoadOutcome {
            reconciliation,
            nodes: self.model.count_nodes(),
            animating: self.animation.is_busy(),
        })
    }

    /// Repaints the current state without recomputing the layout.
    pub fn redraw(&mut self) -> bool {
        let matrix = self.model.visible_matrix();
        self.render(matrix, AfterRender::Nothing)
    }

    /// Records a new viewport size and repaints.
    ///
    /// The diagram is not re-anchored; the next layout change uses the new size.
    pub fn resize(&mut self, viewport: Size) -> bool {
        self.viewport = viewport;
        self.redraw()
    }

    /// Clears the drawing surface.
    pub fn clear(&mut self) {
        self.renderer.clear();
    }

    /// Collapses the whole tree.
    ///
    /// Every visible node first converges on the root anchor; then the root-only layout
    /// settles and the result is persisted.
    pub fn collapse_all(&mut self) -> bool {
        if self.animation.is_busy() {
            return false;
        }
        let Some(root) = self.model.root() else {
            return false;
        };
        let matrix = self.model.visible_matrix();
        let start = Point::new(0.0, self.config.layout.y_node_padding);
        for id in matrix.iter() {
            if let Some(node) = self.model.node_mut(id) {
                node.scheduled = Some(start);
            }
        }
        self.engine.anchor_root(&mut self.model, &matrix, self.viewport);
        self.model.collapse_all();
        tracing::debug!(root = root.get(), "collapsing all");
        self.render(matrix, AfterRender::FinishCollapseAll)
    }

    /// Expands every node that has children, lays out, animates, and persists.
    pub fn expand_all(&mut self) -> bool {
        if self.animation.is_busy() || self.model.is_empty() {
            return false;
        }
        self.model.expand_all();
        let matrix = self.model.visible_matrix();
        self.engine.layout(&mut self.model, &matrix, self.viewport);
        self.render(matrix, AfterRender::Persist)
    }

    /// Total number of nodes, visible or not.
    pub fn count_nodes(&self) -> usize {
        self.model.count_nodes()
    }

    /// Pointer pressed at `at`. Returns false if ignored because an animation is in flight.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        if self.animation.is_busy() {
            return false;
        }
        if let Some(moved) = self.pan.press(at) {
            tracing::debug!(moved, "drag ended by a new press");
            if moved {
                self.persist_logged();
            }
        }
        true
    }

    /// Pointer moved to `at`.
    ///
    /// While pressed this pans every visible node by the pointer delta and repaints at once,
    /// without animation. Otherwise it tracks the hovered node.
    pub fn pointer_move(&mut self, at: Point) -> PointerFeedback {
        if self.animation.is_busy() {
            return PointerFeedback::Ignored;
        }
        if let Some(delta) = self.pan.drag_to(at) {
            let matrix = self.model.visible_matrix();
            self.model.translate(&matrix, delta);
            self.paint_frame(&matrix, 1.0);
            return PointerFeedback::Panned(delta);
        }
        let matrix = self.model.visible_matrix();
        let target = node_at_point(&self.model, &matrix, at, self.config.hit_overscan);
        if target == self.hovered {
            PointerFeedback::HoverUnchanged
        } else {
            self.hovered = target;
            PointerFeedback::Hover(target)
        }
    }

    /// Pointer released at `at`, time `now` in milliseconds.
    ///
    /// The pan is persisted and clicks are accepted again once the drag debounce has passed;
    /// keep calling [`frame`](Self::frame) until [`needs_frame`](Self::needs_frame) is false.
    pub fn pointer_up(&mut self, at: Point, now: u64) -> bool {
        if !self.pan.release(now) {
            return false;
        }
        let matrix = self.model.visible_matrix();
        self.hovered = node_at_point(&self.model, &matrix, at, self.config.hit_overscan);
        true
    }

    /// Pointer left the surface: ends any drag immediately and persists it.
    pub fn pointer_leave(&mut self) {
        self.hovered = None;
        if let Some(moved) = self.pan.cancel() {
            tracing::debug!(moved, "drag cancelled");
            if moved {
                self.persist_logged();
            }
        }
    }

    /// Click at `at` with `modifiers` held.
    ///
    /// With the secondary modifier the secondary callback fires and nothing else happens.
    /// Otherwise a node with children toggles: the layout is recomputed, the clicked box is
    /// pinned under the pointer, the change animates, and once it settles the new state is
    /// persisted and the click callback fires. A childless node fires the click callback at
    /// once, or yields the configured notice if none is registered.
    pub fn click(&mut self, at: Point, modifiers: Modifiers) -> ClickOutcome {
        if self.animation.is_busy() || self.pan.suppresses_click() {
            return ClickOutcome::Ignored;
        }
        let matrix = self.model.visible_matrix();
        let Some(target) = node_at_point(&self.model, &matrix, at, self.config.hit_overscan)
        else {
            return ClickOutcome::Missed;
        };

        if modifiers.contains(self.config.secondary_modifier) {
            self.fire_secondary_click(target);
            return ClickOutcome::Secondary(target);
        }

        let Some(node) = self.model.node(target) else {
            return ClickOutcome::Missed;
        };
        if !node.has_children() {
            if self.on_click.is_some() {
                self.fire_click(target);
                return ClickOutcome::Leaf {
                    node: target,
                    notice: None,
                };
            }
            tracing::info!(node = target.get(), "{}", self.config.leaf_notice);
            return ClickOutcome::Leaf {
                node: target,
                notice: Some(self.config.leaf_notice.clone()),
            };
        }

        if node.expanded {
            self.begin_collapse(target);
            ClickOutcome::Collapsing(target)
        } else {
            self.begin_expand(target);
            ClickOutcome::Expanding(target)
        }
    }

    fn begin_expand(&mut self, target: NodeId) {
        let Some(node) = self.model.node_mut(target) else {
            return;
        };
        node.expanded = true;
        let origin = node.position;
        for id in self.model.descendants(target) {
            if let Some(node) = self.model.node_mut(id) {
                node.position = origin;
            }
        }
        let matrix = self.model.visible_matrix();
        self.engine.arrange(&mut self.model, &matrix);
        self.engine.pin(&mut self.model, &matrix, target);
        self.render(matrix, AfterRender::Click { target });
    }

    fn begin_collapse(&mut self, target: NodeId) {
        // Lay out the collapsed tree to learn where the clicked node lands.
        self.set_expanded(target, false);
        let collapsed = self.model.visible_matrix();
        self.engine.arrange(&mut self.model, &collapsed);
        self.set_expanded(target, true);

        // Children shrink into that spot while still visible.
        let landing = self.model.node(target).and_then(|n| n.scheduled);
        for id in self.model.descendants(target) {
            if let Some(node) = self.model.node_mut(id) {
                node.scheduled = landing;
            }
        }
        let matrix = self.model.visible_matrix();
        self.engine.pin(&mut self.model, &matrix, target);
        self.render(matrix, AfterRender::FinishCollapse { target });
    }

    fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.model.node_mut(id) {
            node.expanded = expanded;
        }
    }

    /// Advances animations and the drag debounce to `now` (milliseconds).
    pub fn frame(&mut self, now: u64) {
        if let Some(moved) = self.pan.poll(now) {
            tracing::debug!(moved, "drag ended");
            if moved {
                self.persist_logged();
            }
        }

        let Some(pct) = self.animation.tick(now) else {
            return;
        };
        if let Some(flight) = &self.in_flight {
            paint(
                &self.model,
                &flight.matrix,
                pct,
                &self.config.paint,
                &self.config.sizing,
                &mut self.renderer,
            );
        }
        if pct >= 1.0
            && let Some(flight) = self.in_flight.take()
        {
            self.model.commit(&flight.matrix);
            self.after_render(flight.then);
        }
    }

    /// Returns true while the host should keep calling [`frame`](Self::frame).
    pub fn needs_frame(&self) -> bool {
        self.animation.is_busy() || self.pan.deadline().is_some()
    }

    /// Returns true while a layout/animation cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.animation.is_busy()
    }

    /// The loaded tree.
    pub fn model(&self) -> &TreeModel<D> {
        &self.model
    }

    /// Visible nodes grouped by depth, derived from the current fold state.
    pub fn visible_matrix(&self) -> VisibleMatrix {
        self.model.visible_matrix()
    }

    /// Node currently under the pointer, as of the last pointer event.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Current viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Configuration in use.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Storage key of this instance.
    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// The drawing backend.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The drawing backend, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The persistence backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts a render of `matrix`, running `then` once it settles.
    fn render(&mut self, matrix: VisibleMatrix, then: AfterRender) -> bool {
        let moving = has_motion(&self.model, &matrix);
        match self.animation.begin(moving) {
            Begin::Dropped => false,
            Begin::Settled => {
                self.paint_frame(&matrix, 1.0);
                self.model.commit(&matrix);
                self.after_render(then);
                true
            }
            Begin::Animating => {
                self.in_flight = Some(InFlight { matrix, then });
                true
            }
        }
    }

    fn after_render(&mut self, then: AfterRender) {
        match then {
            AfterRender::Nothing => {}
            AfterRender::Persist => self.persist_logged(),
            AfterRender::Click { target } => {
                self.persist_logged();
                self.fire_click(target);
            }
            AfterRender::FinishCollapse { target } => {
                self.set_expanded(target, false);
                let matrix = self.model.visible_matrix();
                self.engine.arrange(&mut self.model, &matrix);
                self.engine.pin(&mut self.model, &matrix, target);
                self.render(matrix, AfterRender::Click { target });
            }
            AfterRender::FinishCollapseAll => {
                let matrix = self.model.visible_matrix();
                self.engine.layout(&mut self.model, &matrix, self.viewport);
                self.render(matrix, AfterRender::Persist);
            }
        }
    }

    fn paint_frame(&mut self, matrix: &VisibleMatrix, pct: f64) {
        paint(
            &self.model,
            matrix,
            pct,
            &self.config.paint,
            &self.config.sizing,
            &mut self.renderer,
        );
    }

    fn persist_logged(&mut self) {
        if let Err(err) = persist(&self.model, &mut self.store, &self.key) {
            tracing::error!(key = self.key.as_str(), %err, "failed to persist tree");
        }
    }

    fn fire_click(&mut self, target: NodeId) {
        if let Some(callback) = self.on_click.as_mut()
            && let Some(snapshot) = NodeSnapshot::capture(&self.model, target)
        {
            callback(&snapshot);
        }
    }

    fn fire_secondary_click(&mut self, target: NodeId) {
        if let Some(callback) = self.on_secondary_click.as_mut()
            && let Some(snapshot) = NodeSnapshot::capture(&self.model, target)
        {
            callback(&snapshot);
        }
    }
}
