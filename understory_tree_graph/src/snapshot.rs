// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshots of a loaded tree: the persisted form used to carry fold state across reloads,
//! and the plain copies handed to click callbacks.

use alloc::{string::String, vec::Vec};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use understory_tree_layout::{Node, NodeId, TreeModel};

use crate::error::GraphError;
use crate::store::{SnapshotStore, StorageKey};

/// A persisted coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl From<Point> for PersistedPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PersistedPoint> for Point {
    fn from(p: PersistedPoint) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Serialized form of one node and its subtree.
///
/// Encoded as `{ "label", "isExpanded", "position": { "x", "y" }, "children": [...] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNode {
    /// Node label.
    pub label: String,
    /// Fold state.
    pub is_expanded: bool,
    /// Committed position.
    #[serde(default)]
    pub position: PersistedPoint,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<PersistedNode>,
}

impl PersistedNode {
    /// Captures the whole tree, or `None` if nothing is loaded.
    pub fn capture<D>(model: &TreeModel<D>) -> Option<Self> {
        Self::capture_node(model, model.root()?)
    }

    fn capture_node<D>(model: &TreeModel<D>, id: NodeId) -> Option<Self> {
        let node = model.node(id)?;
        Some(Self {
            label: String::from(node.label()),
            is_expanded: node.expanded,
            position: node.position.into(),
            children: node
                .children()
                .iter()
                .filter_map(|&child| Self::capture_node(model, child))
                .collect(),
        })
    }

    /// Encodes the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(self).map_err(GraphError::Serialize)
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        serde_json::from_str(json).map_err(GraphError::MalformedSnapshot)
    }

    /// Returns true if this snapshot describes the same tree as `model`.
    ///
    /// Nodes are paired by position in the hierarchy, never by id. Every pair must have the
    /// same label and the same number of children; fold state and positions are ignored.
    pub fn matches<D>(&self, model: &TreeModel<D>) -> bool {
        model.root().is_some_and(|root| self.matches_node(model, root))
    }

    fn matches_node<D>(&self, model: &TreeModel<D>, id: NodeId) -> bool {
        let Some(node) = model.node(id) else {
            return false;
        };
        self.label == node.label()
            && self.children.len() == node.children().len()
            && self
                .children
                .iter()
                .zip(node.children())
                .all(|(old, &child)| old.matches_node(model, child))
    }

    /// Copies fold state into `model`, node for node. The trees must [match](Self::matches).
    pub fn apply_folding<D>(&self, model: &mut TreeModel<D>) {
        if let Some(root) = model.root() {
            self.walk(model, root, &mut |old, node| node.expanded = old.is_expanded);
        }
    }

    /// Schedules every node of `model` at its persisted position. The trees must
    /// [match](Self::matches).
    pub fn schedule_positions<D>(&self, model: &mut TreeModel<D>) {
        if let Some(root) = model.root() {
            self.walk(model, root, &mut |old, node| {
                node.scheduled = Some(old.position.into());
            });
        }
    }

    fn walk<D>(
        &self,
        model: &mut TreeModel<D>,
        id: NodeId,
        f: &mut impl FnMut(&Self, &mut Node<D>),
    ) {
        let Some(node) = model.node_mut(id) else {
            return;
        };
        f(self, node);
        let children: Vec<NodeId> = node.children().to_vec();
        for (old, child) in self.children.iter().zip(children) {
            old.walk(model, child, f);
        }
    }

    /// Persisted root position.
    pub fn root_position(&self) -> Point {
        self.position.into()
    }
}

/// Outcome of comparing a freshly loaded tree with the stored snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// No usable snapshot existed; the fresh tree was stored.
    Fresh,
    /// The stored snapshot described the same tree; its fold state was carried over.
    Restored,
    /// The stored snapshot described a different tree and was overwritten.
    Discarded,
}

/// Compares the tree in `model` with the snapshot stored under `key`.
///
/// On a match the stored fold state is copied into `model` and the snapshot is returned so
/// the caller can reuse its positions. Otherwise the fresh tree is written immediately. A
/// snapshot that cannot be decoded counts as absent.
pub fn reconcile<D, S: SnapshotStore + ?Sized>(
    model: &mut TreeModel<D>,
    store: &mut S,
    key: &StorageKey,
) -> Result<(Reconciliation, Option<PersistedNode>), GraphError> {
    let previous = match store.get(key.as_str()) {
        None => None,
        Some(json) => match PersistedNode::from_json(&json) {
            Ok(previous) => Some(previous),
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "ignoring stored snapshot");
                None
            }
        },
    };

    let outcome = match previous {
        Some(previous) if previous.matches(model) => {
            previous.apply_folding(model);
            return Ok((Reconciliation::Restored, Some(previous)));
        }
        Some(_) => Reconciliation::Discarded,
        None => Reconciliation::Fresh,
    };
    persist(model, store, key)?;
    Ok((outcome, None))
}

/// Serializes the whole tree and writes it under `key`. Does nothing for an empty model.
pub fn persist<D, S: SnapshotStore + ?Sized>(
    model: &TreeModel<D>,
    store: &mut S,
    key: &StorageKey,
) -> Result<(), GraphError> {
    let Some(snapshot) = PersistedNode::capture(model) else {
        return Ok(());
    };
    store.set(key.as_str(), snapshot.to_json()?)
}

/// A plain copy of a node handed to click callbacks.
///
/// Holds no reference into the widget, so callbacks may keep it as long as they like.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot<D = ()> {
    /// Node identifier at the time of the click.
    pub id: NodeId,
    /// Label text.
    pub label: String,
    /// User payload.
    pub data: D,
    /// Fill color, if one was supplied.
    pub color: Option<String>,
    /// Depth below the root.
    pub depth: u32,
    /// Image reference, if one was supplied.
    pub image: Option<String>,
    /// Fold state.
    pub expanded: bool,
    /// Snapshots of the children.
    pub children: Vec<NodeSnapshot<D>>,
}

impl<D: Clone> NodeSnapshot<D> {
    /// Copies `id` and its subtree out of `model`.
    pub fn capture(model: &TreeModel<D>, id: NodeId) -> Option<Self> {
        let node = model.node(id)?;
        Some(Self {
            id,
            label: String::from(node.label()),
            data: node.data().clone(),
            color: node.color().map(String::from),
            depth: node.depth(),
            image: node.image().map(String::from),
            expanded: node.expanded,
            children: node
                .children()
                .iter()
                .filter_map(|&child| Self::capture(model, child))
                .collect(),
        })
    }
}
