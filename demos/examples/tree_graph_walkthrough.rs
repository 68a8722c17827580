// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walks a tree graph through load, expand, pan, collapse, and reload.
//!
//! Set `RUST_LOG=debug` to watch animation, drag, and reconciliation progress.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_graph_walkthrough`

use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;
use understory_demos::{StaticImages, SvgRenderer, org_chart};
use understory_tree_graph::{
    ClickOutcome, GraphConfig, MemoryStore, Modifiers, SnapshotStore, StorageKey, TreeGraph,
};
use understory_tree_layout::NodeId;

const VIEWPORT: Size = Size::new(640.0, 360.0);

type Graph<'a> = TreeGraph<u32, SvgRenderer, &'a mut MemoryStore>;

/// Calls `frame` every 16 ms until the widget has nothing left to do.
fn run_frames(graph: &mut Graph<'_>, clock: &mut u64) {
    while graph.needs_frame() {
        graph.frame(*clock);
        *clock += 16;
    }
}

fn node_center(graph: &Graph<'_>, label: &str) -> Option<Point> {
    graph
        .model()
        .iter()
        .find(|node| node.label() == label)
        .map(|node| node.rect().center())
}

fn new_graph(store: &mut MemoryStore) -> Graph<'_> {
    TreeGraph::new(
        GraphConfig::default(),
        SvgRenderer::default(),
        store,
        StorageKey::for_instance("walkthrough"),
    )
    .with_images(StaticImages::default().with("crest.png", Size::new(64.0, 64.0)))
    .with_viewport(VIEWPORT)
}

fn register_callbacks(graph: &mut Graph<'_>) {
    graph
        .on_click(|node| {
            println!(
                "clicked {} (#{}), expanded: {}",
                node.label, node.data, node.expanded
            );
        })
        .on_secondary_click(|node| println!("context menu for {}", node.label));
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = MemoryStore::new();
    let mut clock = 0;
    {
        let mut graph = new_graph(&mut store);
        let outcome = graph.load(org_chart()).expect("fresh load");
        println!("loaded {} nodes ({:?})", outcome.nodes, outcome.reconciliation);
        run_frames(&mut graph, &mut clock);

        // Without a click callback, leaf clicks fall back to the configured notice.
        let finance = node_center(&graph, "Finance").expect("visible");
        if let ClickOutcome::Leaf {
            notice: Some(notice),
            ..
        } = graph.click(finance, Modifiers::empty())
        {
            println!("Finance: {notice}");
        }

        register_callbacks(&mut graph);
        let engineering = node_center(&graph, "Engineering").expect("visible");
        let outcome = graph.click(engineering, Modifiers::empty());
        println!("click on Engineering: {outcome:?}");
        run_frames(&mut graph, &mut clock);

        let graphics = node_center(&graph, "Graphics").expect("visible");
        graph.click(graphics, Modifiers::CTRL);

        let finance = node_center(&graph, "Finance").expect("visible");
        graph.click(finance, Modifiers::empty());

        let grab = Point::new(20.0, 20.0);
        graph.pointer_down(grab);
        graph.pointer_move(grab + Vec2::new(40.0, -10.0));
        graph.pointer_up(grab + Vec2::new(40.0, -10.0), clock);
        run_frames(&mut graph, &mut clock);
        let root = graph.model().node(NodeId::ROOT).expect("root");
        println!("panned root to {:?}", root.position);

        println!("{}", graph.renderer().document(VIEWPORT));
    }

    println!(
        "stored snapshot: {}",
        store.get("TreeGraph_walkthrough").unwrap_or_default()
    );

    let mut graph = new_graph(&mut store);
    register_callbacks(&mut graph);
    let outcome = graph.load(org_chart()).expect("reload");
    run_frames(&mut graph, &mut clock);
    println!(
        "reloaded ({:?}), {} nodes visible",
        outcome.reconciliation,
        graph.visible_matrix().len()
    );

    graph.collapse_all();
    run_frames(&mut graph, &mut clock);
    println!("after collapse all: {} nodes visible", graph.visible_matrix().len());
}
