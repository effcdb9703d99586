//! Drag Scenario Replay
//!
//! Replays a recorded drag scenario through the real controller, planner and
//! coordinator against an in-memory store, then prints the resulting tree.
//! Useful for reproducing ordering bugs reported from the UI without the UI.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin treedrop-replay -- packages/dev-tools/scenarios/swap_with_failure.json
//!
//! # More detail from the engine
//! RUST_LOG=treedrop_core=debug cargo run --bin treedrop-replay -- <scenario.json>
//! ```
//!
//! # Scenario format
//!
//! ```json
//! {
//!   "config": { "zone_threshold": 0.25 },
//!   "nodes": [{ "id": "A", "kind": "note", "folderId": null, "orderIndex": 0 }],
//!   "failures": ["A"],
//!   "steps": [
//!     { "action": "drag", "node": "A", "moves": [{ "x": 5, "y": 2, "targetCandidates": [] }] },
//!     { "action": "commit", "event": { "type": "nest", "draggedId": "A", "newParentId": "F" } }
//!   ]
//! }
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;
use treedrop_core::config::EngineConfig;
use treedrop_core::db::InMemoryOrderStore;
use treedrop_core::models::{HierarchyNode, SideItem, TreeModel};
use treedrop_core::operations::{DropEvent, PointerEvent};
use treedrop_core::services::DragDropService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    #[serde(default)]
    config: EngineConfig,
    nodes: Vec<SideItem>,
    #[serde(default)]
    failures: Vec<String>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum Step {
    /// Full gesture: start, pointer moves, drop
    Drag {
        node: String,
        #[serde(default)]
        moves: Vec<PointerEvent>,
    },
    /// Terminal event produced elsewhere (keyboard move, context menu)
    Commit { event: DropEvent },
}

/// Print `nodes` as an indented outline, siblings in order
fn print_tree(nodes: &[SideItem]) {
    fn walk(tree: &TreeModel<'_, SideItem>, container: Option<&str>, depth: usize) {
        for node in tree.sorted_siblings(container, None) {
            println!(
                "{}{} [{}] order={}",
                "  ".repeat(depth),
                node.node_id(),
                node.kind(),
                node.order_index()
            );
            walk(tree, Some(node.node_id()), depth + 1);
        }
    }

    let tree = TreeModel::new(nodes);
    walk(&tree, None, 0);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: treedrop-replay <scenario.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;

    let store = Arc::new(InMemoryOrderStore::new());
    for id in &scenario.failures {
        store.fail_on(id.clone()).await;
    }

    let mut service = DragDropService::new(scenario.config, scenario.nodes, store.clone(), || {})?
        .with_notifier(|message: &str| println!("  notify: {}", message));

    println!("Initial tree:");
    print_tree(&service.nodes().snapshot());

    for (ix, step) in scenario.steps.into_iter().enumerate() {
        let result = match step {
            Step::Drag { node, moves } => {
                if let Err(e) = service.begin_drag(&node) {
                    println!("step {}: drag of '{}' refused: {}", ix + 1, node, e);
                    continue;
                }
                for pointer in &moves {
                    let hover = service.drag_move(pointer)?;
                    tracing::debug!(
                        "step {}: hover {:?} {:?}",
                        ix + 1,
                        hover.target_id,
                        hover.zone
                    );
                }
                service.finish_drag()
            }
            Step::Commit { event } => service.commit(&event),
        };

        match result {
            Err(e) => println!("step {}: discarded: {}", ix + 1, e),
            Ok(Some(pending)) => {
                let outcome = pending.wait().await?;
                println!("step {}: {:?}", ix + 1, outcome.state());
            }
            Ok(None) => println!("step {}: no change", ix + 1),
        }
    }

    println!("Final tree ({} store writes):", store.call_count());
    print_tree(&service.nodes().snapshot());
    Ok(())
}
