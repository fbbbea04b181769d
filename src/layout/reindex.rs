use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::graph::{Graph, LinkId, NodeId};

/// Old-to-new identifier maps from a reindex run. Consumers use these
/// to translate references they captured before the rewrite.
#[derive(Debug, Clone, Default)]
pub struct ReindexReport {
    pub nodes: BTreeMap<NodeId, NodeId>,
    pub links: BTreeMap<LinkId, LinkId>,
}

/// Renumbers nodes and links into dense layout-order sequences
/// starting at 1. Full-graph mode only; subset layouts keep external
/// identifiers valid and must not come through here.
///
/// Both passes run in two phases. Phase one parks every id above the
/// current maximum, phase two assigns the final 1..n in the same sort
/// order; references are rewritten in lock-step in both phases, so no
/// transient id ever collides with an old or a new one while the
/// registries are rebuilt.
pub fn reindex_graph(graph: &mut Graph, config: &LayoutConfig) -> ReindexReport {
    let node_map = reindex_nodes(graph, config);
    let link_map = reindex_links(graph);
    ReindexReport {
        nodes: node_map,
        links: link_map,
    }
}

fn reindex_nodes(graph: &mut Graph, config: &LayoutConfig) -> BTreeMap<NodeId, NodeId> {
    let mut order: Vec<NodeId> = graph.nodes.keys().copied().collect();
    let tolerance = config.column_tolerance.max(1.0);
    // Near-equal x counts as the same column even though compaction
    // already aligns columns exactly; y decides within a column.
    let quantize = |id: &NodeId| -> (i64, f32) {
        let node = &graph.nodes[id];
        ((node.x / tolerance).round() as i64, node.y)
    };
    order.sort_by(|a, b| {
        let (ax, ay) = quantize(a);
        let (bx, by) = quantize(b);
        ax.cmp(&bx).then(ay.total_cmp(&by)).then(a.cmp(b))
    });

    let max_id = graph.nodes.keys().max().copied().unwrap_or(0);
    let temp: BTreeMap<NodeId, NodeId> = order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, max_id + 1 + rank as NodeId))
        .collect();
    apply_node_map(graph, &temp);

    let finals: BTreeMap<NodeId, NodeId> = order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (temp[&id], 1 + rank as NodeId))
        .collect();
    apply_node_map(graph, &finals);

    order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, 1 + rank as NodeId))
        .collect()
}

fn reindex_links(graph: &mut Graph) -> BTreeMap<LinkId, LinkId> {
    let mut order: Vec<LinkId> = graph.links.keys().copied().collect();
    order.sort_by_key(|id| {
        let link = &graph.links[id];
        (
            link.origin_id,
            link.origin_slot,
            link.target_id,
            link.target_slot,
            link.id,
        )
    });

    let max_id = graph.links.keys().max().copied().unwrap_or(0);
    let temp: BTreeMap<LinkId, LinkId> = order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, max_id + 1 + rank as LinkId))
        .collect();
    apply_link_map(graph, &temp);

    let finals: BTreeMap<LinkId, LinkId> = order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (temp[&id], 1 + rank as LinkId))
        .collect();
    apply_link_map(graph, &finals);

    order
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, 1 + rank as LinkId))
        .collect()
}

fn apply_node_map(graph: &mut Graph, map: &BTreeMap<NodeId, NodeId>) {
    let nodes = std::mem::take(&mut graph.nodes);
    for (old, mut node) in nodes {
        let new = map.get(&old).copied().unwrap_or(old);
        node.id = new;
        graph.nodes.insert(new, node);
    }
    for link in graph.links.values_mut() {
        if let Some(&new) = map.get(&link.origin_id) {
            link.origin_id = new;
        }
        if let Some(&new) = map.get(&link.target_id) {
            link.target_id = new;
        }
    }
    for id in graph.node_order.iter_mut() {
        if let Some(&new) = map.get(id) {
            *id = new;
        }
    }
}

fn apply_link_map(graph: &mut Graph, map: &BTreeMap<LinkId, LinkId>) {
    let links = std::mem::take(&mut graph.links);
    for (old, mut link) in links {
        let new = map.get(&old).copied().unwrap_or(old);
        link.id = new;
        graph.links.insert(new, link);
    }
    for node in graph.nodes.values_mut() {
        for input in node.inputs.iter_mut() {
            if let Some(link) = input.link.as_mut() {
                if let Some(&new) = map.get(link) {
                    *link = new;
                }
            }
        }
        for output in node.outputs.iter_mut() {
            for link in output.links.iter_mut() {
                if let Some(&new) = map.get(link) {
                    *link = new;
                }
            }
        }
    }
    for waypoint in graph.waypoints.values_mut() {
        for link in waypoint.links.iter_mut() {
            if let Some(&new) = map.get(link) {
                *link = new;
            }
        }
    }
}
