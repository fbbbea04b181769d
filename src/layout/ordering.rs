use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::graph::{Graph, NodeId};

use super::columns::Column;

/// Vertical extent of a placed component block in component-local
/// coordinates, title bands included.
#[derive(Debug, Clone, Copy)]
pub(super) struct BlockExtent {
    pub(super) top: f32,
    pub(super) height: f32,
}

/// Orders each column by the barycenter of the output ports feeding it
/// and walks y positions top-down. Nodes the score cannot separate
/// keep request order (the member lists arrive pre-sorted and the sort
/// is stable).
pub(super) fn place_component(
    graph: &Graph,
    columns: &[Column],
    column_of: &HashMap<NodeId, u32>,
    sizes: &BTreeMap<NodeId, [f32; 2]>,
    positions: &mut BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) -> BlockExtent {
    for (index, column) in columns.iter().enumerate() {
        let mut members = column.members.clone();
        if index > 0 {
            sort_by_score(&mut members, |id| {
                incoming_port_score(graph, id, column_of, positions, config)
            });
        }
        walk_column(&members, column.x, sizes, positions, config);
    }

    // The first column has no predecessors, so the forward pass leaves
    // it in request order; once its successors are placed, re-sort it
    // by the input ports it feeds.
    if columns.len() > 1 {
        let mut members = columns[0].members.clone();
        sort_by_score(&mut members, |id| {
            outgoing_port_score(graph, id, column_of, positions, config)
        });
        walk_column(&members, columns[0].x, sizes, positions, config);
    }

    block_extent(columns, sizes, positions, config)
}

fn sort_by_score<F>(members: &mut [NodeId], mut score: F)
where
    F: FnMut(NodeId) -> f32,
{
    let scored: HashMap<NodeId, f32> = members.iter().map(|&id| (id, score(id))).collect();
    members.sort_by(|a, b| {
        scored[a]
            .partial_cmp(&scored[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Mean y of the origin output ports on already-placed predecessors in
/// earlier columns; +inf when there are none, so unscored nodes sink
/// below scored ones without reordering among themselves.
fn incoming_port_score(
    graph: &Graph,
    node: NodeId,
    column_of: &HashMap<NodeId, u32>,
    positions: &BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) -> f32 {
    let Some(&own_column) = column_of.get(&node) else {
        return f32::INFINITY;
    };
    let mut total = 0.0;
    let mut count = 0u32;
    for link in graph.links.values() {
        if link.target_id != node || link.origin_id == node {
            continue;
        }
        let Some(&origin_column) = column_of.get(&link.origin_id) else {
            continue;
        };
        if origin_column >= own_column {
            continue;
        }
        let Some(pos) = positions.get(&link.origin_id) else {
            continue;
        };
        total += port_y(pos[1], link.origin_slot, config);
        count += 1;
    }
    if count == 0 {
        f32::INFINITY
    } else {
        total / count as f32
    }
}

/// Mean y of the input ports a first-column node feeds.
fn outgoing_port_score(
    graph: &Graph,
    node: NodeId,
    column_of: &HashMap<NodeId, u32>,
    positions: &BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) -> f32 {
    let mut total = 0.0;
    let mut count = 0u32;
    for link in graph.links.values() {
        if link.origin_id != node || link.target_id == node {
            continue;
        }
        if !column_of.contains_key(&link.target_id) {
            continue;
        }
        let Some(pos) = positions.get(&link.target_id) else {
            continue;
        };
        total += port_y(pos[1], link.target_slot, config);
        count += 1;
    }
    if count == 0 {
        f32::INFINITY
    } else {
        total / count as f32
    }
}

fn port_y(node_y: f32, slot: usize, config: &LayoutConfig) -> f32 {
    node_y + config.port_start_offset + slot as f32 * config.port_spacing
}

fn walk_column(
    members: &[NodeId],
    x: f32,
    sizes: &BTreeMap<NodeId, [f32; 2]>,
    positions: &mut BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) {
    let mut y = 0.0;
    for &id in members {
        positions.insert(id, [x, y]);
        let height = sizes.get(&id).map(|size| size[1]).unwrap_or(0.0);
        y += height + config.vertical_gap;
    }
}

fn block_extent(
    columns: &[Column],
    sizes: &BTreeMap<NodeId, [f32; 2]>,
    positions: &BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) -> BlockExtent {
    let mut top = f32::MAX;
    let mut bottom = f32::MIN;
    for column in columns {
        for id in &column.members {
            let Some(pos) = positions.get(id) else {
                continue;
            };
            let height = sizes.get(id).map(|size| size[1]).unwrap_or(0.0);
            top = top.min(pos[1] - config.title_height);
            bottom = bottom.max(pos[1] + height);
        }
    }
    if top > bottom {
        return BlockExtent {
            top: 0.0,
            height: 0.0,
        };
    }
    BlockExtent {
        top,
        height: bottom - top,
    }
}
