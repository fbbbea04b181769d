mod columns;
mod layering;
mod ordering;
mod overlap;
mod reindex;

pub use columns::round_up_to_grid;
pub use layering::CorrectionReport;
pub use overlap::{OverlapResolution, resolve_overlaps};
pub use reindex::{ReindexReport, reindex_graph};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::LayoutConfig;
use crate::graph::{Graph, LinkId, NodeId};

#[derive(Debug, Clone)]
pub enum LayoutMode {
    /// Lay out every node; the result is translated so the bounding
    /// corner (title bands included) lands at the origin.
    FullGraph,
    /// Lay out only the given nodes; the block keeps the selection's
    /// original bounding corner so surrounding geometry stays put.
    Selection(BTreeSet<NodeId>),
}

#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub positions: BTreeMap<NodeId, [f32; 2]>,
    pub sizes: BTreeMap<NodeId, [f32; 2]>,
    pub correction: CorrectionReport,
    /// Links dropped from the analysis because an endpoint was missing
    /// from the snapshot.
    pub skipped_links: Vec<LinkId>,
}

/// Runs layering, compaction, sequencing and stacking over a snapshot
/// and returns the new geometry. The snapshot itself is not touched;
/// applying the result is the caller's move.
pub fn compute_layout(graph: &Graph, mode: &LayoutMode, config: &LayoutConfig) -> LayoutResult {
    let active: BTreeSet<NodeId> = match mode {
        LayoutMode::FullGraph => graph.nodes.keys().copied().collect(),
        LayoutMode::Selection(ids) => ids
            .iter()
            .copied()
            .filter(|id| graph.nodes.contains_key(id))
            .collect(),
    };
    if active.is_empty() {
        return LayoutResult {
            correction: CorrectionReport {
                converged: true,
                residual: Vec::new(),
            },
            ..LayoutResult::default()
        };
    }

    // Snap sizes to the grid before any width comparison happens.
    let mut sizes: BTreeMap<NodeId, [f32; 2]> = active
        .iter()
        .map(|&id| {
            let node = &graph.nodes[&id];
            (
                id,
                [
                    round_up_to_grid(node.width, config.grid_unit),
                    round_up_to_grid(node.height, config.grid_unit),
                ],
            )
        })
        .collect();

    let order: HashMap<NodeId, usize> = graph
        .node_order
        .iter()
        .enumerate()
        .map(|(index, &id)| (id, index))
        .collect();

    let adjacency = layering::build_adjacency(graph, &active);
    let components = layering::connected_components(&active, &adjacency);

    let mut positions: BTreeMap<NodeId, [f32; 2]> = BTreeMap::new();
    let mut correction = CorrectionReport {
        converged: true,
        residual: Vec::new(),
    };
    let mut blocks = Vec::with_capacity(components.len());
    for component in &components {
        let mut column_of = layering::assign_columns(component, &adjacency, &order);
        let report = layering::correct_leftward(
            &mut column_of,
            component,
            &adjacency,
            config.correction_budget,
        );
        correction.merge(report);
        layering::compress_columns(&mut column_of, component);

        let built = columns::build_columns(component, &column_of, &order, &sizes, config);
        columns::match_column_widths(&built, &mut sizes);
        let extent =
            ordering::place_component(graph, &built, &column_of, &sizes, &mut positions, config);
        blocks.push((component.clone(), extent));
    }

    // Shortest block first; ties keep discovery order.
    blocks.sort_by(|a, b| {
        a.1.height
            .partial_cmp(&b.1.height)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut cursor = 0.0;
    for (members, extent) in &blocks {
        let shift = cursor - extent.top;
        for id in members {
            if let Some(pos) = positions.get_mut(id) {
                pos[1] += shift;
            }
        }
        cursor += extent.height + config.vertical_gap;
    }

    let mut min_x = f32::MAX;
    let mut min_top = f32::MAX;
    for pos in positions.values() {
        min_x = min_x.min(pos[0]);
        min_top = min_top.min(pos[1] - config.title_height);
    }
    let (anchor_x, anchor_y) = match mode {
        LayoutMode::FullGraph => (0.0, 0.0),
        LayoutMode::Selection(_) => {
            let mut x = f32::MAX;
            let mut top = f32::MAX;
            for &id in &active {
                let node = &graph.nodes[&id];
                x = x.min(node.x);
                top = top.min(node.y - config.title_height);
            }
            (x, top)
        }
    };
    let dx = anchor_x - min_x;
    let dy = anchor_y - min_top;
    for pos in positions.values_mut() {
        pos[0] += dx;
        pos[1] += dy;
    }

    tracing::debug!(
        nodes = positions.len(),
        components = components.len(),
        converged = correction.converged,
        "layout computed"
    );

    LayoutResult {
        positions,
        sizes,
        correction,
        skipped_links: adjacency.skipped,
    }
}
