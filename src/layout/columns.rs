use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::graph::NodeId;

/// Rounds a dimension up to the next multiple of the grid unit.
/// Exact multiples are left alone.
pub fn round_up_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).ceil() * grid
}

#[derive(Debug, Clone)]
pub(super) struct Column {
    pub(super) x: f32,
    pub(super) width: f32,
    /// Members in request order; the sequencer's stable sort preserves
    /// this for nodes the barycenter cannot separate.
    pub(super) members: Vec<NodeId>,
}

/// Groups a component's nodes into columns, widest member winning the
/// column width, and walks x offsets left to right. Column indices are
/// already compressed, so every produced column has members.
pub(super) fn build_columns(
    component: &[NodeId],
    columns: &HashMap<NodeId, u32>,
    order: &HashMap<NodeId, usize>,
    sizes: &BTreeMap<NodeId, [f32; 2]>,
    config: &LayoutConfig,
) -> Vec<Column> {
    let mut grouped: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
    for &id in component {
        let column = columns.get(&id).copied().unwrap_or(0);
        grouped.entry(column).or_default().push(id);
    }

    let mut result = Vec::with_capacity(grouped.len());
    let mut x = 0.0;
    for (_, mut members) in grouped {
        members.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
        let width = members
            .iter()
            .map(|id| sizes.get(id).map(|size| size[0]).unwrap_or(0.0))
            .fold(0.0, f32::max);
        result.push(Column { x, width, members });
        x += width + config.column_gap;
    }
    result
}

/// Sets every member's width to its column's width so the column
/// presents a uniform right edge. Heights stay as rounded.
pub(super) fn match_column_widths(columns: &[Column], sizes: &mut BTreeMap<NodeId, [f32; 2]>) {
    for column in columns {
        for id in &column.members {
            if let Some(size) = sizes.get_mut(id) {
                size[0] = column.width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_snaps_up_and_keeps_multiples() {
        assert_eq!(round_up_to_grid(101.0, 10.0), 110.0);
        assert_eq!(round_up_to_grid(110.0, 10.0), 110.0);
        assert_eq!(round_up_to_grid(0.5, 10.0), 10.0);
    }

    #[test]
    fn widest_member_sets_column_width() {
        let component = vec![1, 2, 3];
        let columns: HashMap<NodeId, u32> = [(1, 0), (2, 0), (3, 1)].into_iter().collect();
        let order: HashMap<NodeId, usize> = [(1, 0), (2, 1), (3, 2)].into_iter().collect();
        let mut sizes: BTreeMap<NodeId, [f32; 2]> = BTreeMap::new();
        sizes.insert(1, [120.0, 40.0]);
        sizes.insert(2, [200.0, 40.0]);
        sizes.insert(3, [80.0, 40.0]);

        let config = LayoutConfig::default();
        let built = build_columns(&component, &columns, &order, &sizes, &config);
        assert_eq!(built.len(), 2);
        assert_eq!(built[0].width, 200.0);
        assert_eq!(built[0].x, 0.0);
        assert_eq!(built[1].x, 200.0 + config.column_gap);

        match_column_widths(&built, &mut sizes);
        assert_eq!(sizes[&1][0], 200.0);
        assert_eq!(sizes[&2][0], 200.0);
        assert_eq!(sizes[&1][1], 40.0);
    }
}
