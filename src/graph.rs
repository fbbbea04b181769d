use std::collections::BTreeMap;

use crate::config::LayoutConfig;

pub type NodeId = u64;
pub type LinkId = u64;
pub type WaypointId = u64;

#[derive(Debug, Clone)]
pub struct InputPort {
    pub name: String,
    pub kind: String,
    pub link: Option<LinkId>,
}

#[derive(Debug, Clone)]
pub struct OutputPort {
    pub name: String,
    pub kind: String,
    pub links: Vec<LinkId>,
}

/// A workflow node. `(x, y)` is the top-left corner of the body; the
/// title band extends upward by `LayoutConfig::title_height`.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub inputs: Vec<InputPort>,
    pub outputs: Vec<OutputPort>,
}

impl Node {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_with_title(&self, config: &LayoutConfig) -> f32 {
        self.y - config.title_height
    }

    /// Anchor of an output port on the right edge of the body.
    pub fn output_port_pos(&self, slot: usize, config: &LayoutConfig) -> (f32, f32) {
        (self.right(), self.port_y(slot, config))
    }

    /// Anchor of an input port on the left edge of the body.
    pub fn input_port_pos(&self, slot: usize, config: &LayoutConfig) -> (f32, f32) {
        (self.x, self.port_y(slot, config))
    }

    fn port_y(&self, slot: usize, config: &LayoutConfig) -> f32 {
        self.y + config.port_start_offset + slot as f32 * config.port_spacing
    }
}

#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub origin_id: NodeId,
    pub origin_slot: usize,
    pub target_id: NodeId,
    pub target_slot: usize,
    pub kind: String,
    /// Head of the waypoint chain, outermost (closest to the target)
    /// first. `None` renders as a straight segment.
    pub parent: Option<WaypointId>,
}

/// A routing waypoint. Stored in the graph's arena and addressed by
/// identifier; `parent` chains toward the waypoint nearest the link's
/// origin.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub id: WaypointId,
    pub x: f32,
    pub y: f32,
    pub parent: Option<WaypointId>,
    pub links: Vec<LinkId>,
}

/// Request-scoped graph snapshot. Registries are BTreeMaps so every
/// walk over nodes or links is deterministic for identical input.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub links: BTreeMap<LinkId, Link>,
    pub waypoints: BTreeMap<WaypointId, Waypoint>,
    /// Node ids in request order; within-column ordering falls back to
    /// this when the barycenter score gives no signal.
    pub node_order: Vec<NodeId>,
    next_waypoint_id: WaypointId,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_waypoint(
        &mut self,
        x: f32,
        y: f32,
        parent: Option<WaypointId>,
        links: Vec<LinkId>,
    ) -> WaypointId {
        self.next_waypoint_id += 1;
        let id = self.next_waypoint_id;
        self.waypoints.insert(
            id,
            Waypoint {
                id,
                x,
                y,
                parent,
                links,
            },
        );
        id
    }

    /// Drops every waypoint and resets the identifier counter. Runs
    /// before each overlap-resolution pass; stale chains on links are
    /// cleared with it.
    pub fn clear_waypoints(&mut self) {
        self.waypoints.clear();
        self.next_waypoint_id = 0;
        for link in self.links.values_mut() {
            link.parent = None;
        }
    }

    /// Waypoint chain for a link, root (origin side) first.
    pub fn waypoint_chain(&self, link: &Link) -> Vec<WaypointId> {
        let mut chain = Vec::new();
        let mut cursor = link.parent;
        while let Some(id) = cursor {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            cursor = self.waypoints.get(&id).and_then(|wp| wp.parent);
        }
        chain.reverse();
        chain
    }

    pub fn link_endpoints(&self, link: &Link) -> Option<(&Node, &Node)> {
        let origin = self.nodes.get(&link.origin_id)?;
        let target = self.nodes.get(&link.target_id)?;
        Some((origin, target))
    }

    /// Writes a layout result back into the snapshot, mirroring what
    /// the host does with a layout response.
    pub fn apply_layout(&mut self, result: &crate::layout::LayoutResult) {
        for (id, node) in self.nodes.iter_mut() {
            if let Some(&[x, y]) = result.positions.get(id) {
                node.x = x;
                node.y = y;
            }
            if let Some(&[width, height]) = result.sizes.get(id) {
                node.width = width;
                node.height = height;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_node(id: NodeId) -> Node {
        Node {
            id,
            kind: "op".to_string(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn waypoint_ids_restart_after_clear() {
        let mut graph = Graph::new();
        graph.nodes.insert(1, bare_node(1));
        let first = graph.create_waypoint(10.0, 10.0, None, vec![]);
        let second = graph.create_waypoint(20.0, 10.0, Some(first), vec![]);
        assert_eq!((first, second), (1, 2));

        graph.clear_waypoints();
        assert!(graph.waypoints.is_empty());
        assert_eq!(graph.create_waypoint(0.0, 0.0, None, vec![]), 1);
    }

    #[test]
    fn waypoint_chain_walks_root_first() {
        let mut graph = Graph::new();
        let root = graph.create_waypoint(10.0, 0.0, None, vec![7]);
        let head = graph.create_waypoint(90.0, 0.0, Some(root), vec![7]);
        let link = Link {
            id: 7,
            origin_id: 1,
            origin_slot: 0,
            target_id: 2,
            target_slot: 0,
            kind: String::new(),
            parent: Some(head),
        };
        assert_eq!(graph.waypoint_chain(&link), vec![root, head]);
    }

    #[test]
    fn port_anchor_walks_down_by_slot() {
        let node = bare_node(1);
        let config = crate::config::LayoutConfig::default();
        let (x0, y0) = node.output_port_pos(0, &config);
        let (_, y2) = node.output_port_pos(2, &config);
        assert_eq!(x0, node.right());
        assert_eq!(y0, node.y + config.port_start_offset);
        assert_eq!(y2 - y0, 2.0 * config.port_spacing);
    }
}
