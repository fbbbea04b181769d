use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::{Graph, InputPort, Link, LinkId, Node, NodeId, OutputPort};
use crate::layout::OverlapResolution;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub link: Option<LinkId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub links: Vec<LinkId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub pos: [f32; 2],
    pub size: [f32; 2],
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: LinkId,
    pub origin_id: NodeId,
    pub origin_slot: usize,
    pub target_id: NodeId,
    pub target_slot: usize,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(rename = "selectedNodeIds", default)]
    pub selected_node_ids: Option<Vec<NodeId>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutResponse {
    #[serde(default)]
    pub positions: BTreeMap<NodeId, [f32; 2]>,
    #[serde(default)]
    pub sizes: BTreeMap<NodeId, [f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayoutResponse {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlapEntry {
    pub link_id: LinkId,
    pub reroute1_pos: [f32; 2],
    pub reroute2_pos: [f32; 2],
}

impl From<&OverlapResolution> for OverlapEntry {
    fn from(resolution: &OverlapResolution) -> Self {
        Self {
            link_id: resolution.link_id,
            reroute1_pos: resolution.first,
            reroute2_pos: resolution.second,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlapResponse {
    #[serde(default)]
    pub overlaps: Vec<OverlapEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OverlapResponse {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Full-pipeline response: final geometry after reindexing plus the
/// reroutes, and the graph echoed back so a caller (or the next run)
/// can feed it in again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineResponse {
    #[serde(default)]
    pub positions: BTreeMap<NodeId, [f32; 2]>,
    #[serde(default)]
    pub sizes: BTreeMap<NodeId, [f32; 2]>,
    #[serde(default)]
    pub overlaps: Vec<OverlapEntry>,
    #[serde(default)]
    pub graph: LayoutRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResponse {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Builds the request-scoped snapshot, rejecting structurally unusable
/// input up front so no partial layout can leak out.
pub fn build_snapshot(request: &LayoutRequest) -> Result<Graph, EngineError> {
    if request.nodes.is_empty() {
        return Err(EngineError::InvalidInput("empty node list".to_string()));
    }

    let mut graph = Graph::new();
    for spec in &request.nodes {
        for value in spec.pos.iter().chain(spec.size.iter()) {
            if !value.is_finite() {
                return Err(EngineError::InvalidInput(format!(
                    "node {} has a non-finite position or size",
                    spec.id
                )));
            }
        }
        let node = Node {
            id: spec.id,
            kind: spec.kind.clone(),
            x: spec.pos[0],
            y: spec.pos[1],
            width: spec.size[0],
            height: spec.size[1],
            inputs: spec
                .inputs
                .iter()
                .map(|port| InputPort {
                    name: port.name.clone(),
                    kind: port.kind.clone(),
                    link: port.link,
                })
                .collect(),
            outputs: spec
                .outputs
                .iter()
                .map(|port| OutputPort {
                    name: port.name.clone(),
                    kind: port.kind.clone(),
                    links: port.links.clone(),
                })
                .collect(),
        };
        if graph.nodes.insert(spec.id, node).is_some() {
            return Err(EngineError::InvalidInput(format!(
                "duplicate node id {}",
                spec.id
            )));
        }
        graph.node_order.push(spec.id);
    }

    for spec in &request.links {
        let link = Link {
            id: spec.id,
            origin_id: spec.origin_id,
            origin_slot: spec.origin_slot,
            target_id: spec.target_id,
            target_slot: spec.target_slot,
            kind: spec.kind.clone(),
            parent: None,
        };
        if graph.links.insert(spec.id, link).is_some() {
            return Err(EngineError::InvalidInput(format!(
                "duplicate link id {}",
                spec.id
            )));
        }
    }

    Ok(graph)
}

/// Serializes a snapshot back into request form, node order preserved.
pub fn snapshot_to_request(graph: &Graph) -> LayoutRequest {
    let nodes = graph
        .node_order
        .iter()
        .filter_map(|id| graph.nodes.get(id))
        .map(|node| NodeSpec {
            id: node.id,
            kind: node.kind.clone(),
            pos: [node.x, node.y],
            size: [node.width, node.height],
            inputs: node
                .inputs
                .iter()
                .map(|port| InputSpec {
                    name: port.name.clone(),
                    kind: port.kind.clone(),
                    link: port.link,
                })
                .collect(),
            outputs: node
                .outputs
                .iter()
                .map(|port| OutputSpec {
                    name: port.name.clone(),
                    kind: port.kind.clone(),
                    links: port.links.clone(),
                })
                .collect(),
        })
        .collect();

    let links = graph
        .links
        .values()
        .map(|link| LinkSpec {
            id: link.id,
            origin_id: link.origin_id,
            origin_slot: link.origin_slot,
            target_id: link.target_id,
            target_slot: link.target_slot,
            kind: link.kind.clone(),
        })
        .collect();

    LayoutRequest {
        nodes,
        links,
        selected_node_ids: None,
    }
}
