use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::error::EngineError;
use crate::graph::NodeId;
use crate::layout::{LayoutMode, compute_layout, reindex_graph, resolve_overlaps};
use crate::protocol::{
    LayoutRequest, LayoutResponse, OverlapEntry, OverlapResponse, PipelineResponse,
    build_snapshot, snapshot_to_request,
};

fn mode_from_request(request: &LayoutRequest) -> LayoutMode {
    match &request.selected_node_ids {
        Some(ids) if !ids.is_empty() => LayoutMode::Selection(ids.iter().copied().collect()),
        _ => LayoutMode::FullGraph,
    }
}

/// Computes a fresh column layout for the request. Failures come back
/// in the `error` field with empty positions, never as partial output.
pub fn organize(request: &LayoutRequest, config: &LayoutConfig) -> LayoutResponse {
    match try_organize(request, config) {
        Ok(response) => response,
        Err(err) => LayoutResponse::failed(err),
    }
}

fn try_organize(
    request: &LayoutRequest,
    config: &LayoutConfig,
) -> Result<LayoutResponse, EngineError> {
    let graph = build_snapshot(request)?;
    let mode = mode_from_request(request);
    let result = compute_layout(&graph, &mode, config);
    Ok(LayoutResponse {
        positions: result.positions,
        sizes: result.sizes,
        error: None,
    })
}

/// Finds links crossing foreign nodes at the request's as-given
/// positions and reports the detour waypoints for each.
pub fn detect_overlaps(request: &LayoutRequest, config: &LayoutConfig) -> OverlapResponse {
    match try_detect_overlaps(request, config) {
        Ok(response) => response,
        Err(err) => OverlapResponse::failed(err),
    }
}

fn try_detect_overlaps(
    request: &LayoutRequest,
    config: &LayoutConfig,
) -> Result<OverlapResponse, EngineError> {
    let mut graph = build_snapshot(request)?;
    let resolutions = resolve_overlaps(&mut graph, config);
    Ok(OverlapResponse {
        overlaps: resolutions.iter().map(OverlapEntry::from).collect(),
        error: None,
    })
}

/// Layout, overlap resolution and (in full-graph mode) reindexing in
/// one pass. Feeding the echoed graph back in reproduces the same
/// response, byte for byte.
pub fn run_pipeline(request: &LayoutRequest, config: &LayoutConfig) -> PipelineResponse {
    match try_run_pipeline(request, config) {
        Ok(response) => response,
        Err(err) => PipelineResponse::failed(err),
    }
}

fn try_run_pipeline(
    request: &LayoutRequest,
    config: &LayoutConfig,
) -> Result<PipelineResponse, EngineError> {
    let mut graph = build_snapshot(request)?;
    let mode = mode_from_request(request);
    let result = compute_layout(&graph, &mode, config);
    graph.apply_layout(&result);

    let resolutions = resolve_overlaps(&mut graph, config);
    let mut overlaps: Vec<OverlapEntry> = resolutions.iter().map(OverlapEntry::from).collect();

    let mut positions = result.positions;
    let mut sizes = result.sizes;
    if matches!(mode, LayoutMode::FullGraph) {
        // Subset runs must keep external identifiers valid, so only a
        // full-graph pass renumbers.
        let report = reindex_graph(&mut graph, config);
        positions = remap_keys(positions, &report.nodes);
        sizes = remap_keys(sizes, &report.nodes);
        for entry in overlaps.iter_mut() {
            if let Some(&new) = report.links.get(&entry.link_id) {
                entry.link_id = new;
            }
        }
    }

    Ok(PipelineResponse {
        positions,
        sizes,
        overlaps,
        graph: snapshot_to_request(&graph),
        error: None,
    })
}

fn remap_keys(
    map: BTreeMap<NodeId, [f32; 2]>,
    ids: &BTreeMap<NodeId, NodeId>,
) -> BTreeMap<NodeId, [f32; 2]> {
    map.into_iter()
        .map(|(id, value)| (ids.get(&id).copied().unwrap_or(id), value))
        .collect()
}

/// JSON-string boundary used by the CLI; parse failures land in the
/// response `error` field like any other engine failure.
pub fn handle_organize(raw: &str, config: &LayoutConfig) -> LayoutResponse {
    match parse_request(raw) {
        Ok(request) => organize(&request, config),
        Err(err) => LayoutResponse::failed(err),
    }
}

pub fn handle_reroute(raw: &str, config: &LayoutConfig) -> OverlapResponse {
    match parse_request(raw) {
        Ok(request) => detect_overlaps(&request, config),
        Err(err) => OverlapResponse::failed(err),
    }
}

pub fn handle_pipeline(raw: &str, config: &LayoutConfig) -> PipelineResponse {
    match parse_request(raw) {
        Ok(request) => run_pipeline(&request, config),
        Err(err) => PipelineResponse::failed(err),
    }
}

fn parse_request(raw: &str) -> Result<LayoutRequest, EngineError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NodeSpec;

    fn request_with_chain() -> LayoutRequest {
        let raw = r#"{
            "nodes": [
                {"id": 1, "type": "a", "pos": [0, 0], "size": [100, 50]},
                {"id": 2, "type": "b", "pos": [500, 300], "size": [100, 50]}
            ],
            "links": [
                {"id": 1, "origin_id": 1, "origin_slot": 0, "target_id": 2, "target_slot": 0, "type": "any"}
            ]
        }"#;
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn organize_reports_positions_for_every_node() {
        let config = LayoutConfig::default();
        let response = organize(&request_with_chain(), &config);
        assert!(response.error.is_none());
        assert_eq!(response.positions.len(), 2);
        assert_eq!(response.sizes.len(), 2);
    }

    #[test]
    fn empty_request_surfaces_error_not_panic() {
        let config = LayoutConfig::default();
        let response = organize(&LayoutRequest::default(), &config);
        assert!(response.error.is_some());
        assert!(response.positions.is_empty());
    }

    #[test]
    fn malformed_json_surfaces_error() {
        let config = LayoutConfig::default();
        let response = handle_organize("{not json", &config);
        assert!(response.error.is_some());
    }

    #[test]
    fn dangling_link_does_not_fail_the_run() {
        let mut request = request_with_chain();
        request.links.push(crate::protocol::LinkSpec {
            id: 99,
            origin_id: 1,
            origin_slot: 0,
            target_id: 12345,
            target_slot: 0,
            kind: String::new(),
        });
        let config = LayoutConfig::default();
        let response = organize(&request, &config);
        assert!(response.error.is_none());
        assert_eq!(response.positions.len(), 2);
    }

    #[test]
    fn selection_mode_skips_reindex() {
        let mut request = request_with_chain();
        request.nodes.push(NodeSpec {
            id: 40,
            kind: "c".to_string(),
            pos: [900.0, 900.0],
            size: [100.0, 50.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        request.selected_node_ids = Some(vec![1, 2]);
        let config = LayoutConfig::default();
        let response = run_pipeline(&request, &config);
        assert!(response.error.is_none());
        // External ids survive a subset run.
        let ids: Vec<u64> = response.graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 40]);
    }

    #[test]
    fn full_pipeline_renumbers_from_one() {
        let raw = r#"{
            "nodes": [
                {"id": 7, "type": "a", "pos": [0, 0], "size": [100, 50]},
                {"id": 2, "type": "b", "pos": [0, 0], "size": [100, 50]},
                {"id": 19, "type": "c", "pos": [0, 0], "size": [100, 50]}
            ],
            "links": [
                {"id": 30, "origin_id": 7, "origin_slot": 0, "target_id": 2, "target_slot": 0, "type": "any"},
                {"id": 10, "origin_id": 2, "origin_slot": 0, "target_id": 19, "target_slot": 0, "type": "any"}
            ]
        }"#;
        let request: LayoutRequest = serde_json::from_str(raw).unwrap();
        let config = LayoutConfig::default();
        let response = run_pipeline(&request, &config);
        assert!(response.error.is_none());

        let node_ids: Vec<u64> = response.positions.keys().copied().collect();
        assert_eq!(node_ids, vec![1, 2, 3]);
        // Chain order 7 -> 2 -> 19 becomes left-to-right 1, 2, 3.
        assert!(response.positions[&1][0] < response.positions[&2][0]);
        assert!(response.positions[&2][0] < response.positions[&3][0]);
        let link_ids: Vec<u64> = response.graph.links.iter().map(|l| l.id).collect();
        assert_eq!(link_ids, vec![1, 2]);
    }
}
