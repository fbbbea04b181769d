use crate::config::LayoutConfig;
use crate::graph::{Graph, LinkId, NodeId};

/// One rerouted link: the two waypoint positions inserted for it and
/// the nodes its straight path crossed.
#[derive(Debug, Clone)]
pub struct OverlapResolution {
    pub link_id: LinkId,
    pub first: [f32; 2],
    pub second: [f32; 2],
    pub obstructions: Vec<NodeId>,
    pub routed_above: bool,
}

/// Detects link paths crossing foreign node rectangles and inserts a
/// two-waypoint detour chain per affected link. Every pre-existing
/// waypoint is discarded first; detection is a full pass, never a
/// diff. Detection runs over an immutable borrow and the arena is
/// mutated only afterwards.
pub fn resolve_overlaps(graph: &mut Graph, config: &LayoutConfig) -> Vec<OverlapResolution> {
    graph.clear_waypoints();
    let plans = plan_detours(graph, config);
    for plan in &plans {
        let first = graph.create_waypoint(plan.first[0], plan.first[1], None, vec![plan.link_id]);
        let second =
            graph.create_waypoint(plan.second[0], plan.second[1], Some(first), vec![plan.link_id]);
        if let Some(link) = graph.links.get_mut(&plan.link_id) {
            link.parent = Some(second);
        }
    }
    plans
}

fn plan_detours(graph: &Graph, config: &LayoutConfig) -> Vec<OverlapResolution> {
    let mut plans = Vec::new();
    // Detours stack outwards: each additional link routed the same way
    // clears the previous one by another step.
    let mut up_offset = config.reroute_clearance;
    let mut down_offset = config.reroute_clearance;

    for (&link_id, link) in &graph.links {
        let Some((origin, target)) = graph.link_endpoints(link) else {
            tracing::warn!(link = link_id, "link endpoints missing, skipping reroute check");
            continue;
        };
        let (origin_x, origin_y) = origin.output_port_pos(link.origin_slot, config);
        let (target_x, target_y) = target.input_port_pos(link.target_slot, config);
        let span_min = origin_x.min(target_x);
        let span_max = origin_x.max(target_x);

        let mut obstructions = Vec::new();
        let mut highest_top = f32::MAX;
        let mut lowest_bottom = f32::MIN;
        for (&node_id, node) in &graph.nodes {
            if node_id == link.origin_id || node_id == link.target_id {
                continue;
            }
            if node.right() < span_min || node.x > span_max {
                continue;
            }
            // Every node in the horizontal span bounds the detour, not
            // only the ones the segment actually crosses.
            let top = node.top_with_title(config);
            highest_top = highest_top.min(top);
            lowest_bottom = lowest_bottom.max(node.bottom());
            if segment_intersects_rect(
                origin_x,
                origin_y,
                target_x,
                target_y,
                node.x,
                top,
                node.width,
                node.height + config.title_height,
            ) {
                obstructions.push(node_id);
            }
        }
        if obstructions.is_empty() {
            continue;
        }

        let higher_y = origin_y.max(target_y);
        let lower_y = origin_y.min(target_y);
        let up_distance = (higher_y - highest_top).max(0.0);
        let down_distance = (lowest_bottom - lower_y).max(0.0);

        let routed_above = up_distance <= down_distance;
        let detour_y = if routed_above {
            let y = highest_top - up_offset;
            up_offset += config.reroute_step;
            y
        } else {
            let y = lowest_bottom + down_offset;
            down_offset += config.reroute_step;
            y
        };

        plans.push(OverlapResolution {
            link_id,
            first: [origin_x + config.reroute_inset, detour_y],
            second: [target_x - config.reroute_inset, detour_y],
            obstructions,
            routed_above,
        });
    }

    plans
}

fn point_in_rect(px: f32, py: f32, x: f32, y: f32, width: f32, height: f32) -> bool {
    px >= x && px <= x + width && py >= y && py <= y + height
}

fn ccw(ax: f32, ay: f32, bx: f32, by: f32, cx: f32, cy: f32) -> bool {
    (cy - ay) * (bx - ax) > (by - ay) * (cx - ax)
}

fn segments_intersect(
    ax1: f32,
    ay1: f32,
    ax2: f32,
    ay2: f32,
    bx1: f32,
    by1: f32,
    bx2: f32,
    by2: f32,
) -> bool {
    let a = ccw(ax1, ay1, bx1, by1, bx2, by2);
    let b = ccw(ax2, ay2, bx1, by1, bx2, by2);
    let c = ccw(ax1, ay1, ax2, ay2, bx1, by1);
    let d = ccw(ax1, ay1, ax2, ay2, bx2, by2);
    a != b && c != d
}

/// Segment/rectangle test: either endpoint inside, or the segment
/// crosses one of the four edges.
pub(crate) fn segment_intersects_rect(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    rect_x: f32,
    rect_y: f32,
    rect_w: f32,
    rect_h: f32,
) -> bool {
    if point_in_rect(x1, y1, rect_x, rect_y, rect_w, rect_h)
        || point_in_rect(x2, y2, rect_x, rect_y, rect_w, rect_h)
    {
        return true;
    }

    let edges = [
        (rect_x, rect_y, rect_x + rect_w, rect_y),
        (rect_x + rect_w, rect_y, rect_x + rect_w, rect_y + rect_h),
        (rect_x, rect_y + rect_h, rect_x + rect_w, rect_y + rect_h),
        (rect_x, rect_y, rect_x, rect_y + rect_h),
    ];
    edges
        .iter()
        .any(|&(ex1, ey1, ex2, ey2)| segments_intersect(x1, y1, x2, y2, ex1, ey1, ex2, ey2))
}
