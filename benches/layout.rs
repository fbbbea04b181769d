use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowtab::protocol::{InputSpec, LayoutRequest, LinkSpec, NodeSpec, OutputSpec};
use flowtab::{LayoutConfig, detect_overlaps, organize, run_pipeline};
use std::hint::black_box;

/// Builds a scrambled chain-with-fanout workflow of the given size.
fn synthetic_workflow(nodes: usize, extra_links: usize) -> LayoutRequest {
    let mut request = LayoutRequest::default();
    for index in 0..nodes {
        let id = (nodes - index) as u64;
        request.nodes.push(NodeSpec {
            id,
            kind: format!("Stage{index}"),
            pos: [((index * 37) % 900) as f32, ((index * 53) % 700) as f32],
            size: [140.0 + (index % 5) as f32 * 17.0, 46.0 + (index % 3) as f32 * 31.0],
            inputs: vec![InputSpec {
                name: "in".to_string(),
                kind: "any".to_string(),
                link: None,
            }],
            outputs: vec![OutputSpec {
                name: "out".to_string(),
                kind: "any".to_string(),
                links: Vec::new(),
            }],
        });
    }

    let mut link_id = 0u64;
    let mut push_link = |request: &mut LayoutRequest, origin: u64, target: u64| {
        link_id += 1;
        request.links.push(LinkSpec {
            id: link_id,
            origin_id: origin,
            origin_slot: 0,
            target_id: target,
            target_slot: 0,
            kind: "any".to_string(),
        });
    };
    for id in 1..nodes as u64 {
        push_link(&mut request, id, id + 1);
    }
    let mut added = 0usize;
    'outer: for origin in 1..nodes as u64 {
        for target in (origin + 2)..=(nodes as u64) {
            if added >= extra_links {
                break 'outer;
            }
            push_link(&mut request, origin, target);
            added += 1;
        }
    }
    request
}

fn bench_layout(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout");
    for (name, nodes, extra) in [("small", 20, 5), ("medium", 100, 40), ("large", 400, 150)] {
        let request = synthetic_workflow(nodes, extra);
        group.bench_with_input(BenchmarkId::new("organize", name), &request, |b, request| {
            b.iter(|| black_box(organize(request, &config)));
        });
        group.bench_with_input(BenchmarkId::new("reroute", name), &request, |b, request| {
            b.iter(|| black_box(detect_overlaps(request, &config)));
        });
        group.bench_with_input(BenchmarkId::new("pipeline", name), &request, |b, request| {
            b.iter(|| black_box(run_pipeline(request, &config)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
