//! Performance benchmarks for window planning and partitioning.
//!
//! Run with: `cargo bench --bench planning`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Discrete planning | <10µs | 10k units, no cap |
//! | Continuous planning | <10µs | 10k offset units, middle alignment |
//! | Full transform | Linear in words | One turn per 100 words |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ag_partitioner::{
    plan_windows, Annotation, AnnotationId, GraphStore, InMemoryGraphStore, Layer, PlanSpec,
    Partitioner, Schema, TaskParameters, WindowAlignment,
};

/// Create a graph of `turns` turns with 100 one-second words each.
fn make_graph(turns: usize) -> InMemoryGraphStore {
    let schema = Schema::new()
        .with_structure("participant", "turn", "utterance", "word")
        .with_layer(Layer::new("participant", "Participants"))
        .with_layer(Layer::new("turn", "Turns").with_parent("participant"))
        .with_layer(Layer::new("word", "Words").with_parent("turn"));
    let mut store = InMemoryGraphStore::new("bench_graph", schema);
    let length = (turns * 100) as f64;
    let annotation = |id: String, layer: &str, start: f64, end: f64, parent: Option<&str>| Annotation {
        label: id.clone(),
        id: AnnotationId::new(id),
        layer_id: layer.to_string(),
        start,
        end,
        parent_id: parent.map(AnnotationId::from),
        ordinal: 0,
    };

    store
        .add_annotation(annotation("p".to_string(), "participant", 0.0, length, None))
        .expect("participant");
    for t in 0..turns {
        let turn = format!("t{}", t);
        let offset = (t * 100) as f64;
        store
            .add_annotation(annotation(turn.clone(), "turn", offset, offset + 100.0, Some("p")))
            .expect("turn");
        for w in 0..100 {
            let start = offset + w as f64;
            store
                .add_annotation(annotation(format!("{}w{}", turn, w), "word", start, start + 1.0, Some(&turn)))
                .expect("word");
        }
    }
    store
}

/// Benchmark discrete planning across axis lengths.
fn bench_plan_discrete(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_discrete");

    for length in [100usize, 1_000, 10_000] {
        let spec = PlanSpec::new(7usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);

        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::new("units", length), &length, |b, &length| {
            b.iter(|| plan_windows(black_box(length), &spec))
        });
    }

    group.finish();
}

/// Benchmark continuous planning.
fn bench_plan_continuous(c: &mut Criterion) {
    let spec = PlanSpec::new(9.5f64)
        .aligned(WindowAlignment::Middle)
        .with_leftovers(true);

    c.bench_function("plan_continuous", |b| {
        b.iter(|| plan_windows(black_box(10_000.0f64), &spec))
    });
}

/// Benchmark a full transform, including annotation writes.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let params = TaskParameters::from_query_string(
        "boundaryLayerId=turn&tokenLayerId=word&partitionSize=5&destinationLayerId=partition&leftOvers=on",
    );

    for turns in [1usize, 10, 50] {
        let mut template = make_graph(turns);
        let partitioner = Partitioner::configure(&params, template.schema_mut()).expect("valid parameters");

        group.throughput(Throughput::Elements((turns * 100) as u64));
        group.bench_with_input(BenchmarkId::new("turns", turns), &template, |b, template| {
            b.iter_batched(
                || template.clone(),
                |mut store| {
                    let report = partitioner.transform(&mut store).expect("transform");
                    assert_eq!(report.annotations_created(), turns * 20);
                    store.graph_id().len()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_plan_discrete,
    bench_plan_continuous,
    bench_transform,
);

criterion_main!(benches);
