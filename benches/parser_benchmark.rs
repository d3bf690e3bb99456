use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonld_streaming::jsonld::{JsonLdParser, QuadSink};
use jsonld_streaming::rdf::Quad;

/// Sink that only counts, so allocation of the output is not measured
struct CountingSink(usize);

impl QuadSink for CountingSink {
    fn push_quad(&mut self, _quad: Quad) -> jsonld_streaming::JsonLdResult<()> {
        self.0 += 1;
        Ok(())
    }
}

/// Flat nodes, `@id` first: every statement is emitted immediately
fn flat_document(nodes: usize) -> String {
    let items: Vec<String> = (0..nodes)
        .map(|i| {
            format!(
                r#"{{"@id": "http://ex.org/n{i}", "http://ex.org/name": "Node {i}", "http://ex.org/rank": {i}}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

/// Same nodes with `@id` last, inside a graph named at the end
fn deferred_document(nodes: usize) -> String {
    let items: Vec<String> = (0..nodes)
        .map(|i| {
            format!(
                r#"{{"http://ex.org/name": "Node {i}", "http://ex.org/knows": {{"http://ex.org/rank": {i}}}, "@id": "http://ex.org/n{i}"}}"#
            )
        })
        .collect();
    format!(r#"{{"@graph": [{}], "@id": "http://ex.org/g"}}"#, items.join(","))
}

fn run(input: &[u8], chunk: usize) -> usize {
    let mut parser = JsonLdParser::default();
    let mut sink = CountingSink(0);
    for piece in input.chunks(chunk) {
        parser.push(piece, &mut sink).unwrap();
    }
    parser.finish(&mut sink).unwrap();
    sink.0
}

/// Benchmark conversion throughput for in-order and deferred identities
fn bench_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("jsonld_to_quads");

    for size in [100, 1000, 10_000].iter() {
        let flat = flat_document(*size);
        group.throughput(Throughput::Bytes(flat.len() as u64));
        group.bench_with_input(BenchmarkId::new("flat", size), &flat, |b, input| {
            b.iter(|| run(input.as_bytes(), 8192));
        });

        let deferred = deferred_document(*size);
        group.throughput(Throughput::Bytes(deferred.len() as u64));
        group.bench_with_input(BenchmarkId::new("deferred", size), &deferred, |b, input| {
            b.iter(|| run(input.as_bytes(), 8192));
        });
    }
    group.finish();
}

/// Benchmark the cost of small read chunks
fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_size");
    let input = flat_document(1000);

    for chunk in [16, 256, 4096, 65_536].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), chunk, |b, &chunk| {
            b.iter(|| run(input.as_bytes(), chunk));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_documents, bench_chunk_sizes);
criterion_main!(benches);
