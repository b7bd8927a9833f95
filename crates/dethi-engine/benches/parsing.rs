use criterion::{Criterion, criterion_group, criterion_main};
use dethi_engine::parsing::parse_document;
use xi_rope::Rope;

mod common;

fn bench_full_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let text = common::generate_exam(40);
    let rope = Rope::from(text.as_str());

    group.bench_function("parse_120_questions", |b| {
        b.iter(|| {
            let parsed = parse_document(std::hint::black_box(&rope));
            std::hint::black_box(parsed);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_full_parse);
criterion_main!(benches);
