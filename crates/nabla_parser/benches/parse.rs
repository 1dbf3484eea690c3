use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

fn mixed_document(repeats: usize) -> String {
    let chunk = "\
result = begin\n\
    m = [1 2; 3 4]\n\
    v = [f(x) for x = 1:100]\n\
    t = ready ? go : wait\n\
    total = 0\n\
    for i = 1:100\n\
        total += m[i, end] * 2i\n\
    end\n\
    total\n\
end\n\
# checkpoint\n";
    chunk.repeat(repeats)
}

fn bench_parse(c: &mut Criterion) {
    let small = mixed_document(1);
    let large = mixed_document(256);

    c.bench_function("parse_small_document", |b| {
        b.iter(|| nabla_parser::parse(black_box(&small)))
    });
    c.bench_function("parse_large_document", |b| {
        b.iter(|| nabla_parser::parse(black_box(&large)))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
