use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ensnorm::testing::fixture::tiny_normalizer;

fn bench_pipeline(c: &mut Criterion) {
    let normalizer = tiny_normalizer();

    c.bench_function("normalize_ascii", |b| {
        b.iter(|| normalizer.normalize(black_box("nick.eth")).unwrap())
    });

    c.bench_function("normalize_mixed", |b| {
        b.iter(|| {
            normalizer
                .normalize(black_box("Nick\u{AD}.1\u{FE0F}\u{20E3}a\u{300}me.eth"))
                .unwrap()
        })
    });

    c.bench_function("tokenize_emoji_run", |b| {
        let input = "1\u{FE0F}\u{20E3}👍❤\u{FE0F}🧙\u{200D}\u{2642}\u{FE0F}".repeat(8);
        b.iter(|| normalizer.tokenize(black_box(&input)))
    });

    c.bench_function("beautify", |b| {
        b.iter(|| normalizer.beautify(black_box("ξabc.1\u{20E3}.eth")).unwrap())
    });

    c.bench_function("cure_dirty_name", |b| {
        b.iter(|| normalizer.cure(black_box("N_i_c_k?.ETH")).unwrap())
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
