use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fvqc_core::{FiniteVolumeSetup, FlavorChannel, FlavorChannelSpace, ThreeBodyInteractionScheme};
use fvqc_index::QCIndexSpace;

fn bench_build(c: &mut Criterion) {
    let channels = FlavorChannelSpace::new(vec![FlavorChannel::new(3)
        .expect("channel")
        .with_ell_max(1)])
    .expect("channels");
    let volume = FiniteVolumeSetup::new([0, 0, 1]);
    let scheme = ThreeBodyInteractionScheme::default();
    c.bench_function("index_space_build", |b| {
        b.iter(|| {
            QCIndexSpace::build(
                black_box(&channels),
                black_box(&volume),
                black_box(&scheme),
                5.0,
                7.0,
            )
        })
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
