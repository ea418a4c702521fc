use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use reservation_pipeline::synthetic::{Sampler, SMOTE};
use reservation_pipeline::training::RandomForest;

/// Two-class data with a 4:1 imbalance
fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<i64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);
    let y = Array1::from_shape_fn(n_rows, |i| i64::from(i % 5 == 0));
    (x, y)
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_forest");
    group.sample_size(10);

    for n_rows in [1000, 5000].iter() {
        let (x, y) = create_classification_data(*n_rows, 10);
        let y = y.mapv(|v| v as f64);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut rf = RandomForest::new_classifier(20).with_random_state(42);
                rf.fit(black_box(x), black_box(y)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_smote(c: &mut Criterion) {
    let mut group = c.benchmark_group("smote");
    group.sample_size(10);

    for n_rows in [1000, 4000].iter() {
        let data = create_classification_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("fit_resample", n_rows), &data, |b, (x, y)| {
            b.iter(|| {
                SMOTE::new()
                    .with_seed(42)
                    .fit_resample(black_box(x), black_box(y))
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_forest_fit, bench_smote);
criterion_main!(benches);
