use criterion::{black_box, Criterion};
use tinyad_core::{device::Device, dtype::DType, error::Result};
use tinyad_tensor::Tensor;

// (batch, features, hidden)
const SHAPES: [((usize, usize, usize), &str); 3] = [((4, 16, 8), "small"), ((32, 128, 64), "medium"), ((64, 512, 128), "large")];

fn mlp_step(x: &Tensor, w1: &Tensor, w2: &Tensor) -> Result<()> {
    let hidden = x.dot(w1)?.relu()?;
    let loss = hidden.dot(w2)?.logsoftmax()?.mean()?;
    loss.backward()
}

pub fn basic(criterion: &mut Criterion) {
    tinyad_tensor::init();

    let mut group = criterion.benchmark_group("backward/mlp");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(30);

    for &((batch, features, hidden), size_name) in &SHAPES {
        let x = Tensor::randn_with_spec(&[batch, features], Device::Host, DType::F32).unwrap();
        group.bench_function(size_name, |b| {
            b.iter(|| {
                let w1 = Tensor::randn_with_spec(&[features, hidden], Device::Host, DType::F32).unwrap();
                let w2 = Tensor::randn_with_spec(&[hidden, 10], Device::Host, DType::F32).unwrap();
                black_box(mlp_step(&x, &w1, &w2)).unwrap()
            })
        });
    }

    group.finish();
}
