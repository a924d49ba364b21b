use criterion::{black_box, Criterion};
use tinyad_core::{device::Device, dtype::DType, error::Result};
use tinyad_tensor::Tensor;

const SIZES: [(usize, &str); 3] = [(100, "small"), (5000, "medium"), (10000, "large")];

pub fn basic(criterion: &mut Criterion) {
    tinyad_tensor::init();

    let mut group = criterion.benchmark_group("unary/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    let operations: Vec<(&str, fn(&Tensor) -> Result<Tensor>)> = vec![
        ("relu", Tensor::relu),
        ("leakyrelu", Tensor::leakyrelu),
        ("sigmoid", Tensor::sigmoid),
        ("exp", Tensor::exp),
        ("tanh", Tensor::tanh),
        ("logsoftmax", Tensor::logsoftmax),
    ];

    for (op_name, op_fn) in operations {
        for &(size, size_name) in &SIZES {
            let data: Vec<f32> = (0..size).map(|i| (i as f32 / size as f32) - 0.5).collect();
            group.bench_function(format!("{}/{}", op_name, size_name), |b| {
                b.iter(|| {
                    let x = Tensor::new_with_spec(data.clone(), Device::Host, DType::F32).unwrap();
                    black_box(op_fn(&x)).unwrap()
                })
            });
        }
    }

    group.finish();
}
