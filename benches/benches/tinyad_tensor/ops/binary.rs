use criterion::{black_box, Criterion};
use tinyad_core::{device::Device, dtype::DType, error::Result};
use tinyad_tensor::Tensor;

const SIZES: [(usize, &str); 3] = [(100, "small"), (5000, "medium"), (10000, "large")];

fn bench_binary_op<F>(b: &mut criterion::Bencher, dtype: DType, size: usize, op_fn: F)
where
    F: Fn(&Tensor, &Tensor) -> Result<Tensor>,
{
    let x_data: Vec<f32> = (0..size).map(|i| i as f32 + 1.0).collect();
    let y_data: Vec<f32> = (0..size).map(|i| (i % 7) as f32 + 0.5).collect();

    b.iter(|| {
        let x = Tensor::new_with_spec(x_data.clone(), Device::Host, dtype).unwrap();
        let y = Tensor::new_with_spec(y_data.clone(), Device::Host, dtype).unwrap();

        black_box(op_fn(&x, &y)).unwrap()
    })
}

pub fn basic(criterion: &mut Criterion) {
    tinyad_tensor::init();

    let mut group = criterion.benchmark_group("binary/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    let operations: Vec<(&str, fn(&Tensor, &Tensor) -> Result<Tensor>)> = vec![
        ("add", Tensor::add),
        ("sub", Tensor::sub),
        ("mul", Tensor::mul),
        ("div", Tensor::div),
        ("pow", Tensor::pow),
    ];

    for (op_name, op_fn) in operations {
        for &(size, size_name) in &SIZES {
            for dtype in [DType::F32, DType::F64] {
                let bench_name = format!("{}/{}/{}", op_name, dtype, size_name);
                group.bench_function(&bench_name, |b| bench_binary_op(b, dtype, size, op_fn));
            }
        }
    }

    group.finish();
}
