use crate::{adapter::TensorAdapter, storage::Storage, Tensor};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::sync::{LazyLock, Mutex};
use tinyad_core::{
    device::{get_default_device, Device},
    dtype::{get_default_dtype, DType, Element},
    error::{Error, Result},
};

static RNG: LazyLock<Mutex<StdRng>> = LazyLock::new(|| Mutex::new(StdRng::from_entropy()));

/// Re-seeds the process-wide random source used by `randn`.
pub fn manual_seed(seed: u64) -> Result<()> {
    let mut rng = RNG.lock().map_err(|_| Error::External {
        message: "random source poisoned".into(),
    })?;
    *rng = StdRng::seed_from_u64(seed);
    Ok(())
}

fn ensure_float(dtype: DType) -> Result<()> {
    if dtype.is_float() {
        Ok(())
    } else {
        Err(Error::TypeMismatch(format!(
            "tensors hold floating point data, got {}",
            dtype
        )))
    }
}

impl Tensor {
    /// Builds a leaf from a literal on the default device, converted to the default dtype.
    pub fn new<T>(data: T) -> Result<Self>
    where
        T: TensorAdapter,
    {
        Self::new_with_spec(data, get_default_device(), get_default_dtype())
    }

    /// Builds a leaf holding `dtype` data. Floating types other than
    /// `DType::CANONICAL` are kept as asked, with a one-time warning.
    pub fn new_with_spec<T>(data: T, device: Device, dtype: DType) -> Result<Self>
    where
        T: TensorAdapter,
    {
        let src_dtype = <T::Elem as Element>::DTYPE;
        ensure_float(src_dtype)?;
        ensure_float(dtype)?;

        let shape = data.to_shape()?;
        let storage = Storage::from_flatten_vec_as(data.to_flat_vec(), &shape, device, dtype)?;

        Self::from_storage(storage)
    }

    pub fn fill(shape: &[usize], value: f64) -> Result<Self> {
        Self::fill_with_spec(shape, value, get_default_device(), get_default_dtype())
    }

    pub fn fill_like(src: &Tensor, value: f64) -> Result<Self> {
        Self::fill_with_spec(&src.shape(), value, src.device(), src.dtype())
    }

    pub fn fill_with_spec(shape: &[usize], value: f64, device: Device, dtype: DType) -> Result<Self> {
        ensure_float(dtype)?;
        Self::from_storage(Storage::full(shape, device, dtype, value)?)
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::fill(shape, 0.0)
    }

    pub fn zeros_like(src: &Tensor) -> Result<Self> {
        Self::fill_like(src, 0.0)
    }

    pub fn zeros_with_spec(shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        Self::fill_with_spec(shape, 0.0, device, dtype)
    }

    pub fn ones(shape: &[usize]) -> Result<Self> {
        Self::fill(shape, 1.0)
    }

    pub fn ones_like(src: &Tensor) -> Result<Self> {
        Self::fill_like(src, 1.0)
    }

    pub fn ones_with_spec(shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        Self::fill_with_spec(shape, 1.0, device, dtype)
    }

    /// Standard normal samples from the process-wide random source.
    pub fn randn(shape: &[usize]) -> Result<Self> {
        Self::randn_with_spec(shape, get_default_device(), get_default_dtype())
    }

    pub fn randn_like(src: &Tensor) -> Result<Self> {
        Self::randn_with_spec(&src.shape(), src.device(), src.dtype())
    }

    pub fn randn_with_spec(shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        ensure_float(dtype)?;

        let size: usize = shape.iter().product();
        let samples: Vec<f64> = {
            let mut rng = RNG.lock().map_err(|_| Error::External {
                message: "random source poisoned".into(),
            })?;
            (0..size).map(|_| StandardNormal.sample(&mut *rng)).collect()
        };

        Self::from_storage(Storage::from_flatten_vec_as(samples, shape, device, dtype)?)
    }

    /// `n x n` identity matrix.
    pub fn eye(n: usize) -> Result<Self> {
        Self::eye_with_spec(n, get_default_device(), get_default_dtype())
    }

    pub fn eye_with_spec(n: usize, device: Device, dtype: DType) -> Result<Self> {
        ensure_float(dtype)?;

        let mut values = vec![0.0f64; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }

        Self::from_storage(Storage::from_flatten_vec_as(values, &[n, n], device, dtype)?)
    }
}
