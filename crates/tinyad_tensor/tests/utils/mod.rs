#![allow(dead_code)]

use std::{
    alloc::{alloc_zeroed, dealloc, Layout},
    collections::HashMap,
    ffi::c_void,
    ptr,
    sync::{Arc, Mutex},
};
use tinyad_core::{
    device::{set_default_device, Device},
    dtype::DType,
    error::{Error, Result},
    runtime::{register_accelerator, AcceleratorRuntime},
};
use tinyad_tensor::{adapter::TensorAdapter, Tensor};

// Helper functions
pub fn setup() {
    tinyad_tensor::init();
    set_default_device(Device::Host);
}

/// Host tensor kept in double precision, for tight numeric checks.
pub fn tensor_f64<T: TensorAdapter>(data: T) -> Result<Tensor> {
    Tensor::new_with_spec(data, Device::Host, DType::F64)
}

pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {:?} vs {:?}", actual, expected);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let scale = 1.0f64.max(e.abs());
        assert!((a - e).abs() <= tol * scale, "element {}: {} != {} (tol {})", i, a, e, tol);
    }
}

pub fn grad_of(tensor: &Tensor) -> Result<Vec<f64>> {
    match tensor.grad()? {
        Some(grad) => grad.to_flatten_vec::<f64>(),
        None => Err(Error::AssertionFailure(format!("tensor {} has no gradient", tensor.id()))),
    }
}

/// Central-difference estimate of d f / d inputs[which].
pub fn numeric_grad<F>(f: F, inputs: &[Vec<f64>], shapes: &[Vec<usize>], which: usize, eps: f64) -> Result<Vec<f64>>
where
    F: Fn(&[Tensor]) -> Result<Tensor>,
{
    let eval = |values: &[Vec<f64>]| -> Result<f64> {
        let tensors = values
            .iter()
            .zip(shapes)
            .map(|(v, shape)| tensor_f64(v.clone())?.reshape(shape).map(|t| t.detach()))
            .collect::<Result<Vec<_>>>()?;
        f(&tensors)?.item()
    };

    let mut grad = Vec::with_capacity(inputs[which].len());
    for i in 0..inputs[which].len() {
        let mut plus = inputs.to_vec();
        plus[which][i] += eps;
        let mut minus = inputs.to_vec();
        minus[which][i] -= eps;
        grad.push((eval(&plus)? - eval(&minus)?) / (2.0 * eps));
    }

    Ok(grad)
}

/// Accelerator runtime whose "device memory" is ordinary host memory.
pub struct SimulatedRuntime {
    allocations: Mutex<HashMap<usize, Layout>>,
}

impl AcceleratorRuntime for SimulatedRuntime {
    fn name(&self) -> &str {
        "simulated"
    }

    unsafe fn malloc(&self, size_in_bytes: usize) -> Result<*mut c_void> {
        let layout = Layout::from_size_align(size_in_bytes.max(1), 16).map_err(|e| Error::External {
            message: e.to_string(),
        })?;
        let ptr = alloc_zeroed(layout);
        if ptr.is_null() {
            return Err(Error::OutOfMemory);
        }
        self.allocations.lock().map_err(|_| Error::BufferLocked)?.insert(ptr as usize, layout);
        Ok(ptr as *mut c_void)
    }

    unsafe fn free(&self, ptr: *mut c_void) {
        if let Ok(mut allocations) = self.allocations.lock() {
            if let Some(layout) = allocations.remove(&(ptr as usize)) {
                dealloc(ptr as *mut u8, layout);
            }
        }
    }

    unsafe fn memcpy_h2d(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, size_in_bytes);
        Ok(())
    }

    unsafe fn memcpy_d2h(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, size_in_bytes);
        Ok(())
    }

    unsafe fn memcpy_d2d(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, size_in_bytes);
        Ok(())
    }
}

fn simulated() -> Result<Arc<dyn AcceleratorRuntime>> {
    Ok(Arc::new(SimulatedRuntime {
        allocations: Mutex::new(HashMap::new()),
    }))
}

pub fn setup_accelerator() {
    register_accelerator(simulated);
    setup();
}
