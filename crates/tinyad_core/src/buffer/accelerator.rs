use crate::{
    buffer::{check_compatible, Buffer},
    device::Device,
    dtype::DType,
    error::{Error, Result},
    runtime::{accelerator, AcceleratorRuntime},
};
use std::{ffi::c_void, sync::Arc};

/// Device allocation owned through the registered accelerator runtime.
pub struct AcceleratorBuffer {
    ptr: *mut c_void,
    size: usize,
    dtype: DType,
    runtime: Arc<dyn AcceleratorRuntime>,
}

unsafe impl Send for AcceleratorBuffer {}
unsafe impl Sync for AcceleratorBuffer {}

impl AcceleratorBuffer {
    pub fn new(size: usize, dtype: DType) -> Result<Self> {
        let total_size = size
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| Error::InvalidArgument("Overflow in allocation".into()))?;
        let runtime = accelerator()?;
        let ptr = unsafe { runtime.malloc(total_size)? };
        if ptr.is_null() && total_size > 0 {
            return Err(Error::OutOfMemory);
        }

        Ok(Self { ptr, size, dtype, runtime })
    }

    fn byte_len(&self) -> usize {
        self.size * self.dtype.size_in_bytes()
    }
}

impl Drop for AcceleratorBuffer {
    fn drop(&mut self) {
        unsafe {
            self.runtime.free(self.ptr);
        }
    }
}

impl Buffer for AcceleratorBuffer {
    fn as_ptr(&self) -> *const c_void {
        self.ptr
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        self.ptr
    }

    fn len(&self) -> usize {
        self.size
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn device(&self) -> Device {
        Device::Accelerator
    }

    unsafe fn copy_from(&mut self, other: &dyn Buffer) -> Result<()> {
        check_compatible(&*self, other)?;

        let size_in_bytes = self.byte_len();
        match other.device() {
            Device::Host => self.runtime.memcpy_h2d(self.ptr, other.as_ptr(), size_in_bytes),
            Device::Accelerator => self.runtime.memcpy_d2d(self.ptr, other.as_ptr(), size_in_bytes),
        }
    }

    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes != self.byte_len() {
            return Err(Error::InvalidArgument("Size mismatch in copy_from_host".into()));
        }
        self.runtime.memcpy_h2d(self.ptr, src, size_in_bytes)
    }

    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes > self.byte_len() {
            return Err(Error::InvalidArgument(format!(
                "Size mismatch in copy_to_host: requested {}, available {}",
                size_in_bytes,
                self.byte_len()
            )));
        }
        self.runtime.memcpy_d2h(dest, self.ptr, size_in_bytes)
    }
}
