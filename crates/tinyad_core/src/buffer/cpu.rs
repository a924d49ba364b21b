use crate::{
    buffer::{check_compatible, Buffer},
    device::Device,
    dtype::DType,
    error::{Error, Result},
};
use std::{ffi::c_void, ptr};

/// Host memory buffer. Backed by `u64` words so every element type is aligned.
pub struct CpuBuffer {
    data: Vec<u64>,
    len: usize,
    dtype: DType,
}

unsafe impl Send for CpuBuffer {}
unsafe impl Sync for CpuBuffer {}

impl CpuBuffer {
    pub fn new(size: usize, dtype: DType) -> Result<Self> {
        let total_size = size
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| Error::InvalidArgument("Overflow in allocation".into()))?;
        Ok(Self {
            data: vec![0; total_size.div_ceil(8)],
            len: size,
            dtype,
        })
    }

    fn byte_len(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }
}

impl Buffer for CpuBuffer {
    fn as_ptr(&self) -> *const c_void {
        self.data.as_ptr() as *const _
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        self.data.as_mut_ptr() as *mut _
    }

    fn len(&self) -> usize {
        self.len
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn device(&self) -> Device {
        Device::Host
    }

    unsafe fn copy_from(&mut self, other: &dyn Buffer) -> Result<()> {
        check_compatible(&*self, other)?;

        let size_in_bytes = self.byte_len();
        match other.device() {
            Device::Host => {
                ptr::copy_nonoverlapping(other.as_ptr() as *const u8, self.as_mut_ptr() as *mut u8, size_in_bytes);
                Ok(())
            }
            Device::Accelerator => other.copy_to_host(self.as_mut_ptr(), size_in_bytes),
        }
    }

    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes != self.byte_len() {
            return Err(Error::InvalidArgument("Size mismatch in copy_from_host".into()));
        }
        ptr::copy_nonoverlapping(src as *const u8, self.as_mut_ptr() as *mut u8, size_in_bytes);
        Ok(())
    }

    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes > self.byte_len() {
            return Err(Error::InvalidArgument(format!(
                "Size mismatch in copy_to_host: requested {}, available {}",
                size_in_bytes,
                self.byte_len()
            )));
        }
        ptr::copy_nonoverlapping(self.as_ptr() as *const u8, dest as *mut u8, size_in_bytes);
        Ok(())
    }
}
