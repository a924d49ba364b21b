pub mod accelerator;
pub mod cpu;

use crate::{
    device::Device,
    dtype::DType,
    error::{Error, Result},
};
use accelerator::AcceleratorBuffer;
use cpu::CpuBuffer;
use std::{ffi::c_void, sync::Arc};

pub struct BufferManager {}

impl BufferManager {
    pub fn create(size: usize, device: Device, dtype: DType) -> Result<Arc<dyn Buffer>> {
        let buffer: Arc<dyn Buffer> = match device {
            Device::Host => Arc::new(CpuBuffer::new(size, dtype)?),
            Device::Accelerator => Arc::new(AcceleratorBuffer::new(size, dtype)?),
        };

        Ok(buffer)
    }

    /// Allocates a buffer on `device` and fills it with `bytes`.
    pub fn from_host_bytes(bytes: &[u8], size: usize, device: Device, dtype: DType) -> Result<Arc<dyn Buffer>> {
        if bytes.len() != size * dtype.size_in_bytes() {
            return Err(Error::InvalidArgument(format!(
                "expected {} bytes for {} elements of {}, got {}",
                size * dtype.size_in_bytes(),
                size,
                dtype,
                bytes.len()
            )));
        }

        let mut buffer = Self::create(size, device, dtype)?;
        {
            let buffer_mut = Arc::get_mut(&mut buffer).ok_or(Error::BufferLocked)?;
            unsafe {
                buffer_mut.copy_from_host(bytes.as_ptr() as *const c_void, bytes.len())?;
            }
        }

        Ok(buffer)
    }
}

/// A contiguous element buffer resident on one device.
pub trait Buffer: Send + Sync {
    /// Address in the owning device's address space.
    fn as_ptr(&self) -> *const c_void;
    fn as_mut_ptr(&mut self) -> *mut c_void;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn dtype(&self) -> DType;
    fn device(&self) -> Device;

    fn size_in_bytes(&self) -> usize {
        self.len() * self.dtype().size_in_bytes()
    }

    /// # Safety
    /// Requires both buffers to have the same size and no memory overlap
    unsafe fn copy_from(&mut self, other: &dyn Buffer) -> Result<()>;

    /// # Safety
    /// Requires valid source pointer and matching size_in_bytes with no memory overlap
    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()>;

    /// # Safety
    /// Requires valid destination pointer and matching size_in_bytes with no memory overlap
    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()>;

    /// Copies the whole buffer into a freshly allocated host byte vector.
    fn to_host_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; self.size_in_bytes()];
        unsafe {
            self.copy_to_host(bytes.as_mut_ptr() as *mut c_void, bytes.len())?;
        }
        Ok(bytes)
    }
}

pub(crate) fn check_compatible(dst: &dyn Buffer, src: &dyn Buffer) -> Result<()> {
    if dst.len() != src.len() {
        return Err(Error::InvalidArgument(format!(
            "Buffer size mismatch: {} != {}",
            dst.len(),
            src.len()
        )));
    }
    if dst.dtype() != src.dtype() {
        return Err(Error::DTypeMismatch {
            expected: dst.dtype(),
            got: src.dtype(),
        });
    }
    Ok(())
}
