//! Dtype dispatch from type-erased buffers onto the host kernels.
//!
//! Every entry point here only accepts host-resident buffers; accelerator
//! tensors reach these kernels after being staged to the host.

pub mod ops;

use crate::{
    buffer::Buffer,
    device::Device,
    dtype::DType,
    error::{Error, Result},
};

pub(crate) fn check_host(buffers: &[&dyn Buffer]) -> Result<()> {
    for buffer in buffers {
        if buffer.device() != Device::Host {
            return Err(Error::DeviceMismatch {
                expected: Device::Host,
                got: buffer.device(),
            });
        }
    }
    Ok(())
}

pub(crate) fn check_operands(output: &dyn Buffer, inputs: &[&dyn Buffer], size: usize) -> Result<DType> {
    let dtype = output.dtype();
    check_host(&[output])?;
    check_host(inputs)?;

    if output.len() < size {
        return Err(Error::InvalidArgument(format!(
            "output buffer holds {} elements, kernel writes {}",
            output.len(),
            size
        )));
    }
    for input in inputs {
        if input.dtype() != dtype {
            return Err(Error::DTypeMismatch {
                expected: dtype,
                got: input.dtype(),
            });
        }
        if input.len() < size {
            return Err(Error::InvalidArgument(format!(
                "input buffer holds {} elements, kernel reads {}",
                input.len(),
                size
            )));
        }
    }

    Ok(dtype)
}
