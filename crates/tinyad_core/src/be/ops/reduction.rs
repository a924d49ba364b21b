use crate::{
    be::check_operands,
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use tinyad_cpu::ops::reduction::*;

/// Sums the first `size` elements of `input` into `output[0]`.
///
/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn sum(output: &mut dyn Buffer, input: &dyn Buffer, size: usize) -> Result<()> {
    check_operands(output, &[], 1)?;
    match check_operands(&*output, &[input], 0)? {
        DType::F32 => sum_f32(size.min(input.len()), input.as_ptr() as *const f32, output.as_mut_ptr() as *mut f32),
        DType::F64 => sum_f64(size.min(input.len()), input.as_ptr() as *const f64, output.as_mut_ptr() as *mut f64),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn log_softmax(output: &mut dyn Buffer, input: &dyn Buffer, rows: usize, cols: usize) -> Result<()> {
    let size = rows * cols;
    let dtype = check_operands(output, &[input], size)?;
    if size == 0 {
        return Ok(());
    }
    match dtype {
        DType::F32 => log_softmax_f32(rows, cols, input.as_ptr() as *const f32, output.as_mut_ptr() as *mut f32),
        DType::F64 => log_softmax_f64(rows, cols, input.as_ptr() as *const f64, output.as_mut_ptr() as *mut f64),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn log_softmax_backward(
    output: &mut dyn Buffer,
    forward_out: &dyn Buffer,
    grad: &dyn Buffer,
    rows: usize,
    cols: usize,
) -> Result<()> {
    let size = rows * cols;
    let dtype = check_operands(output, &[forward_out, grad], size)?;
    if size == 0 {
        return Ok(());
    }
    match dtype {
        DType::F32 => log_softmax_backward_f32(
            rows,
            cols,
            forward_out.as_ptr() as *const f32,
            grad.as_ptr() as *const f32,
            output.as_mut_ptr() as *mut f32,
        ),
        DType::F64 => log_softmax_backward_f64(
            rows,
            cols,
            forward_out.as_ptr() as *const f64,
            grad.as_ptr() as *const f64,
            output.as_mut_ptr() as *mut f64,
        ),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}
