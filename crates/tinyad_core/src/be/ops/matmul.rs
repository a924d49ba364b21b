use crate::{
    be::check_operands,
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use tinyad_cpu::ops::matmul::*;

/// `output[m x n] = lhs[m x k] * rhs[k x n]`
///
/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn matmul(output: &mut dyn Buffer, lhs: &dyn Buffer, rhs: &dyn Buffer, m: usize, k: usize, n: usize) -> Result<()> {
    check_operands(&*output, &[lhs], m * k)?;
    check_operands(&*output, &[rhs], k * n)?;

    match check_operands(output, &[], m * n)? {
        DType::F32 => matmul_f32(
            m,
            k,
            n,
            lhs.as_ptr() as *const f32,
            rhs.as_ptr() as *const f32,
            output.as_mut_ptr() as *mut f32,
        ),
        DType::F64 => matmul_f64(
            m,
            k,
            n,
            lhs.as_ptr() as *const f64,
            rhs.as_ptr() as *const f64,
            output.as_mut_ptr() as *mut f64,
        ),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn transpose(output: &mut dyn Buffer, input: &dyn Buffer, rows: usize, cols: usize) -> Result<()> {
    match check_operands(output, &[input], rows * cols)? {
        DType::F32 => transpose_f32(rows, cols, input.as_ptr() as *const f32, output.as_mut_ptr() as *mut f32),
        DType::F64 => transpose_f64(rows, cols, input.as_ptr() as *const f64, output.as_mut_ptr() as *mut f64),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}
