use crate::{
    be::check_operands,
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use tinyad_cpu::ops::unary::*;

#[macro_export]
macro_rules! declare_unary_op {
    ($name:ident, [$($dtype:ident),* $(,)?]) => {
        paste::paste! {
            /// # Safety
            /// This function is unsafe because it performs raw pointer operations.
            pub unsafe fn $name(output: &mut dyn Buffer, input: &dyn Buffer, size: usize) -> Result<()> {
                let dtype = check_operands(output, &[input], size)?;

                match dtype {
                    $(
                        DType::$dtype => [<$name _ $dtype:lower>](
                            size,
                            input.as_ptr() as *const [<$dtype:lower>],
                            output.as_mut_ptr() as *mut [<$dtype:lower>],
                        ),
                    )*
                    other => return Err(Error::UnsupportedDType(other)),
                };

                Ok(())
            }
        }
    };
}

declare_unary_op!(neg, [F32, F64]);
declare_unary_op!(exp, [F32, F64]);
declare_unary_op!(log, [F32, F64]);
declare_unary_op!(relu, [F32, F64]);
declare_unary_op!(sigmoid, [F32, F64]);

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn leaky_relu(output: &mut dyn Buffer, input: &dyn Buffer, size: usize, slope: f64) -> Result<()> {
    match check_operands(output, &[input], size)? {
        DType::F32 => leaky_relu_f32(size, input.as_ptr() as *const f32, slope as f32, output.as_mut_ptr() as *mut f32),
        DType::F64 => leaky_relu_f64(size, input.as_ptr() as *const f64, slope, output.as_mut_ptr() as *mut f64),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn leaky_relu_backward(
    output: &mut dyn Buffer,
    input: &dyn Buffer,
    grad: &dyn Buffer,
    size: usize,
    slope: f64,
) -> Result<()> {
    match check_operands(output, &[input, grad], size)? {
        DType::F32 => leaky_relu_backward_f32(
            size,
            input.as_ptr() as *const f32,
            grad.as_ptr() as *const f32,
            slope as f32,
            output.as_mut_ptr() as *mut f32,
        ),
        DType::F64 => leaky_relu_backward_f64(
            size,
            input.as_ptr() as *const f64,
            grad.as_ptr() as *const f64,
            slope,
            output.as_mut_ptr() as *mut f64,
        ),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}

/// # Safety
/// This function is unsafe because it performs raw pointer operations.
pub unsafe fn fill(output: &mut dyn Buffer, size: usize, value: f64) -> Result<()> {
    match check_operands(output, &[], size)? {
        DType::F32 => fill_f32(size, value as f32, output.as_mut_ptr() as *mut f32),
        DType::F64 => fill_f64(size, value, output.as_mut_ptr() as *mut f64),
        other => return Err(Error::UnsupportedDType(other)),
    };

    Ok(())
}
