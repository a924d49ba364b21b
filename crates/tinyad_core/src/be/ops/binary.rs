use crate::{
    be::check_operands,
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use tinyad_cpu::ops::binary::*;

#[macro_export]
macro_rules! declare_binary_op {
    ($name:ident, [$($dtype:ident),* $(,)?]) => {
        paste::paste! {
            /// # Safety
            /// This function is unsafe because it performs raw pointer operations.
            pub unsafe fn $name(output: &mut dyn Buffer, lhs: &dyn Buffer, rhs: &dyn Buffer, size: usize) -> Result<()> {
                let dtype = check_operands(output, &[lhs, rhs], size)?;

                match dtype {
                    $(
                        DType::$dtype => [<$name _ $dtype:lower>](
                            size,
                            lhs.as_ptr() as *const [<$dtype:lower>],
                            rhs.as_ptr() as *const [<$dtype:lower>],
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

#[macro_export]
macro_rules! declare_ternary_op {
    ($name:ident, [$($dtype:ident),* $(,)?]) => {
        paste::paste! {
            /// # Safety
            /// This function is unsafe because it performs raw pointer operations.
            pub unsafe fn $name(
                output: &mut dyn Buffer,
                lhs: &dyn Buffer,
                rhs: &dyn Buffer,
                grad: &dyn Buffer,
                size: usize,
            ) -> Result<()> {
                let dtype = check_operands(output, &[lhs, rhs, grad], size)?;

                match dtype {
                    $(
                        DType::$dtype => [<$name _ $dtype:lower>](
                            size,
                            lhs.as_ptr() as *const [<$dtype:lower>],
                            rhs.as_ptr() as *const [<$dtype:lower>],
                            grad.as_ptr() as *const [<$dtype:lower>],
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

declare_binary_op!(add, [F32, F64]);
declare_binary_op!(sub, [F32, F64]);
declare_binary_op!(mul, [F32, F64]);
declare_binary_op!(div, [F32, F64]);
declare_binary_op!(pow, [F32, F64]);

declare_binary_op!(relu_backward, [F32, F64]);
declare_binary_op!(sigmoid_backward, [F32, F64]);

declare_ternary_op!(pow_backward_lhs, [F32, F64]);
declare_ternary_op!(pow_backward_rhs, [F32, F64]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::cpu::CpuBuffer;
    use std::ffi::c_void;

    fn host(values: &[f32]) -> Result<CpuBuffer> {
        let mut buffer = CpuBuffer::new(values.len(), DType::F32)?;
        unsafe {
            buffer.copy_from_host(values.as_ptr() as *const c_void, values.len() * 4)?;
        }
        Ok(buffer)
    }

    #[test]
    fn dispatches_on_dtype() -> Result<()> {
        let lhs = host(&[1.0, 2.0, 3.0])?;
        let rhs = host(&[4.0, 5.0, 6.0])?;
        let mut out = CpuBuffer::new(3, DType::F32)?;
        unsafe { mul(&mut out, &lhs, &rhs, 3)? };

        let mut result = [0.0f32; 3];
        unsafe { out.copy_to_host(result.as_mut_ptr() as *mut c_void, 12)? };
        assert_eq!(result, [4.0, 10.0, 18.0]);

        Ok(())
    }

    #[test]
    fn rejects_mixed_and_unsupported_dtypes() -> Result<()> {
        let lhs = host(&[1.0])?;
        let rhs = CpuBuffer::new(1, DType::F64)?;
        let mut out = CpuBuffer::new(1, DType::F32)?;
        assert!(matches!(unsafe { add(&mut out, &lhs, &rhs, 1) }, Err(Error::DTypeMismatch { .. })));

        let ints = CpuBuffer::new(1, DType::I32)?;
        let mut int_out = CpuBuffer::new(1, DType::I32)?;
        assert!(matches!(
            unsafe { add(&mut int_out, &ints, &ints, 1) },
            Err(Error::UnsupportedDType(DType::I32))
        ));

        Ok(())
    }
}
