pub use tinyad_core::dtype::{bf16, bfloat16, bool, f16, float16, float32, float64, half, int32, int64, uint8};
pub use crate::core::{
    device::{auto_set_device, get_default_device, set_default_device, Device},
    dtype::{get_default_dtype, set_default_dtype, DType},
    error::{Error, Result},
    runtime::{is_accelerator_available, register_accelerator, AcceleratorRuntime},
};
pub use crate::tensor::{dispatch, init, manual_seed, register, AttrValue, Attributes, Gradients, OpKernel, Tensor};
