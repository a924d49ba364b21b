use crate::{
    attributes::Attributes,
    context::OpContext,
    ops::{expect_inputs, register_host_kernel},
    registry::{dispatch, Gradients},
    storage::Storage,
    Tensor,
};
use tinyad_core::{device::Device, error::Result};

fn reshape_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = &expect_inputs("reshape", inputs, 1)?[0];
    let shape = ctx.attributes().get_shape("shape")?.to_vec();
    x.reshaped(&shape)
}

fn reshape_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(grad.reshaped(&ctx.parent_shape(0)?)?.into())
}

pub(super) fn register_all(device: Device) {
    register_host_kernel(
        "reshape",
        device,
        Attributes::new().with("shape", Vec::<usize>::new()),
        reshape_forward,
        reshape_backward,
    );
}

impl Tensor {
    /// Same data viewed with a new shape of equal size.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor> {
        dispatch("reshape", &[self], &Attributes::new().with("shape", shape))
    }
}
