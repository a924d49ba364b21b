use crate::{
    attributes::Attributes,
    context::OpContext,
    ops::{binary::binary, expect_inputs, register_host_kernel},
    registry::{dispatch, Gradients},
    storage::Storage,
    Tensor,
};
use tinyad_core::{
    be,
    buffer::Buffer,
    device::Device,
    error::Result,
};

type UnaryKernel = unsafe fn(&mut dyn Buffer, &dyn Buffer, usize) -> Result<()>;

fn unary(kernel: UnaryKernel, input: &Storage) -> Result<Storage> {
    Storage::build(input.shape(), input.device(), input.dtype(), |out| unsafe {
        kernel(out, input.buffer(), input.size())
    })
}

fn operand<'a>(name: &str, inputs: &'a [Storage]) -> Result<&'a Storage> {
    Ok(&expect_inputs(name, inputs, 1)?[0])
}

fn relu_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = operand("relu", inputs)?;
    ctx.save(x.clone());
    unary(be::ops::unary::relu, x)
}

fn relu_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(binary(be::ops::binary::relu_backward, ctx.saved_at(0)?, grad)?.into())
}

fn leakyrelu_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = operand("leakyrelu", inputs)?;
    let slope = ctx.attributes().get_float("slope")?;
    ctx.save(x.clone());
    Storage::build(x.shape(), x.device(), x.dtype(), |out| unsafe {
        be::ops::unary::leaky_relu(out, x.buffer(), x.size(), slope)
    })
}

fn leakyrelu_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let x = ctx.saved_at(0)?;
    let slope = ctx.attributes().get_float("slope")?;
    let dx = Storage::build(x.shape(), x.device(), x.dtype(), |out| unsafe {
        be::ops::unary::leaky_relu_backward(out, x.buffer(), grad.buffer(), x.size(), slope)
    })?;
    Ok(dx.into())
}

fn sigmoid_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let out = unary(be::ops::unary::sigmoid, operand("sigmoid", inputs)?)?;
    ctx.save(out.clone());
    Ok(out)
}

fn sigmoid_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(binary(be::ops::binary::sigmoid_backward, ctx.saved_at(0)?, grad)?.into())
}

fn exp_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let out = unary(be::ops::unary::exp, operand("exp", inputs)?)?;
    ctx.save(out.clone());
    Ok(out)
}

fn exp_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(binary(be::ops::binary::mul, grad, ctx.saved_at(0)?)?.into())
}

fn log_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = operand("log", inputs)?;
    ctx.save(x.clone());
    unary(be::ops::unary::log, x)
}

fn log_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(binary(be::ops::binary::div, grad, ctx.saved_at(0)?)?.into())
}

pub(super) fn register_all(device: Device) {
    register_host_kernel("relu", device, Attributes::new(), relu_forward, relu_backward);
    register_host_kernel(
        "leakyrelu",
        device,
        Attributes::new().with("slope", 0.01),
        leakyrelu_forward,
        leakyrelu_backward,
    );
    register_host_kernel("sigmoid", device, Attributes::new(), sigmoid_forward, sigmoid_backward);
    register_host_kernel("exp", device, Attributes::new(), exp_forward, exp_backward);
    register_host_kernel("log", device, Attributes::new(), log_forward, log_backward);
}

macro_rules! unary_methods {
    ($($method:ident),* $(,)?) => {
        impl Tensor {
            $(
                pub fn $method(&self) -> Result<Tensor> {
                    dispatch(stringify!($method), &[self], &Attributes::new())
                }
            )*
        }
    };
}

unary_methods!(relu, sigmoid, exp, log);

impl Tensor {
    /// Leaky ReLU with the registered default slope.
    pub fn leakyrelu(&self) -> Result<Tensor> {
        dispatch("leakyrelu", &[self], &Attributes::new())
    }

    pub fn leakyrelu_with(&self, slope: f64) -> Result<Tensor> {
        dispatch("leakyrelu", &[self], &Attributes::new().with("slope", slope))
    }
}
