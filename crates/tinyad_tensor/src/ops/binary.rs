use crate::{
    attributes::Attributes,
    context::OpContext,
    ops::{expect_inputs, expect_same_shape, register_host_kernel},
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

type BinaryKernel = unsafe fn(&mut dyn Buffer, &dyn Buffer, &dyn Buffer, usize) -> Result<()>;
type TernaryKernel = unsafe fn(&mut dyn Buffer, &dyn Buffer, &dyn Buffer, &dyn Buffer, usize) -> Result<()>;

pub(crate) fn binary(kernel: BinaryKernel, lhs: &Storage, rhs: &Storage) -> Result<Storage> {
    Storage::build(lhs.shape(), lhs.device(), lhs.dtype(), |out| unsafe {
        kernel(out, lhs.buffer(), rhs.buffer(), lhs.size())
    })
}

fn ternary(kernel: TernaryKernel, lhs: &Storage, rhs: &Storage, grad: &Storage) -> Result<Storage> {
    Storage::build(lhs.shape(), lhs.device(), lhs.dtype(), |out| unsafe {
        kernel(out, lhs.buffer(), rhs.buffer(), grad.buffer(), lhs.size())
    })
}

fn operands<'a>(name: &str, inputs: &'a [Storage]) -> Result<(&'a Storage, &'a Storage)> {
    let inputs = expect_inputs(name, inputs, 2)?;
    expect_same_shape(name, &inputs[0], &inputs[1])?;
    Ok((&inputs[0], &inputs[1]))
}

// add

fn add_forward(_ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let (x, y) = operands("add", inputs)?;
    binary(be::ops::binary::add, x, y)
}

fn add_backward(_ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    Ok(Gradients::Many(vec![Some(grad.clone()), Some(grad.clone())]))
}

// sub

fn sub_forward(_ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let (x, y) = operands("sub", inputs)?;
    binary(be::ops::binary::sub, x, y)
}

fn sub_backward(_ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let neg = Storage::build(grad.shape(), grad.device(), grad.dtype(), |out| unsafe {
        be::ops::unary::neg(out, grad.buffer(), grad.size())
    })?;
    Ok(Gradients::Many(vec![Some(grad.clone()), Some(neg)]))
}

// mul

fn mul_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let (x, y) = operands("mul", inputs)?;
    ctx.save(x.clone());
    ctx.save(y.clone());
    binary(be::ops::binary::mul, x, y)
}

fn mul_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let (x, y) = (ctx.saved_at(0)?, ctx.saved_at(1)?);
    Ok(Gradients::Many(vec![
        Some(binary(be::ops::binary::mul, grad, y)?),
        Some(binary(be::ops::binary::mul, grad, x)?),
    ]))
}

// pow

fn pow_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let (x, y) = operands("pow", inputs)?;
    ctx.save(x.clone());
    ctx.save(y.clone());
    binary(be::ops::binary::pow, x, y)
}

fn pow_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let (x, y) = (ctx.saved_at(0)?, ctx.saved_at(1)?);
    Ok(Gradients::Many(vec![
        Some(ternary(be::ops::binary::pow_backward_lhs, x, y, grad)?),
        Some(ternary(be::ops::binary::pow_backward_rhs, x, y, grad)?),
    ]))
}

pub(super) fn register_all(device: Device) {
    register_host_kernel("add", device, Attributes::new(), add_forward, add_backward);
    register_host_kernel("sub", device, Attributes::new(), sub_forward, sub_backward);
    register_host_kernel("mul", device, Attributes::new(), mul_forward, mul_backward);
    register_host_kernel("pow", device, Attributes::new(), pow_forward, pow_backward);
}

impl Tensor {
    pub fn add(&self, rhs: &Tensor) -> Result<Tensor> {
        dispatch("add", &[self, rhs], &Attributes::new())
    }

    pub fn sub(&self, rhs: &Tensor) -> Result<Tensor> {
        dispatch("sub", &[self, rhs], &Attributes::new())
    }

    pub fn mul(&self, rhs: &Tensor) -> Result<Tensor> {
        dispatch("mul", &[self, rhs], &Attributes::new())
    }

    /// Elementwise `self ^ exponent`.
    pub fn pow(&self, exponent: &Tensor) -> Result<Tensor> {
        dispatch("pow", &[self, exponent], &Attributes::new())
    }
}
