use crate::{
    attributes::Attributes,
    context::OpContext,
    ops::{expect_inputs, register_host_kernel},
    registry::{dispatch, Gradients},
    storage::Storage,
    Tensor,
};
use tinyad_core::{
    be,
    device::Device,
    error::{Error, Result},
};

fn sum_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = &expect_inputs("sum", inputs, 1)?[0];
    ctx.save(x.clone());
    Storage::build(&[1], x.device(), x.dtype(), |out| unsafe { be::ops::reduction::sum(out, x.buffer(), x.size()) })
}

fn sum_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let x = ctx.saved_at(0)?;
    let upstream = grad.to_flatten_vec::<f64>()?;
    let value = upstream.first().copied().ok_or_else(|| {
        Error::AssertionFailure("sum received an empty upstream gradient".to_string())
    })?;

    Ok(Storage::full(x.shape(), x.device(), x.dtype(), value)?.into())
}

/// Splits a shape into (rows, cols) around its last axis.
fn rows_and_cols(name: &str, storage: &Storage) -> Result<(usize, usize)> {
    let cols = *storage.shape().last().ok_or_else(|| {
        Error::IncompatibleShape(format!("'{}' needs at least one axis, got a scalar", name))
    })?;
    let rows = if cols == 0 { 0 } else { storage.size() / cols };
    Ok((rows, cols))
}

fn logsoftmax_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let x = &expect_inputs("logsoftmax", inputs, 1)?[0];
    let (rows, cols) = rows_and_cols("logsoftmax", x)?;
    let out = Storage::build(x.shape(), x.device(), x.dtype(), |out| unsafe {
        be::ops::reduction::log_softmax(out, x.buffer(), rows, cols)
    })?;
    ctx.save(out.clone());
    Ok(out)
}

fn logsoftmax_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let out = ctx.saved_at(0)?;
    let (rows, cols) = rows_and_cols("logsoftmax", out)?;
    let dx = Storage::build(out.shape(), out.device(), out.dtype(), |dx| unsafe {
        be::ops::reduction::log_softmax_backward(dx, out.buffer(), grad.buffer(), rows, cols)
    })?;
    Ok(dx.into())
}

pub(super) fn register_all(device: Device) {
    register_host_kernel("sum", device, Attributes::new(), sum_forward, sum_backward);
    register_host_kernel("logsoftmax", device, Attributes::new(), logsoftmax_forward, logsoftmax_backward);
}

impl Tensor {
    /// Sum of all elements, as a tensor of shape `[1]`.
    pub fn sum(&self) -> Result<Tensor> {
        dispatch("sum", &[self], &Attributes::new())
    }

    /// Log-softmax over the last axis.
    pub fn logsoftmax(&self) -> Result<Tensor> {
        dispatch("logsoftmax", &[self], &Attributes::new())
    }
}
