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

fn matrix_dims(storage: &Storage) -> Result<(usize, usize)> {
    match storage.shape() {
        [rows, cols] => Ok((*rows, *cols)),
        shape => Err(Error::IncompatibleShape(format!("'dot' needs 2-D operands, got {:?}", shape))),
    }
}

fn matmul(lhs: &Storage, rhs: &Storage, m: usize, k: usize, n: usize) -> Result<Storage> {
    Storage::build(&[m, n], lhs.device(), lhs.dtype(), |out| unsafe {
        be::ops::matmul::matmul(out, lhs.buffer(), rhs.buffer(), m, k, n)
    })
}

fn transpose(input: &Storage) -> Result<Storage> {
    let (rows, cols) = matrix_dims(input)?;
    Storage::build(&[cols, rows], input.device(), input.dtype(), |out| unsafe {
        be::ops::matmul::transpose(out, input.buffer(), rows, cols)
    })
}

fn dot_forward(ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
    let inputs = expect_inputs("dot", inputs, 2)?;
    let (x, w) = (&inputs[0], &inputs[1]);
    let (m, k) = matrix_dims(x)?;
    let (k2, n) = matrix_dims(w)?;
    if k != k2 {
        return Err(Error::IncompatibleShape(format!(
            "'dot' cannot multiply {:?} by {:?}",
            x.shape(),
            w.shape()
        )));
    }

    ctx.save(x.clone());
    ctx.save(w.clone());
    matmul(x, w, m, k, n)
}

fn dot_backward(ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
    let (x, w) = (ctx.saved_at(0)?, ctx.saved_at(1)?);
    let (m, k) = matrix_dims(x)?;
    let (_, n) = matrix_dims(w)?;

    // dx = g . w^T, dw = x^T . g
    let dx = matmul(grad, &transpose(w)?, m, n, k)?;
    let dw = matmul(&transpose(x)?, grad, k, m, n)?;

    Ok(Gradients::Many(vec![Some(dx), Some(dw)]))
}

pub(super) fn register_all(device: Device) {
    register_host_kernel("dot", device, Attributes::new(), dot_forward, dot_backward);
}

impl Tensor {
    /// Matrix product of two 2-D tensors.
    pub fn dot(&self, rhs: &Tensor) -> Result<Tensor> {
        dispatch("dot", &[self, rhs], &Attributes::new())
    }

    pub fn matmul(&self, rhs: &Tensor) -> Result<Tensor> {
        self.dot(rhs)
    }
}
