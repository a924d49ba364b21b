//! Operations built only from registered primitives.
//!
//! None of these has a kernel or a backward rule of its own; their gradients
//! come from the primitives they dispatch.

use crate::Tensor;
use tinyad_core::error::Result;

impl Tensor {
    /// Mean of all elements, shape `[1]`.
    pub fn mean(&self) -> Result<Tensor> {
        let scale = Tensor::fill_with_spec(&[1], 1.0 / self.size() as f64, self.device(), self.dtype())?;
        self.sum()?.mul(&scale)
    }

    pub fn sqrt(&self) -> Result<Tensor> {
        self.pow(&Tensor::fill_like(self, 0.5)?)
    }

    /// `self * rhs^-1`
    pub fn div(&self, rhs: &Tensor) -> Result<Tensor> {
        self.mul(&rhs.pow(&Tensor::fill_like(rhs, -1.0)?)?)
    }

    pub fn swish(&self) -> Result<Tensor> {
        self.mul(&self.sigmoid()?)
    }

    /// `2 * sigmoid(2x) - 1`
    pub fn tanh(&self) -> Result<Tensor> {
        let two = Tensor::fill_like(self, 2.0)?;
        let one = Tensor::fill_like(self, 1.0)?;
        self.mul(&two)?.sigmoid()?.mul(&two)?.sub(&one)
    }
}
