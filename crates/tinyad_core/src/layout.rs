use crate::error::{Error, Result};

/// Shape of a contiguous, row-major buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Layout {
    pub fn from_shape(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: Self::compute_strides(shape),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        self.shape.get(dim).copied()
    }
    pub fn size(&self) -> usize {
        Self::compute_size(&self.shape)
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn view(&mut self, new_shape: &[usize]) -> Result<()> {
        let old_size = self.size();
        let new_size = Self::compute_size(new_shape);

        if old_size != new_size {
            return Err(Error::IncompatibleShape(format!(
                "Cannot reshape layout of size {} to size {}",
                old_size, new_size
            )));
        }

        self.shape = new_shape.to_vec();
        self.strides = Self::compute_strides(new_shape);

        Ok(())
    }

    // helper

    pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    pub fn compute_size(shape: &[usize]) -> usize {
        shape.iter().product()
    }
}
