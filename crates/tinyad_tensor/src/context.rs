use crate::{attributes::Attributes, registry::OpKernel, storage::Storage, Tensor};
use std::sync::Arc;
use tinyad_core::{
    device::Device,
    error::{Error, Result},
};

/// Record of one operation invocation.
///
/// Owned by the tensor it produced. Holds the parents in input order, the
/// resolved attributes, and whatever the forward kernel chose to save for
/// its backward counterpart.
pub struct OpContext {
    kernel: Arc<OpKernel>,
    parents: Vec<Tensor>,
    attributes: Attributes,
    saved: Vec<Storage>,
}

impl OpContext {
    pub(crate) fn new(kernel: Arc<OpKernel>, parents: Vec<Tensor>, attributes: Attributes) -> Self {
        Self {
            kernel,
            parents,
            attributes,
            saved: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.kernel.name()
    }

    /// Backend the producing kernel was registered for.
    pub fn device(&self) -> Device {
        self.kernel.device()
    }

    pub fn kernel(&self) -> &Arc<OpKernel> {
        &self.kernel
    }

    pub fn parents(&self) -> &[Tensor] {
        &self.parents
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn save(&mut self, storage: Storage) {
        self.saved.push(storage);
    }

    pub fn saved(&self) -> &[Storage] {
        &self.saved
    }

    pub fn saved_at(&self, index: usize) -> Result<&Storage> {
        self.saved.get(index).ok_or_else(|| {
            Error::AssertionFailure(format!(
                "'{}' has {} saved values, backward asked for #{}",
                self.name(),
                self.saved.len(),
                index
            ))
        })
    }

    pub fn parent_shape(&self, index: usize) -> Result<Vec<usize>> {
        self.parents.get(index).map(Tensor::shape).ok_or_else(|| {
            Error::AssertionFailure(format!(
                "'{}' has {} parents, backward asked for #{}",
                self.name(),
                self.parents.len(),
                index
            ))
        })
    }
}

impl std::fmt::Debug for OpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpContext")
            .field("name", &self.name())
            .field("device", &self.device())
            .field("parents", &self.parents.iter().map(Tensor::id).collect::<Vec<_>>())
            .field("attributes", &self.attributes)
            .finish()
    }
}
