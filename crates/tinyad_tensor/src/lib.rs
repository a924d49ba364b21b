pub mod adapter;
pub mod attributes;
mod backward;
mod composite;
pub mod context;
mod creation;
mod d;
mod device;
pub mod graph;
mod operators;
pub(crate) mod ops;
pub mod profile;
pub mod registry;
pub mod storage;

pub use attributes::{AttrValue, Attributes};
pub use creation::manual_seed;
pub use ops::init;
pub use registry::{dispatch, register, Gradients, OpKernel};

use context::OpContext;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, RwLock, RwLockReadGuard,
};
use storage::Storage;
use tinyad_core::{
    device::Device,
    dtype::{DType, Element},
    error::{Error, Result},
};

static NEXT_TENSOR_ID: AtomicUsize = AtomicUsize::new(0);
static PRECISION_WARNED: AtomicBool = AtomicBool::new(false);

/// Identity of a tensor node. Clones of a [`Tensor`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(usize);

impl TensorId {
    fn next() -> Self {
        Self(NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct TensorInner {
    id: TensorId,
    data: RwLock<Storage>,
    grad: RwLock<Option<Tensor>>,
    producer: Option<Arc<OpContext>>,
}

/// A node of the computation graph.
///
/// `Tensor` is a shared handle: clones refer to the same node, see the same
/// data and the same gradient. A tensor owns the context that produced it and
/// that context owns the parents, so a graph lives as long as its outputs.
#[derive(Clone)]
pub struct Tensor(Arc<TensorInner>);

impl Tensor {
    fn with_producer(data: Storage, producer: Option<Arc<OpContext>>) -> Self {
        Self(Arc::new(TensorInner {
            id: TensorId::next(),
            data: RwLock::new(data),
            grad: RwLock::new(None),
            producer,
        }))
    }

    /// Leaf over `data` with no dtype checks.
    pub(crate) fn wrap(data: Storage) -> Self {
        Self::with_producer(data, None)
    }

    pub(crate) fn from_op(data: Storage, producer: Arc<OpContext>) -> Self {
        Self::with_producer(data, Some(producer))
    }

    /// Leaf tensor over an existing storage.
    ///
    /// Fails with `TypeMismatch` for non floating point storage. Floating types
    /// other than `DType::CANONICAL` are accepted, with a one-time warning.
    pub fn from_storage(data: Storage) -> Result<Self> {
        let dtype = data.dtype();
        if !dtype.is_float() {
            return Err(Error::TypeMismatch(format!(
                "tensors hold floating point data, got {}",
                dtype
            )));
        }
        if dtype != DType::CANONICAL && !PRECISION_WARNED.swap(true, Ordering::Relaxed) {
            log::warn!(
                "tensor created with {} data, kernels are tuned for {}",
                dtype,
                DType::CANONICAL
            );
        }

        Ok(Self::wrap(data))
    }

    // data

    fn data(&self) -> RwLockReadGuard<'_, Storage> {
        // a writer only ever swaps in a complete storage
        self.0.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shared handle to the current data.
    pub fn storage(&self) -> Storage {
        self.data().clone()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.data().shape().to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.data().ndim()
    }

    pub fn size(&self) -> usize {
        self.data().size()
    }

    pub fn device(&self) -> Device {
        self.data().device()
    }

    pub fn dtype(&self) -> DType {
        self.data().dtype()
    }

    pub fn to_flatten_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.data().to_flatten_vec()
    }

    pub fn item(&self) -> Result<f64> {
        if self.size() != 1 {
            return Err(Error::InvalidArgument(format!(
                "item() can only be called on a tensor with a single element, but got tensor with {} elements",
                self.size()
            )));
        }

        Ok(self.to_flatten_vec::<f64>()?[0])
    }

    /// Replaces this tensor's data with `other`'s, visible through every handle.
    ///
    /// Only the data moves: the producer of this tensor is kept and `other`'s
    /// graph is dropped. Gradient history recorded before the assignment no
    /// longer describes the new data, which is why the in-place operators
    /// built on this are a deliberate simplification rather than tracked ops.
    pub fn assign(&self, other: &Tensor) -> Result<()> {
        let data = other.storage();
        if data.shape() != self.shape().as_slice() {
            return Err(Error::IncompatibleShape(format!(
                "cannot assign shape {:?} to a tensor of shape {:?}",
                data.shape(),
                self.shape()
            )));
        }
        if data.device() != self.device() {
            return Err(Error::DeviceMismatch {
                expected: self.device(),
                got: data.device(),
            });
        }

        *self.0.data.write().map_err(|_| Error::BufferLocked)? = data;
        Ok(())
    }

    // grad

    pub fn grad(&self) -> Result<Option<Tensor>> {
        Ok(self.0.grad.read().map_err(|_| Error::GradLocked)?.clone())
    }

    /// Seeds the gradient explicitly, e.g. before `backward` on a non-scalar.
    pub fn set_grad(&self, grad: &Tensor) -> Result<()> {
        if grad.shape() != self.shape() {
            return Err(Error::ShapeMismatch {
                op: "set_grad".to_string(),
                expected: self.shape(),
                got: grad.shape(),
            });
        }
        if grad.device() != self.device() {
            return Err(Error::DeviceMismatch {
                expected: self.device(),
                got: grad.device(),
            });
        }
        if grad.dtype() != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: grad.dtype(),
            });
        }

        self.store_grad(grad.detach())
    }

    pub fn zero_grad(&self) -> Result<()> {
        *self.0.grad.write().map_err(|_| Error::GradLocked)? = None;
        Ok(())
    }

    pub(crate) fn store_grad(&self, grad: Tensor) -> Result<()> {
        *self.0.grad.write().map_err(|_| Error::GradLocked)? = Some(grad);
        Ok(())
    }

    /// Adds one upstream contribution to the gradient, adopting it if none exists yet.
    pub(crate) fn accumulate_grad(&self, contribution: Storage) -> Result<()> {
        if contribution.device() != self.device() {
            return Err(Error::DeviceMismatch {
                expected: self.device(),
                got: contribution.device(),
            });
        }
        if contribution.dtype() != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: contribution.dtype(),
            });
        }

        let mut slot = self.0.grad.write().map_err(|_| Error::GradLocked)?;
        let contribution = Tensor::wrap(contribution);
        let updated = match slot.as_ref() {
            None => contribution,
            Some(existing) => existing.add(&contribution)?.detach(),
        };
        *slot = Some(updated);

        Ok(())
    }

    // node

    pub fn id(&self) -> TensorId {
        self.0.id
    }

    pub fn producer(&self) -> Option<&Arc<OpContext>> {
        self.0.producer.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.producer.is_none()
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// New leaf sharing this tensor's data, with no producer and no gradient.
    pub fn detach(&self) -> Tensor {
        Self::wrap(self.storage())
    }
}
