//! Process-wide operation table and dispatch.
//!
//! Kernels are keyed by `(name, backend)`. The default library is installed by
//! [`crate::init`]; anything registered afterwards under an existing key
//! replaces it.

use crate::{attributes::Attributes, context::OpContext, profile::ProfileOp, storage::Storage, Tensor};
use dashmap::DashMap;
use std::sync::{Arc, LazyLock};
use tinyad_core::{
    device::Device,
    error::{Error, Result},
};

pub type ForwardFn = Arc<dyn Fn(&mut OpContext, &[Storage]) -> Result<Storage> + Send + Sync>;
pub type BackwardFn = Arc<dyn Fn(&OpContext, &Storage) -> Result<Gradients> + Send + Sync>;

/// Per-parent gradients returned by a backward kernel.
///
/// `None` marks a parent that receives no gradient.
#[derive(Debug, Clone)]
pub enum Gradients {
    Single(Option<Storage>),
    Many(Vec<Option<Storage>>),
}

impl Gradients {
    pub fn into_vec(self) -> Vec<Option<Storage>> {
        match self {
            Gradients::Single(grad) => vec![grad],
            Gradients::Many(grads) => grads,
        }
    }

    pub fn try_map<F>(self, mut f: F) -> Result<Self>
    where
        F: FnMut(Storage) -> Result<Storage>,
    {
        let mut apply = |grad: Option<Storage>| grad.map(&mut f).transpose();

        Ok(match self {
            Gradients::Single(grad) => Gradients::Single(apply(grad)?),
            Gradients::Many(grads) => Gradients::Many(grads.into_iter().map(apply).collect::<Result<_>>()?),
        })
    }
}

impl From<Storage> for Gradients {
    fn from(grad: Storage) -> Self {
        Gradients::Single(Some(grad))
    }
}

impl From<Vec<Option<Storage>>> for Gradients {
    fn from(grads: Vec<Option<Storage>>) -> Self {
        Gradients::Many(grads)
    }
}

pub struct OpKernel {
    name: String,
    device: Device,
    forward: ForwardFn,
    backward: BackwardFn,
    defaults: Attributes,
}

impl OpKernel {
    pub fn new<F, B>(name: impl Into<String>, device: Device, forward: F, backward: B) -> Self
    where
        F: Fn(&mut OpContext, &[Storage]) -> Result<Storage> + Send + Sync + 'static,
        B: Fn(&OpContext, &Storage) -> Result<Gradients> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            device,
            forward: Arc::new(forward),
            backward: Arc::new(backward),
            defaults: Attributes::new(),
        }
    }

    /// Declares the recognised attributes and their default values.
    pub fn with_defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn defaults(&self) -> &Attributes {
        &self.defaults
    }

    pub fn forward(&self, ctx: &mut OpContext, inputs: &[Storage]) -> Result<Storage> {
        (self.forward)(ctx, inputs)
    }

    pub fn backward(&self, ctx: &OpContext, grad: &Storage) -> Result<Gradients> {
        (self.backward)(ctx, grad)
    }
}

static OPS: LazyLock<DashMap<(String, Device), Arc<OpKernel>>> = LazyLock::new(DashMap::new);

pub fn register(kernel: OpKernel) {
    let key = (kernel.name.clone(), kernel.device);
    if OPS.insert(key, Arc::new(kernel)).is_some() {
        log::trace!("re-registered an existing operation, the new kernel replaces it");
    }
}

pub fn lookup(name: &str, device: Device) -> Result<Arc<OpKernel>> {
    OPS.get(&(name.to_string(), device))
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| Error::OperationNotFound {
            name: name.to_string(),
            device,
        })
}

pub fn is_registered(name: &str, device: Device) -> bool {
    OPS.contains_key(&(name.to_string(), device))
}

/// Names registered for `device`, sorted.
pub fn registered_ops(device: Device) -> Vec<String> {
    let mut names: Vec<String> = OPS
        .iter()
        .filter(|entry| entry.key().1 == device)
        .map(|entry| entry.key().0.clone())
        .collect();
    names.sort();
    names
}

/// Runs the kernel registered for `name` on the backend of the first input
/// and returns its output as a new graph node.
pub fn dispatch(name: &str, inputs: &[&Tensor], overrides: &Attributes) -> Result<Tensor> {
    let first = inputs
        .first()
        .ok_or_else(|| Error::InvalidArgument(format!("'{}' dispatched without inputs", name)))?;
    let device = first.device();

    let kernel = lookup(name, device)?;
    let attributes = kernel.defaults().resolve(overrides)?;

    let parents: Vec<Tensor> = inputs.iter().map(|t| (*t).clone()).collect();
    let storages: Vec<Storage> = parents.iter().map(Tensor::storage).collect();
    let mut ctx = OpContext::new(Arc::clone(&kernel), parents, attributes);

    let output = {
        let _profile = ProfileOp::forward(name, &storages);
        kernel.forward(&mut ctx, &storages)?
    };
    if output.device() != device {
        return Err(Error::DeviceMismatch {
            expected: device,
            got: output.device(),
        });
    }

    log::trace!("{} on {} -> {:?}", name, device, output.shape());
    Ok(Tensor::from_op(output, Arc::new(ctx)))
}
