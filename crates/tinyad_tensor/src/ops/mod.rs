//! Default kernel library.
//!
//! Every kernel here is written once against host storage. The accelerator
//! registration of the same kernel stages its inputs and upstream gradients
//! to the host and moves the results back, so saved state always lives on
//! the host.

mod binary;
mod matmul;
mod reduction;
mod transform;
mod unary;

use crate::{
    attributes::Attributes,
    context::OpContext,
    registry::{register, Gradients, OpKernel},
    storage::Storage,
};
use std::sync::Once;
use tinyad_core::{
    device::Device,
    error::{Error, Result},
};

pub(crate) type HostForward = fn(&mut OpContext, &[Storage]) -> Result<Storage>;
pub(crate) type HostBackward = fn(&OpContext, &Storage) -> Result<Gradients>;

static INIT: Once = Once::new();

/// Registers the default kernels for every backend. Must run before the first
/// dispatch; later calls do nothing.
pub fn init() {
    INIT.call_once(|| {
        for device in [Device::Host, Device::Accelerator] {
            binary::register_all(device);
            unary::register_all(device);
            reduction::register_all(device);
            matmul::register_all(device);
            transform::register_all(device);
        }
        log::debug!("registered {} default operations", crate::registry::registered_ops(Device::Host).len());
    });
}

pub(crate) fn register_host_kernel(
    name: &str,
    device: Device,
    defaults: Attributes,
    forward: HostForward,
    backward: HostBackward,
) {
    let kernel = match device {
        Device::Host => OpKernel::new(name, Device::Host, forward, backward),
        Device::Accelerator => OpKernel::new(
            name,
            Device::Accelerator,
            move |ctx: &mut OpContext, inputs: &[Storage]| {
                let staged = inputs
                    .iter()
                    .map(|input| input.to_device(Device::Host))
                    .collect::<Result<Vec<_>>>()?;
                forward(ctx, &staged)?.to_device(Device::Accelerator)
            },
            move |ctx: &OpContext, grad: &Storage| {
                backward(ctx, &grad.to_device(Device::Host)?)?.try_map(|g| g.to_device(Device::Accelerator))
            },
        ),
    };

    register(kernel.with_defaults(defaults));
}

pub(crate) fn expect_inputs<'a>(name: &str, inputs: &'a [Storage], count: usize) -> Result<&'a [Storage]> {
    if inputs.len() != count {
        return Err(Error::InvalidArgument(format!(
            "'{}' takes {} inputs, got {}",
            name,
            count,
            inputs.len()
        )));
    }
    Ok(inputs)
}

pub(crate) fn expect_same_shape(name: &str, lhs: &Storage, rhs: &Storage) -> Result<()> {
    if !lhs.same_shape(rhs) {
        return Err(Error::IncompatibleShape(format!(
            "'{}' needs operands of equal shape, got {:?} and {:?}",
            name,
            lhs.shape(),
            rhs.shape()
        )));
    }
    Ok(())
}
