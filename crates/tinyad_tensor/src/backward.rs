use crate::{graph, profile::ProfileOp, storage::Storage, Tensor};
use tinyad_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Seeding,
    Propagating,
    Done,
}

/// Reverse-mode pass over the graph ending at one tensor.
struct BackwardEngine<'a> {
    root: &'a Tensor,
    allow_fill: bool,
    phase: Phase,
}

impl<'a> BackwardEngine<'a> {
    fn new(root: &'a Tensor, allow_fill: bool) -> Self {
        Self {
            root,
            allow_fill,
            phase: Phase::Seeding,
        }
    }

    fn run(mut self) -> Result<()> {
        loop {
            self.phase = match self.phase {
                Phase::Seeding => {
                    self.seed()?;
                    Phase::Propagating
                }
                Phase::Propagating => {
                    self.propagate()?;
                    Phase::Done
                }
                Phase::Done => return Ok(()),
            };
        }
    }

    fn seed(&self) -> Result<()> {
        if !self.allow_fill || self.root.grad()?.is_some() {
            return Ok(());
        }

        let shape = self.root.shape();
        if self.root.size() != 1 {
            return Err(Error::AssertionFailure(format!(
                "implicit gradient creation only valid for scalar outputs, got shape {:?}",
                shape
            )));
        }

        let ones = Storage::ones(&shape, self.root.device(), self.root.dtype())?;
        self.root.store_grad(Tensor::wrap(ones))
    }

    fn propagate(&self) -> Result<()> {
        let order = graph::topo_sort(self.root);
        log::trace!("backward from tensor {} over {} nodes", self.root.id(), order.len());

        for node in order.iter().rev() {
            let ctx = node.producer().ok_or_else(|| {
                Error::AssertionFailure(format!("tensor {} was ordered for backward without a producer", node.id()))
            })?;
            let grad = node.grad()?.ok_or_else(|| {
                Error::AssertionFailure(format!(
                    "tensor {} produced by '{}' has no gradient during backward",
                    node.id(),
                    ctx.name()
                ))
            })?;

            let grads = {
                let grad = grad.storage();
                let _profile = ProfileOp::backward(ctx.name(), &grad);
                ctx.kernel().backward(ctx, &grad)?.into_vec()
            };
            if grads.len() != ctx.parents().len() {
                return Err(Error::AssertionFailure(format!(
                    "backward of '{}' returned {} gradients for {} parents",
                    ctx.name(),
                    grads.len(),
                    ctx.parents().len()
                )));
            }

            for (parent, grad) in ctx.parents().iter().zip(grads) {
                let Some(grad) = grad else {
                    continue;
                };
                if grad.shape() != parent.shape().as_slice() {
                    return Err(Error::ShapeMismatch {
                        op: ctx.name().to_string(),
                        expected: parent.shape(),
                        got: grad.shape().to_vec(),
                    });
                }
                if grad.dtype() != parent.dtype() {
                    log::trace!("backward of '{}' returned {} for a {} parent", ctx.name(), grad.dtype(), parent.dtype());
                    return Err(Error::DTypeMismatch {
                        expected: parent.dtype(),
                        got: grad.dtype(),
                    });
                }
                parent.accumulate_grad(grad)?;
            }
        }

        Ok(())
    }
}

impl Tensor {
    /// Back-propagates from this tensor, seeding a gradient of one when it has
    /// none. The tensor must then hold a single element.
    pub fn backward(&self) -> Result<()> {
        self.backward_with(true)
    }

    /// Like [`backward`](Self::backward); with `allow_fill == false` a missing
    /// gradient on this tensor is an error instead of being seeded.
    pub fn backward_with(&self, allow_fill: bool) -> Result<()> {
        if self.is_leaf() {
            return Ok(());
        }

        BackwardEngine::new(self, allow_fill).run()
    }
}
