use crate::{Tensor, TensorId};
use std::collections::HashSet;

/// Post-order walk from `root` along producer edges.
///
/// Every tensor in the result comes after all of its ancestors, so iterating
/// the result in reverse visits each node before anything it depends on.
/// Leaves are traversed but never returned. Shared ancestors are visited once.
pub fn topo_sort(root: &Tensor) -> Vec<Tensor> {
    let mut order = Vec::new();
    let mut visited: HashSet<TensorId> = HashSet::new();
    // (node, index of the next parent to descend into)
    let mut stack: Vec<(Tensor, usize)> = Vec::new();

    visited.insert(root.id());
    stack.push((root.clone(), 0));

    loop {
        let Some((node, cursor)) = stack.last_mut() else {
            break;
        };
        let next = node.producer().and_then(|ctx| ctx.parents().get(*cursor)).cloned();

        match next {
            Some(parent) => {
                *cursor += 1;
                if visited.insert(parent.id()) {
                    stack.push((parent, 0));
                }
            }
            None => {
                if let Some((done, _)) = stack.pop() {
                    if !done.is_leaf() {
                        order.push(done);
                    }
                }
            }
        }
    }

    order
}
