mod utils;

use std::collections::HashSet;
use tinyad_core::error::Result;
use tinyad_tensor::{graph::topo_sort, Tensor};
use utils::{grad_of, setup};

fn position(order: &[Tensor], t: &Tensor) -> Option<usize> {
    order.iter().position(|n| n.ptr_eq(t))
}

#[test]
fn leaf_has_empty_order() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32])?;
    assert!(topo_sort(&x).is_empty());

    Ok(())
}

#[test]
fn parents_precede_children() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32, 2.0])?;
    let a = x.exp()?;
    let b = a.mul(&x)?;
    let c = b.add(&a)?;
    let y = c.sum()?;

    let order = topo_sort(&y);
    assert_eq!(order.len(), 4);
    assert!(position(&order, &x).is_none());

    let (pa, pb, pc, py) = (
        position(&order, &a).unwrap(),
        position(&order, &b).unwrap(),
        position(&order, &c).unwrap(),
        position(&order, &y).unwrap(),
    );
    assert!(pa < pb && pb < pc && pc < py);
    assert_eq!(py, order.len() - 1);

    Ok(())
}

#[test]
fn shared_nodes_visited_once() -> Result<()> {
    setup();

    let x = Tensor::new(vec![0.5f32])?;
    let shared = x.sigmoid()?;
    let left = shared.mul(&shared)?;
    let right = shared.exp()?;
    let y = left.add(&right)?;

    let order = topo_sort(&y);
    let ids: HashSet<_> = order.iter().map(Tensor::id).collect();
    assert_eq!(ids.len(), order.len());
    assert_eq!(order.len(), 4);

    Ok(())
}

#[test]
fn deep_chain_does_not_overflow() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32])?;
    let one = Tensor::new(vec![1.0f32])?;
    let mut y = x.clone();
    for _ in 0..2000 {
        y = y.add(&one)?;
    }

    assert_eq!(topo_sort(&y).len(), 2000);
    y.backward()?;
    assert_eq!(grad_of(&x)?, vec![1.0]);
    assert_eq!(grad_of(&one)?, vec![2000.0]);
    assert_eq!(y.item()?, 2001.0);

    Ok(())
}
