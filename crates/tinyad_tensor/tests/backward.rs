mod utils;

use tinyad_core::{
    device::Device,
    dtype::DType,
    error::{Error, Result},
};
use tinyad_tensor::{
    context::OpContext, dispatch, graph, register, storage::Storage, Attributes, Gradients, OpKernel, Tensor,
};
use utils::{assert_close, grad_of, setup, tensor_f64};

fn scale_storage(input: &Storage, factor: f64) -> Result<Storage> {
    let values: Vec<f64> = input.to_flatten_vec::<f64>()?.into_iter().map(|v| v * factor).collect();
    Storage::from_flatten_vec_as(values, input.shape(), input.device(), input.dtype())
}

fn register_double(name: &str) {
    register(OpKernel::new(
        name,
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| scale_storage(&inputs[0], 2.0),
        |_: &OpContext, grad: &Storage| Ok(Gradients::from(scale_storage(grad, 2.0)?)),
    ));
}

#[test]
fn leaf_backward_is_noop() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32, 2.0, 3.0])?;
    x.backward()?;
    assert!(x.grad()?.is_none());

    let seeded = Tensor::new(vec![5.0f32])?;
    seeded.set_grad(&Tensor::new(vec![7.0f32])?)?;
    seeded.backward()?;
    assert_eq!(grad_of(&seeded)?, vec![7.0]);

    Ok(())
}

#[test]
fn mul_scenario() -> Result<()> {
    setup();

    let a = Tensor::new(vec![2.0f32])?;
    let b = Tensor::new(vec![3.0f32])?;
    let c = a.mul(&b)?;
    c.backward()?;

    assert_eq!(grad_of(&a)?, vec![3.0]);
    assert_eq!(grad_of(&b)?, vec![2.0]);
    assert_eq!(grad_of(&c)?, vec![1.0]);

    Ok(())
}

#[test]
fn custom_double_op() -> Result<()> {
    setup();
    register_double("test_double");

    let x = Tensor::new(vec![1.0f32])?;
    let once = dispatch("test_double", &[&x], &Attributes::new())?;
    let y = dispatch("test_double", &[&once], &Attributes::new())?;
    assert_eq!(y.to_flatten_vec::<f32>()?, vec![4.0]);
    assert_eq!(y.producer().map(|ctx| ctx.name().to_string()), Some("test_double".to_string()));

    y.backward()?;
    assert_eq!(grad_of(&x)?, vec![4.0]);

    Ok(())
}

#[test]
fn diamond_accumulates_both_paths() -> Result<()> {
    setup();

    let values = vec![0.5f64, -1.5, 2.0];

    // y = sum(x * x) + sum(exp(x))
    let x = tensor_f64(values.clone())?;
    let y = x.mul(&x)?.sum()?.add(&x.exp()?.sum()?)?;
    y.backward()?;

    let x1 = tensor_f64(values.clone())?;
    x1.mul(&x1)?.sum()?.backward()?;
    let x2 = tensor_f64(values.clone())?;
    x2.exp()?.sum()?.backward()?;

    let summed: Vec<f64> = grad_of(&x1)?.iter().zip(grad_of(&x2)?).map(|(a, b)| a + b).collect();
    assert_close(&grad_of(&x)?, &summed, 1e-12);

    let expected: Vec<f64> = values.iter().map(|v| 2.0 * v + v.exp()).collect();
    assert_close(&grad_of(&x)?, &expected, 1e-12);

    Ok(())
}

#[test]
fn non_scalar_needs_explicit_seed() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32, 2.0])?;
    let y = x.mul(&x)?;
    assert!(matches!(y.backward(), Err(Error::AssertionFailure(_))));
    assert!(x.grad()?.is_none());

    y.set_grad(&Tensor::new(vec![1.0f32, 0.5])?)?;
    y.backward()?;
    assert_eq!(grad_of(&x)?, vec![2.0, 2.0]);

    Ok(())
}

#[test]
fn backward_without_fill() -> Result<()> {
    setup();

    let x = Tensor::new(vec![3.0f32])?;
    let y = x.mul(&x)?;
    assert!(matches!(y.backward_with(false), Err(Error::AssertionFailure(_))));

    y.set_grad(&Tensor::new(vec![1.0f32])?)?;
    y.backward_with(false)?;
    assert_eq!(grad_of(&x)?, vec![6.0]);

    Ok(())
}

#[test]
fn bad_gradient_shape_is_reported() -> Result<()> {
    setup();
    register(OpKernel::new(
        "test_bad_grad",
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| Ok(inputs[0].clone()),
        |_: &OpContext, grad: &Storage| Ok(Gradients::from(Storage::zeros(&[3], grad.device(), grad.dtype())?)),
    ));

    let x = Tensor::new(vec![1.0f32])?;
    let y = dispatch("test_bad_grad", &[&x], &Attributes::new())?;
    match y.backward() {
        Err(Error::ShapeMismatch { op, expected, got }) => {
            assert_eq!(op, "test_bad_grad");
            assert_eq!(expected, vec![1]);
            assert_eq!(got, vec![3]);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other.err()),
    }

    Ok(())
}

#[test]
fn bad_gradient_dtype_is_reported() -> Result<()> {
    setup();
    register(OpKernel::new(
        "test_widening_grad",
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| Ok(inputs[0].clone()),
        |_: &OpContext, grad: &Storage| {
            let widened = grad.to_flatten_vec::<f64>()?;
            Ok(Gradients::from(Storage::from_flatten_vec(widened, grad.shape(), grad.device())?))
        },
    ));

    let x = Tensor::new(vec![1.0f32, 2.0])?;
    let y = dispatch("test_widening_grad", &[&x], &Attributes::new())?;
    y.set_grad(&Tensor::ones_like(&y)?)?;
    match y.backward() {
        Err(Error::DTypeMismatch { expected, got }) => {
            assert_eq!(expected, DType::F32);
            assert_eq!(got, DType::F64);
        }
        other => panic!("expected DTypeMismatch, got {:?}", other.err()),
    }
    assert!(x.grad()?.is_none());

    let wide = Tensor::new_with_spec(vec![1.0f64, 1.0], Device::Host, DType::F64)?;
    assert!(matches!(x.set_grad(&wide), Err(Error::DTypeMismatch { .. })));

    Ok(())
}

#[test]
fn wrong_gradient_count_is_reported() -> Result<()> {
    setup();
    register(OpKernel::new(
        "test_short_grads",
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| Ok(inputs[0].clone()),
        |_: &OpContext, grad: &Storage| Ok(Gradients::Many(vec![Some(grad.clone())])),
    ));

    let x = Tensor::new(vec![1.0f32])?;
    let y = dispatch("test_short_grads", &[&x, &x], &Attributes::new())?;
    assert!(matches!(y.backward(), Err(Error::AssertionFailure(_))));

    Ok(())
}

#[test]
fn absent_gradient_slot_is_skipped() -> Result<()> {
    setup();
    // treats the second input as a non-differentiable mask
    register(OpKernel::new(
        "test_masked",
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| Ok(inputs[0].clone()),
        |_: &OpContext, grad: &Storage| Ok(Gradients::Many(vec![Some(grad.clone()), None])),
    ));

    let x = Tensor::new(vec![1.0f32])?;
    let mask = Tensor::new(vec![0.0f32])?;
    let y = dispatch("test_masked", &[&x, &mask], &Attributes::new())?;
    y.backward()?;

    assert_eq!(grad_of(&x)?, vec![1.0]);
    assert!(mask.grad()?.is_none());

    Ok(())
}

#[test]
fn every_gradient_matches_its_shape() -> Result<()> {
    setup();

    let x = Tensor::randn(&[3, 4])?;
    let w = Tensor::randn(&[4, 2])?;
    let loss = x.dot(&w)?.sigmoid()?.reshape(&[6])?.logsoftmax()?.mean()?;
    loss.backward()?;

    let nodes = graph::topo_sort(&loss);
    assert!(!nodes.is_empty());
    for t in nodes.iter().chain([&x, &w]) {
        let grad = t.grad()?.ok_or_else(|| Error::AssertionFailure("missing grad".into()))?;
        assert_eq!(grad.shape(), t.shape());
        assert_eq!(grad.device(), t.device());
        assert_eq!(grad.dtype(), t.dtype());
    }

    Ok(())
}

#[test]
fn second_backward_accumulates() -> Result<()> {
    setup();

    let x = Tensor::new(vec![2.0f32])?;
    let y = x.mul(&x)?;
    y.backward()?;
    assert_eq!(grad_of(&x)?, vec![4.0]);

    x.zero_grad()?;
    let z = x.mul(&x)?;
    z.backward()?;
    assert_eq!(grad_of(&x)?, vec![4.0]);

    let w = x.mul(&x)?;
    w.backward()?;
    assert_eq!(grad_of(&x)?, vec![8.0]);

    Ok(())
}

#[test]
fn unregistered_op() {
    setup();

    let x = Tensor::new(vec![1.0f32]).unwrap();
    match dispatch("test_never_registered", &[&x], &Attributes::new()) {
        Err(Error::OperationNotFound { name, device }) => {
            assert_eq!(name, "test_never_registered");
            assert_eq!(device, Device::Host);
        }
        other => panic!("expected OperationNotFound, got {:?}", other.err()),
    }
    assert!(matches!(dispatch("add", &[], &Attributes::new()), Err(Error::InvalidArgument(_))));
}

#[test]
fn attributes_default_and_override() -> Result<()> {
    setup();

    let x = Tensor::new(vec![-2.0f32, 3.0])?;

    let default = x.leakyrelu()?;
    assert_close(&default.to_flatten_vec::<f64>()?, &[-0.02, 3.0], 1e-6);
    assert_eq!(default.producer().map(|ctx| ctx.attributes().get_float("slope").ok()), Some(Some(0.01)));

    let custom = x.leakyrelu_with(0.5)?;
    assert_eq!(custom.to_flatten_vec::<f32>()?, vec![-1.0, 3.0]);

    custom.set_grad(&Tensor::ones_like(&custom)?)?;
    custom.backward()?;
    assert_eq!(grad_of(&x)?, vec![0.5, 1.0]);

    let unknown = dispatch("leakyrelu", &[&x], &Attributes::new().with("alpha", 1.0));
    assert!(matches!(unknown, Err(Error::InvalidArgument(_))));

    Ok(())
}

#[test]
fn reregistration_overwrites() -> Result<()> {
    setup();
    register_double("test_replaced");
    register(OpKernel::new(
        "test_replaced",
        Device::Host,
        |_: &mut OpContext, inputs: &[Storage]| scale_storage(&inputs[0], 3.0),
        |_: &OpContext, grad: &Storage| Ok(Gradients::from(scale_storage(grad, 3.0)?)),
    ));

    let x = Tensor::new(vec![1.0f32])?;
    let y = dispatch("test_replaced", &[&x], &Attributes::new())?;
    assert_eq!(y.to_flatten_vec::<f32>()?, vec![3.0]);

    Ok(())
}

#[test]
fn in_place_operators_replace_data() -> Result<()> {
    setup();

    let mut x = Tensor::new(vec![1.0f32, 2.0])?;
    let alias = x.clone();
    let id = x.id();
    let y = Tensor::new(vec![10.0f32, 20.0])?;

    x += &y;
    assert_eq!(x.to_flatten_vec::<f32>()?, vec![11.0, 22.0]);
    assert_eq!(alias.to_flatten_vec::<f32>()?, vec![11.0, 22.0]);
    assert_eq!(x.id(), id);
    assert!(x.is_leaf());

    x *= Tensor::new(vec![2.0f32, 0.5])?;
    x -= &y;
    x /= Tensor::new(vec![4.0f32, 1.0])?;
    assert_close(&x.to_flatten_vec::<f64>()?, &[3.0, -9.0], 1e-6);

    let z = &x + &y;
    assert!(!z.is_leaf());
    assert_close(&(z * &y).to_flatten_vec::<f64>()?, &[130.0, 220.0], 1e-6);

    Ok(())
}

#[test]
fn in_place_keeps_saved_operands() -> Result<()> {
    setup();

    let mut a = Tensor::new(vec![2.0f32])?;
    let b = Tensor::new(vec![3.0f32])?;
    let c = a.mul(&b)?;

    // history recorded before the assignment still replays against the old data
    a += Tensor::new(vec![100.0f32])?;
    c.backward()?;
    assert_eq!(grad_of(&b)?, vec![2.0]);
    assert_eq!(a.to_flatten_vec::<f32>()?, vec![102.0]);

    Ok(())
}

#[test]
fn assign_rejects_other_shapes() -> Result<()> {
    setup();

    let x = Tensor::new(vec![1.0f32, 2.0])?;
    let y = Tensor::new(vec![1.0f32, 2.0, 3.0])?;
    assert!(matches!(x.assign(&y), Err(Error::IncompatibleShape(_))));
    assert!(matches!(x.set_grad(&y), Err(Error::ShapeMismatch { .. })));

    Ok(())
}
