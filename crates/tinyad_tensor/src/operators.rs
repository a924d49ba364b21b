//! Infix and compound-assignment operators.
//!
//! These cannot return `Result`, so a failing dispatch panics with the error.
//! The compound forms go through [`Tensor::assign`]: the receiver keeps its
//! identity and takes the new data, while the graph of the result is dropped.

use crate::Tensor;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Self::Output {
                match Tensor::$method(self, rhs) {
                    Ok(out) => out,
                    Err(e) => panic!("{} failed: {}", stringify!($method), e),
                }
            }
        }

        impl $trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Self::Output {
                <&Tensor as $trait<&Tensor>>::$method(self, &rhs)
            }
        }

        impl $trait<&Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Self::Output {
                <&Tensor as $trait<&Tensor>>::$method(&self, rhs)
            }
        }

        impl $trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Self::Output {
                <&Tensor as $trait<&Tensor>>::$method(&self, &rhs)
            }
        }

        impl $assign_trait<&Tensor> for Tensor {
            fn $assign_method(&mut self, rhs: &Tensor) {
                let result = Tensor::$method(self, rhs).and_then(|out| self.assign(&out));
                if let Err(e) = result {
                    panic!("{} failed: {}", stringify!($assign_method), e);
                }
            }
        }

        impl $assign_trait<Tensor> for Tensor {
            fn $assign_method(&mut self, rhs: Tensor) {
                <Tensor as $assign_trait<&Tensor>>::$assign_method(self, &rhs);
            }
        }
    };
}

impl_binary_operator!(Add, add, AddAssign, add_assign);
impl_binary_operator!(Sub, sub, SubAssign, sub_assign);
impl_binary_operator!(Mul, mul, MulAssign, mul_assign);
impl_binary_operator!(Div, div, DivAssign, div_assign);
