//! A small reverse-mode automatic differentiation engine.
//!
//! Operations on [`Tensor`]s record a graph as they run; [`Tensor::backward`]
//! walks it once in reverse and accumulates gradients into every tensor that
//! contributed. Kernels are looked up by name and backend in a process-wide
//! table filled by [`init`].
//!
//! ```no_run
//! use tinyad::prelude::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     let a = Tensor::new(vec![2.0f32])?;
//!     let b = Tensor::new(vec![3.0f32])?;
//!     let c = a.mul(&b)?;
//!     c.backward()?;
//!
//!     assert_eq!(a.grad()?.map(|g| g.to_flatten_vec::<f32>()).transpose()?, Some(vec![3.0]));
//!     Ok(())
//! }
//! ```

pub use tinyad_internal::*;
pub use tinyad_internal::prelude::{init, Tensor};
