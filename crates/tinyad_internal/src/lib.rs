pub mod prelude;

pub use tinyad_core as core;
pub use tinyad_tensor as tensor;
