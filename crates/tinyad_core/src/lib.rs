pub mod be;
pub mod buffer;
pub mod config;
pub mod device;
pub mod dtype;
pub mod error;
pub mod layout;
pub mod runtime;

pub use tinyad_cpu as cpu;
