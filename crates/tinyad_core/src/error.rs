use crate::{device::Device, dtype::DType};
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A tensor was built from a representation the engine cannot hold.
    TypeMismatch(String),
    /// The requested device has no usable backend.
    BackendUnavailable {
        device: Device,
    },
    /// No implementation is registered for this `(name, backend)` pair.
    OperationNotFound {
        name: String,
        device: Device,
    },
    /// A backward-produced gradient disagrees with its parent's shape.
    ShapeMismatch {
        op: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// Internal-consistency violation.
    AssertionFailure(String),

    OutOfMemory,
    UnsupportedDType(DType),
    DTypeMismatch {
        expected: DType,
        got: DType,
    },
    DeviceMismatch {
        expected: Device,
        got: Device,
    },
    InvalidArgument(String),
    IncompatibleShape(String),
    BufferLocked,
    GradLocked,
    External {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            Self::BackendUnavailable { device } => {
                write!(f, "Backend unavailable: no usable backend for {}", device.name())
            }
            Self::OperationNotFound { name, device } => {
                write!(f, "Operation not found: '{}' is not registered for {}", name, device.name())
            }
            Self::ShapeMismatch { op, expected, got } => {
                write!(f, "Shape mismatch in '{}': grad shape must match tensor shape, {:?} != {:?}", op, got, expected)
            }
            Self::AssertionFailure(msg) => write!(f, "Assertion failed: {}", msg),

            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::UnsupportedDType(dtype) => write!(f, "Unsupported data type: {}", dtype),
            Self::DTypeMismatch { expected, got } => {
                write!(f, "DType mismatch: expected {}, got {}", expected, got)
            }
            Self::DeviceMismatch { expected, got } => {
                write!(f, "Device mismatch: expected {}, got {}", expected.name(), got.name())
            }
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::IncompatibleShape(msg) => write!(f, "Incompatible shape: {}", msg),
            Self::BufferLocked => write!(f, "Buffer is locked"),
            Self::GradLocked => write!(f, "Grad is locked"),
            Self::External { message } => write!(f, "External error: {}", message),
        }
    }
}

impl std::error::Error for Error {}
