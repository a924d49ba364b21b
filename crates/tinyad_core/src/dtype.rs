#![allow(non_upper_case_globals)]

pub use ::half::{bf16, f16};

pub const bfloat16: DType = DType::BF16;
pub const float16: DType = DType::F16;
pub const half: DType = DType::F16;
pub const float32: DType = DType::F32;
pub const float64: DType = DType::F64;
pub const bool: DType = DType::BOOL;
pub const uint8: DType = DType::U8;
pub const int32: DType = DType::I32;
pub const int64: DType = DType::I64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    BF16,
    F16,
    F32,
    F64,
    BOOL,
    U8,
    I32,
    I64,
}

impl DType {
    /// The precision every kernel is written for first. Other floating types are
    /// accepted but flagged once.
    pub const CANONICAL: DType = DType::F32;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BF16 => "bf16",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::BOOL => "bool",
            Self::U8 => "u8",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::BF16 => 2,
            Self::F16 => 2,
            Self::F32 => 4,
            Self::F64 => 8,
            Self::BOOL => 1,
            Self::U8 => 1,
            Self::I32 => 4,
            Self::I64 => 8,
        }
    }

    pub fn is_int(&self) -> bool {
        match self {
            Self::BF16 | Self::F16 | Self::F32 | Self::F64 | Self::BOOL => false,
            Self::U8 | Self::I32 | Self::I64 => true,
        }
    }

    pub fn is_float(&self) -> bool {
        match self {
            Self::BF16 | Self::F16 | Self::F32 | Self::F64 => true,
            Self::BOOL | Self::U8 | Self::I32 | Self::I64 => false,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host element types a buffer can be read back into.
pub trait Element: Copy + Default + Send + Sync + 'static {
    const DTYPE: DType;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($($t:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;

                fn from_f64(value: f64) -> Self {
                    value as $t
                }
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_half_element {
    ($($t:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;

                fn from_f64(value: f64) -> Self {
                    <$t>::from_f64(value)
                }
                fn to_f64(self) -> f64 {
                    <$t>::to_f64(self)
                }
            }
        )*
    };
}

impl_element!(f32 => F32, f64 => F64, u8 => U8, i32 => I32, i64 => I64);
impl_half_element!(bf16 => BF16, f16 => F16);

impl Element for bool {
    const DTYPE: DType = DType::BOOL;

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

thread_local! {
    static DEFAULT_DTYPE: std::cell::Cell<DType> = const { std::cell::Cell::new(DType::CANONICAL) };
}

pub fn get_default_dtype() -> DType {
    DEFAULT_DTYPE.with(|d| d.get())
}

pub fn set_default_dtype(dtype: DType) {
    DEFAULT_DTYPE.with(|d| d.set(dtype));
}
