use half::{bf16, f16};
use std::{ffi::c_void, mem::size_of, sync::Arc};
use tinyad_core::{
    be,
    buffer::{Buffer, BufferManager},
    device::Device,
    dtype::{DType, Element},
    error::{Error, Result},
    layout::Layout,
};

/// Opaque handle to a contiguous buffer on one device, together with its shape.
///
/// Cloning a `Storage` shares the underlying buffer. Buffers are never written
/// after construction, so sharing is always safe.
#[derive(Clone)]
pub struct Storage {
    buffer: Arc<dyn Buffer>,
    layout: Layout,
}

impl Storage {
    pub fn new(buffer: Arc<dyn Buffer>, layout: Layout) -> Result<Self> {
        if buffer.len() != layout.size() {
            return Err(Error::TypeMismatch(format!(
                "buffer holds {} elements but shape {:?} needs {}",
                buffer.len(),
                layout.shape(),
                layout.size()
            )));
        }

        Ok(Self { buffer, layout })
    }

    /// Allocates a buffer and hands it to `init` to be written exactly once.
    pub fn build<F>(shape: &[usize], device: Device, dtype: DType, init: F) -> Result<Self>
    where
        F: FnOnce(&mut dyn Buffer) -> Result<()>,
    {
        let layout = Layout::from_shape(shape);
        let mut buffer = BufferManager::create(layout.size(), device, dtype)?;
        init(Arc::get_mut(&mut buffer).ok_or(Error::BufferLocked)?)?;

        Ok(Self { buffer, layout })
    }

    pub fn full(shape: &[usize], device: Device, dtype: DType, value: f64) -> Result<Self> {
        let size = Layout::compute_size(shape);
        let host = match dtype {
            DType::F32 | DType::F64 => Self::build(shape, Device::Host, dtype, |out| unsafe { be::ops::unary::fill(out, size, value) })?,
            DType::F16 => Self::from_flatten_vec(vec![f16::from_f64(value); size], shape, Device::Host)?,
            DType::BF16 => Self::from_flatten_vec(vec![bf16::from_f64(value); size], shape, Device::Host)?,
            other => return Err(Error::UnsupportedDType(other)),
        };

        host.to_device(device)
    }

    pub fn zeros(shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        Self::full(shape, device, dtype, 0.0)
    }

    pub fn ones(shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        Self::full(shape, device, dtype, 1.0)
    }

    pub fn from_flatten_vec<T: Element>(data: Vec<T>, shape: &[usize], device: Device) -> Result<Self> {
        let layout = Layout::from_shape(shape);
        if data.len() != layout.size() {
            return Err(Error::TypeMismatch(format!(
                "{} elements cannot fill shape {:?}",
                data.len(),
                shape
            )));
        }

        let bytes = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, data.len() * size_of::<T>()) };
        let buffer = BufferManager::from_host_bytes(bytes, layout.size(), device, T::DTYPE)?;

        Ok(Self { buffer, layout })
    }

    /// Like [`from_flatten_vec`](Self::from_flatten_vec), converting every element to `dtype`.
    pub fn from_flatten_vec_as<T: Element>(data: Vec<T>, shape: &[usize], device: Device, dtype: DType) -> Result<Self> {
        fn convert<S: Element, D: Element>(data: Vec<S>) -> Vec<D> {
            data.into_iter().map(|v| D::from_f64(v.to_f64())).collect()
        }

        if T::DTYPE == dtype {
            return Self::from_flatten_vec(data, shape, device);
        }

        match dtype {
            DType::BF16 => Self::from_flatten_vec(convert::<T, bf16>(data), shape, device),
            DType::F16 => Self::from_flatten_vec(convert::<T, f16>(data), shape, device),
            DType::F32 => Self::from_flatten_vec(convert::<T, f32>(data), shape, device),
            DType::F64 => Self::from_flatten_vec(convert::<T, f64>(data), shape, device),
            DType::BOOL => Self::from_flatten_vec(convert::<T, bool>(data), shape, device),
            DType::U8 => Self::from_flatten_vec(convert::<T, u8>(data), shape, device),
            DType::I32 => Self::from_flatten_vec(convert::<T, i32>(data), shape, device),
            DType::I64 => Self::from_flatten_vec(convert::<T, i64>(data), shape, device),
        }
    }

    /// Copies the elements to the host, converting them to `T` when the dtype differs.
    pub fn to_flatten_vec<T: Element>(&self) -> Result<Vec<T>> {
        fn widen<S: Element>(storage: &Storage) -> Result<Vec<f64>> {
            Ok(storage.read_exact::<S>()?.into_iter().map(Element::to_f64).collect())
        }

        if T::DTYPE == self.dtype() {
            return self.read_exact::<T>();
        }

        let values = match self.dtype() {
            DType::BF16 => widen::<bf16>(self)?,
            DType::F16 => widen::<f16>(self)?,
            DType::F32 => widen::<f32>(self)?,
            DType::F64 => widen::<f64>(self)?,
            DType::BOOL => widen::<bool>(self)?,
            DType::U8 => widen::<u8>(self)?,
            DType::I32 => widen::<i32>(self)?,
            DType::I64 => widen::<i64>(self)?,
        };

        Ok(values.into_iter().map(T::from_f64).collect())
    }

    fn read_exact<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: T::DTYPE,
            });
        }

        let mut out = vec![T::default(); self.size()];
        unsafe {
            self.buffer
                .copy_to_host(out.as_mut_ptr() as *mut c_void, out.len() * size_of::<T>())?;
        }

        Ok(out)
    }

    /// Returns a copy resident on `device`, or a shared clone if already there.
    pub fn to_device(&self, device: Device) -> Result<Self> {
        if self.device() == device {
            return Ok(self.clone());
        }

        Self::build(self.layout.shape(), device, self.dtype(), |out| unsafe { out.copy_from(self.buffer.as_ref()) })
    }

    /// Same buffer seen through a different shape of equal size.
    pub fn reshaped(&self, shape: &[usize]) -> Result<Self> {
        let mut layout = self.layout.clone();
        layout.view(shape)?;

        Ok(Self {
            buffer: Arc::clone(&self.buffer),
            layout,
        })
    }

    pub fn buffer(&self) -> &dyn Buffer {
        self.buffer.as_ref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn device(&self) -> Device {
        self.buffer.device()
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    pub fn same_shape(&self, other: &Storage) -> bool {
        self.shape() == other.shape()
    }

    pub fn shares_buffer(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("shape", &self.shape())
            .field("device", &self.device())
            .field("dtype", &self.dtype())
            .finish()
    }
}
