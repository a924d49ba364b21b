use crate::Tensor;
use tinyad_core::{device::Device, error::Result};

impl Tensor {
    /// Returns this tensor resident on `device`.
    ///
    /// A tensor already on `device` is returned as is. Otherwise the result is
    /// a new leaf holding a copy of the data, with the gradient (if any)
    /// migrated the same way.
    pub fn to_device(&self, device: Device) -> Result<Tensor> {
        if self.device() == device {
            return Ok(self.clone());
        }

        let migrated = Tensor::wrap(self.storage().to_device(device)?);
        if let Some(grad) = self.grad()? {
            migrated.store_grad(grad.to_device(device)?)?;
        }

        log::trace!("tensor {} moved to {} as {}", self.id(), device, migrated.id());
        Ok(migrated)
    }

    pub fn to_host(&self) -> Result<Tensor> {
        self.to_device(Device::Host)
    }

    pub fn to_accelerator(&self) -> Result<Tensor> {
        self.to_device(Device::Accelerator)
    }
}
