use crate::runtime::is_accelerator_available;

/// Compute backend a buffer lives on. Also used as the backend tag of the
/// operation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Host,
    Accelerator,
}

impl Device {
    pub fn name(&self) -> String {
        match self {
            Device::Host => "Host".to_string(),
            Device::Accelerator => "Accelerator".to_string(),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Device::Host)
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

thread_local! {
    static DEFAULT_DEVICE: std::cell::Cell<Device> = const { std::cell::Cell::new(Device::Host) };
}

pub fn get_default_device() -> Device {
    DEFAULT_DEVICE.with(|d| d.get())
}

pub fn set_default_device(device: Device) {
    DEFAULT_DEVICE.with(|d| d.set(device));
}

/// Picks the accelerator when a runtime is available, the host otherwise.
pub fn auto_set_device() {
    if is_accelerator_available() {
        set_default_device(Device::Accelerator);
    } else {
        set_default_device(Device::Host);
    }
}
