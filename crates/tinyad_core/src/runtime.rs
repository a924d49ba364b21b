//! Accelerator backend capability.
//!
//! The engine never talks to accelerator hardware directly. An external
//! initialisation routine is registered with [`register_accelerator`]; the
//! first request for the accelerator runs it once and the outcome is memoised
//! for the rest of the process. The host backend needs none of this and is
//! always available.

use crate::{
    device::Device,
    error::{Error, Result},
};
use std::{
    ffi::c_void,
    sync::{Arc, OnceLock},
};

/// Raw memory services of an accelerator runtime.
///
/// The shape of this trait follows a driver API: allocations are opaque device
/// pointers and every transfer names its direction.
pub trait AcceleratorRuntime: Send + Sync {
    fn name(&self) -> &str;

    /// # Safety
    /// The returned pointer is only valid for use with this runtime.
    unsafe fn malloc(&self, size_in_bytes: usize) -> Result<*mut c_void>;

    /// # Safety
    /// `ptr` must come from [`malloc`](Self::malloc) on this runtime and must not be used afterwards.
    unsafe fn free(&self, ptr: *mut c_void);

    /// # Safety
    /// `dst` must be a device allocation of at least `size_in_bytes`; `src` a valid host pointer.
    unsafe fn memcpy_h2d(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()>;

    /// # Safety
    /// `dst` must be a valid host pointer; `src` a device allocation of at least `size_in_bytes`.
    unsafe fn memcpy_d2h(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()>;

    /// # Safety
    /// Both pointers must be device allocations of at least `size_in_bytes` that do not overlap.
    unsafe fn memcpy_d2d(&self, dst: *mut c_void, src: *const c_void, size_in_bytes: usize) -> Result<()>;
}

pub type RuntimeInit = fn() -> Result<Arc<dyn AcceleratorRuntime>>;

static RUNTIME_INIT: OnceLock<RuntimeInit> = OnceLock::new();
static RUNTIME: OnceLock<Option<Arc<dyn AcceleratorRuntime>>> = OnceLock::new();

/// Installs the routine that detects and initialises the accelerator.
///
/// Returns `false` if a routine was already installed; the first one wins.
pub fn register_accelerator(init: RuntimeInit) -> bool {
    RUNTIME_INIT.set(init).is_ok()
}

/// Returns the accelerator runtime, initialising it on first use.
pub fn accelerator() -> Result<Arc<dyn AcceleratorRuntime>> {
    let unavailable = || Error::BackendUnavailable {
        device: Device::Accelerator,
    };

    // nothing is memoised until a routine exists, so late registration still works
    let init = RUNTIME_INIT.get().ok_or_else(unavailable)?;

    RUNTIME
        .get_or_init(|| match init() {
            Ok(runtime) => {
                log::info!("accelerator runtime '{}' initialised", runtime.name());
                Some(runtime)
            }
            Err(e) => {
                log::warn!("accelerator runtime initialisation failed: {}", e);
                None
            }
        })
        .clone()
        .ok_or_else(unavailable)
}

pub fn is_accelerator_available() -> bool {
    accelerator().is_ok()
}
