mod utils;

use tinyad_core::{
    device::Device,
    error::{Error, Result},
    runtime::is_accelerator_available,
};
use tinyad_tensor::Tensor;
use utils::setup;

// No accelerator runtime is registered in this test binary.

#[test]
fn accelerator_request_fails() -> Result<()> {
    setup();
    assert!(!is_accelerator_available());

    let x = Tensor::new(vec![1.0f32, 2.0])?;
    match x.to_accelerator() {
        Err(Error::BackendUnavailable { device }) => assert_eq!(device, Device::Accelerator),
        other => panic!("expected BackendUnavailable, got {:?}", other.map(|t| t.device())),
    }
    assert!(matches!(
        Tensor::zeros_with_spec(&[2], Device::Accelerator, x.dtype()),
        Err(Error::BackendUnavailable { .. })
    ));

    // host stays usable
    assert!(x.to_host()?.ptr_eq(&x));

    Ok(())
}
