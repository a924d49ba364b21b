use crate::Tensor;
use std::fmt;

fn write_nested(f: &mut fmt::Formatter<'_>, data: &[f64], shape: &[usize]) -> fmt::Result {
    match shape {
        [] => write!(f, "{:.8}", data.first().copied().unwrap_or_default()),
        [_] => {
            write!(f, "[")?;
            for (i, val) in data.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.8}", val)?;
            }
            write!(f, "]")
        }
        [outer, inner @ ..] => {
            let stride: usize = inner.iter().product();
            write!(f, "[")?;
            for i in 0..*outer {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_nested(f, &data[i * stride..(i + 1) * stride], inner)?;
            }
            write!(f, "]")
        }
    }
}

fn write_data(f: &mut fmt::Formatter<'_>, tensor: &Tensor) -> fmt::Result {
    match tensor.to_flatten_vec::<f64>() {
        Ok(data) => write_nested(f, &data, &tensor.shape()),
        Err(_) => write!(f, "<unreadable>"),
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor ")?;
        write_data(f, self)?;
        write!(f, " with grad ")?;
        match self.grad() {
            Ok(Some(grad)) => write_data(f, &grad),
            Ok(None) => write!(f, "None"),
            Err(_) => write!(f, "<locked>"),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id())
            .field("shape", &self.shape())
            .field("device", &self.device())
            .field("dtype", &self.dtype())
            .field("producer", &self.producer().map(|ctx| ctx.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{storage::Storage, Tensor};
    use tinyad_core::{device::Device, error::Result};

    #[test]
    fn display_nested_with_grad() -> Result<()> {
        let t = Tensor::from_storage(Storage::from_flatten_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2], Device::Host)?)?;
        assert_eq!(
            t.to_string(),
            "Tensor [[1.00000000, 2.00000000], [3.00000000, 4.00000000]] with grad None"
        );

        t.set_grad(&Tensor::from_storage(Storage::zeros(&[2, 2], Device::Host, t.dtype())?)?)?;
        assert!(t.to_string().ends_with("with grad [[0.00000000, 0.00000000], [0.00000000, 0.00000000]]"));

        Ok(())
    }
}
