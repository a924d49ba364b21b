use half::{bf16, f16};
use tinyad_core::{
    dtype::Element,
    error::{Error, Result},
};

/// Host values a tensor can be built from: scalars and rectangular nested
/// `Vec`s of up to four dimensions.
pub trait TensorAdapter {
    type Elem: Element;

    fn to_shape(&self) -> Result<Vec<usize>>;
    fn to_flat_vec(self) -> Vec<Self::Elem>;
}

fn ragged(depth: usize) -> Error {
    Error::TypeMismatch(format!("nested data is ragged at depth {}", depth))
}

fn uniform_len<T>(items: &[Vec<T>], depth: usize) -> Result<usize> {
    let len = items.first().map_or(0, Vec::len);
    if items.iter().any(|item| item.len() != len) {
        return Err(ragged(depth));
    }
    Ok(len)
}

macro_rules! impl_tensor_adapter {
    ($($t:ty),* $(,)?) => {
        $(
            impl TensorAdapter for $t {
                type Elem = $t;

                fn to_shape(&self) -> Result<Vec<usize>> {
                    Ok(vec![])
                }
                fn to_flat_vec(self) -> Vec<$t> {
                    vec![self]
                }
            }

            impl TensorAdapter for Vec<$t> {
                type Elem = $t;

                fn to_shape(&self) -> Result<Vec<usize>> {
                    Ok(vec![self.len()])
                }
                fn to_flat_vec(self) -> Vec<$t> {
                    self
                }
            }

            impl TensorAdapter for Vec<Vec<$t>> {
                type Elem = $t;

                fn to_shape(&self) -> Result<Vec<usize>> {
                    Ok(vec![self.len(), uniform_len(self, 1)?])
                }
                fn to_flat_vec(self) -> Vec<$t> {
                    self.into_iter().flatten().collect()
                }
            }

            impl TensorAdapter for Vec<Vec<Vec<$t>>> {
                type Elem = $t;

                fn to_shape(&self) -> Result<Vec<usize>> {
                    let rows = uniform_len(self, 1)?;
                    let mut cols = None;
                    for matrix in self {
                        let len = uniform_len(matrix, 2)?;
                        if *cols.get_or_insert(len) != len {
                            return Err(ragged(2));
                        }
                    }
                    Ok(vec![self.len(), rows, cols.unwrap_or(0)])
                }
                fn to_flat_vec(self) -> Vec<$t> {
                    self.into_iter().flatten().flatten().collect()
                }
            }

            impl TensorAdapter for Vec<Vec<Vec<Vec<$t>>>> {
                type Elem = $t;

                fn to_shape(&self) -> Result<Vec<usize>> {
                    let mut inner: Option<Vec<usize>> = None;
                    for cube in self {
                        let shape = cube.to_shape()?;
                        if *inner.get_or_insert_with(|| shape.clone()) != shape {
                            return Err(ragged(1));
                        }
                    }

                    let mut shape = vec![self.len()];
                    shape.extend(inner.unwrap_or_else(|| vec![0, 0, 0]));
                    Ok(shape)
                }
                fn to_flat_vec(self) -> Vec<$t> {
                    self.into_iter().flatten().flatten().flatten().collect()
                }
            }
        )*
    };
}

impl_tensor_adapter!(f32, f64, f16, bf16, u8, i32, i64, bool);
