use std::collections::BTreeMap;
use tinyad_core::error::{Error, Result};

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Shape(Vec<usize>),
}

impl AttrValue {
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Shape(_) => "shape",
        }
    }

    fn same_kind(&self, other: &AttrValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Float(value as f64)
    }
}

impl From<Vec<usize>> for AttrValue {
    fn from(value: Vec<usize>) -> Self {
        AttrValue::Shape(value)
    }
}

impl From<&[usize]> for AttrValue {
    fn from(value: &[usize]) -> Self {
        AttrValue::Shape(value.to_vec())
    }
}

/// Named parameters of one operation.
///
/// The defaults an operation is registered with double as its schema: a key
/// absent from the defaults is not an option of that operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, key: &str) -> Result<&AttrValue> {
        self.get(key)
            .ok_or_else(|| Error::InvalidArgument(format!("missing attribute '{}'", key)))
    }

    fn wrong_kind(key: &str, expected: &str, got: &AttrValue) -> Error {
        Error::InvalidArgument(format!("attribute '{}' must be {}, got {}", key, expected, got.kind()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            AttrValue::Bool(v) => Ok(*v),
            other => Err(Self::wrong_kind(key, "bool", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.require(key)? {
            AttrValue::Int(v) => Ok(*v),
            other => Err(Self::wrong_kind(key, "int", other)),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            AttrValue::Float(v) => Ok(*v),
            other => Err(Self::wrong_kind(key, "float", other)),
        }
    }

    pub fn get_shape(&self, key: &str) -> Result<&[usize]> {
        match self.require(key)? {
            AttrValue::Shape(v) => Ok(v),
            other => Err(Self::wrong_kind(key, "shape", other)),
        }
    }

    /// Applies `overrides` on top of these defaults.
    pub fn resolve(&self, overrides: &Attributes) -> Result<Attributes> {
        let mut resolved = self.clone();
        for (key, value) in &overrides.values {
            let default = self
                .values
                .get(key)
                .ok_or_else(|| Error::InvalidArgument(format!("unknown attribute '{}'", key)))?;
            if !default.same_kind(value) {
                return Err(Self::wrong_kind(key, default.kind(), value));
            }
            resolved.values.insert(key.clone(), value.clone());
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win() -> Result<()> {
        let defaults = Attributes::new().with("slope", 0.01).with("inplace", false);
        let resolved = defaults.resolve(&Attributes::new().with("slope", 0.2))?;

        assert_eq!(resolved.get_float("slope")?, 0.2);
        assert!(!resolved.get_bool("inplace")?);
        assert_eq!(defaults.get_float("slope")?, 0.01);

        Ok(())
    }

    #[test]
    fn unknown_or_mistyped_override() {
        let defaults = Attributes::new().with("slope", 0.01);

        let unknown = defaults.resolve(&Attributes::new().with("alpha", 1.0));
        assert!(matches!(unknown, Err(Error::InvalidArgument(_))));

        let mistyped = defaults.resolve(&Attributes::new().with("slope", 3i64));
        assert!(matches!(mistyped, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn typed_getters() {
        let attrs = Attributes::new().with("shape", vec![2usize, 3]);
        assert_eq!(attrs.get_shape("shape").ok(), Some(&[2usize, 3][..]));
        assert!(attrs.get_float("shape").is_err());
        assert!(attrs.get_int("missing").is_err());
    }
}
