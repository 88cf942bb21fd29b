//! Base implementation of records.
use crate::error::RlpoError;
use std::collections::HashMap;

/// Named scalar values, such as the loss terms of one optimization step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, f32>);

impl Record {
    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, f32)]) -> Self {
        Self(s.iter().map(|(k, v)| (k.clone().into(), *v)).collect())
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, RlpoError> {
        self.0
            .get(k)
            .copied()
            .ok_or_else(|| RlpoError::RecordKeyError(k.to_string()))
    }
}
