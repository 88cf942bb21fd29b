use super::Representation;
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use candle_core::{Device, Tensor};

/// Stacks real-valued vectors of a fixed dimension without transformation.
pub struct IdentityRepresentation {
    dim: usize,
    device: Device,
}

impl IdentityRepresentation {
    /// Creates the representation of `dim`-dimensional vectors.
    pub fn new(dim: usize, device: &Device) -> Self {
        Self {
            dim,
            device: device.clone(),
        }
    }
}

impl Representation<Vec<f32>> for IdentityRepresentation {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, inputs: &[Vec<f32>]) -> Result<Tensor> {
        let mut data = Vec::with_capacity(inputs.len() * self.dim);
        for x in inputs {
            if x.len() != self.dim {
                return Err(RlpoError::InvalidInput(format!(
                    "expected a vector of length {}, got {}",
                    self.dim,
                    x.len()
                ))
                .into());
            }
            data.extend_from_slice(x);
        }
        Ok(Tensor::from_vec(data, (inputs.len(), self.dim), &self.device)?)
    }
}
