use super::Representation;
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use candle_core::{Device, Tensor};

/// One-hot encoding of discrete values in `0..n`.
pub struct OneHotRepresentation {
    n: usize,
    device: Device,
}

impl OneHotRepresentation {
    /// Creates the representation of a discrete space of size `n`.
    pub fn new(n: usize, device: &Device) -> Self {
        Self {
            n,
            device: device.clone(),
        }
    }
}

impl Representation<usize> for OneHotRepresentation {
    fn dim(&self) -> usize {
        self.n
    }

    fn forward(&self, inputs: &[usize]) -> Result<Tensor> {
        let mut data = vec![0f32; inputs.len() * self.n];
        for (t, &x) in inputs.iter().enumerate() {
            if x >= self.n {
                return Err(RlpoError::InvalidInput(format!(
                    "value {} out of range 0..{}",
                    x, self.n
                ))
                .into());
            }
            data[t * self.n + x] = 1.0;
        }
        Ok(Tensor::from_vec(data, (inputs.len(), self.n), &self.device)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_one_hot() -> Result<()> {
        let rep = OneHotRepresentation::new(3, &Device::Cpu);
        let xs = rep.forward(&[2, 0])?;
        assert_eq!(
            xs.to_vec2::<f32>()?,
            vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]]
        );
        assert!(rep.forward(&[3]).is_err());
        Ok(())
    }
}
