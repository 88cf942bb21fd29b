use super::Representation;
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use candle_core::{Device, Module, Tensor};
use candle_nn::{embedding, Embedding, VarBuilder};

/// Learned embedding of discrete values in `0..n`.
pub struct EmbeddingRepresentation {
    n: usize,
    dim: usize,
    device: Device,
    embedding: Embedding,
}

impl EmbeddingRepresentation {
    /// Creates an embedding table of `n` vectors of dimension `dim`.
    pub fn build(vb: VarBuilder, n: usize, dim: usize) -> Result<Self> {
        let device = vb.device().clone();
        let embedding = embedding(n, dim, vb.pp("embedding"))?;
        Ok(Self {
            n,
            dim,
            device,
            embedding,
        })
    }
}

impl Representation<usize> for EmbeddingRepresentation {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, inputs: &[usize]) -> Result<Tensor> {
        let ids = inputs
            .iter()
            .map(|&x| match x < self.n {
                true => Ok(x as u32),
                false => Err(RlpoError::InvalidInput(format!(
                    "value {} out of range 0..{}",
                    x, self.n
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ids = Tensor::from_vec(ids, (inputs.len(),), &self.device)?;
        Ok(self.embedding.forward(&ids)?)
    }
}
