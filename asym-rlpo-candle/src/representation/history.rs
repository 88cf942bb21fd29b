use super::HistoryRepresentation;
use anyhow::{Context, Result};
use candle_core::Tensor;
use candle_nn::{
    rnn::{gru, GRUConfig, GRU, RNN},
    VarBuilder,
};

/// History representation given by the hidden states of a single-layer GRU.
pub struct GruHistoryRepresentation {
    hidden_size: usize,
    gru: GRU,
}

impl GruHistoryRepresentation {
    /// Builds a GRU taking `in_dim`-dimensional step features.
    pub fn build(vb: VarBuilder, in_dim: usize, hidden_size: usize) -> Result<Self> {
        let gru = gru(in_dim, hidden_size, GRUConfig::default(), vb.pp("gru"))?;
        Ok(Self { hidden_size, gru })
    }
}

impl HistoryRepresentation for GruHistoryRepresentation {
    fn dim(&self) -> usize {
        self.hidden_size
    }

    fn forward(&self, inputs: &Tensor) -> Result<(Tensor, Tensor)> {
        let states = self.gru.seq(inputs)?;
        let hidden = states
            .last()
            .context("GRU received an empty sequence")?
            .h()
            .clone();
        // (1, T, H)
        let hs = states.iter().map(|s| s.h().clone()).collect::<Vec<_>>();
        let features = Tensor::stack(&hs, 1)?;
        Ok((features, hidden))
    }
}
