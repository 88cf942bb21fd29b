use super::{HistoryRepresentation, Representation};
use anyhow::Result;
use candle_core::{Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Projects the features of the wrapped representation to `dim` dimensions
/// with a linear layer followed by ReLU.
///
/// For a history representation, only the history features are resized;
/// the final hidden state is passed through.
pub struct ResizeRepresentation<R> {
    inner: R,
    dim: usize,
    linear: Linear,
}

impl<R> ResizeRepresentation<R> {
    /// Wraps `inner`, whose features have `in_dim` dimensions.
    pub fn build(vb: VarBuilder, inner: R, in_dim: usize, dim: usize) -> Result<Self> {
        let linear = linear(in_dim, dim, vb.pp("resize"))?;
        Ok(Self { inner, dim, linear })
    }

    fn resize(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.linear.forward(xs)?.relu()?)
    }
}

impl<I, R: Representation<I>> Representation<I> for ResizeRepresentation<R> {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, inputs: &[I]) -> Result<Tensor> {
        self.resize(&self.inner.forward(inputs)?)
    }
}

impl<R: HistoryRepresentation> HistoryRepresentation for ResizeRepresentation<R> {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, inputs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (features, hidden) = self.inner.forward(inputs)?;
        Ok((self.resize(&features)?, hidden))
    }
}
