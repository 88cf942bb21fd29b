use super::{HistoryRepresentation, Representation};
use anyhow::Result;
use candle_core::{Tensor, D};

const EPS: f64 = 1e-12;

fn l2_normalize(xs: &Tensor) -> Result<Tensor> {
    let norm = xs.sqr()?.sum_keepdim(D::Minus1)?.affine(1.0, EPS)?.sqrt()?;
    Ok(xs.broadcast_div(&norm)?)
}

/// Scales every feature vector of the wrapped representation to unit L2 norm.
pub struct NormalizationRepresentation<R> {
    inner: R,
}

impl<R> NormalizationRepresentation<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<I, R: Representation<I>> Representation<I> for NormalizationRepresentation<R> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn forward(&self, inputs: &[I]) -> Result<Tensor> {
        l2_normalize(&self.inner.forward(inputs)?)
    }
}

impl<R: HistoryRepresentation> HistoryRepresentation for NormalizationRepresentation<R> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn forward(&self, inputs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (features, hidden) = self.inner.forward(inputs)?;
        Ok((l2_normalize(&features)?, hidden))
    }
}
