//! Representations mapping raw inputs and input histories to feature vectors.
//!
//! * [`Representation`] maps a sequence of inputs (states, observations or
//!   actions) to one feature vector per element.
//! * [`HistoryRepresentation`] maps a sequence of per-step input features to
//!   per-step history features with a recurrent network.
//!
//! [`ResizeRepresentation`] and [`NormalizationRepresentation`] wrap either kind.
mod embedding;
mod history;
mod identity;
mod normalization;
mod one_hot;
mod resize;
use anyhow::Result;
use candle_core::Tensor;
pub use embedding::EmbeddingRepresentation;
pub use history::GruHistoryRepresentation;
pub use identity::IdentityRepresentation;
pub use normalization::NormalizationRepresentation;
pub use one_hot::OneHotRepresentation;
pub use resize::ResizeRepresentation;

/// Maps a sequence of inputs of type `I` to features.
pub trait Representation<I>: Send + Sync {
    /// Dimension of a feature vector.
    fn dim(&self) -> usize;

    /// Returns a tensor of shape `(inputs.len(), self.dim())`.
    fn forward(&self, inputs: &[I]) -> Result<Tensor>;
}

/// Maps a sequence of input features to history features.
pub trait HistoryRepresentation: Send + Sync {
    /// Dimension of a history feature vector.
    fn dim(&self) -> usize;

    /// Encodes `inputs` of shape `(1, T, in_dim)`.
    ///
    /// Returns the history features of shape `(1, T, self.dim())` and the
    /// final hidden state of the recurrent network.
    fn forward(&self, inputs: &Tensor) -> Result<(Tensor, Tensor)>;
}

impl<I, R: Representation<I> + ?Sized> Representation<I> for Box<R> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn forward(&self, inputs: &[I]) -> Result<Tensor> {
        (**self).forward(inputs)
    }
}

impl<R: HistoryRepresentation + ?Sized> HistoryRepresentation for Box<R> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn forward(&self, inputs: &Tensor) -> Result<(Tensor, Tensor)> {
        (**self).forward(inputs)
    }
}
