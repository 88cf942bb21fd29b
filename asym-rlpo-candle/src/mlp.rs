//! Multilayer perceptron used for policy and value heads.
mod base;
mod config;
pub use base::Mlp;
use candle_core::{Module, Tensor};
use candle_nn::Linear;
pub use config::MlpConfig;

fn mlp_forward(xs: &Tensor, layers: &[Linear]) -> Result<Tensor, candle_core::Error> {
    let (last, hidden) = match layers.split_last() {
        Some(v) => v,
        None => return Ok(xs.clone()),
    };
    let mut xs = xs.clone();

    for layer in hidden {
        xs = layer.forward(&xs)?.relu()?;
    }

    last.forward(&xs)
}
