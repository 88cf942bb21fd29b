//! Asymmetric actor-critic for partially observable environments implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! The agent's policy conditions on the history of actions and observations
//! encoded by a recurrent [`HistoryRepresentation`](representation::HistoryRepresentation),
//! while the critic may additionally see the privileged state of the environment.
//! [`A2c::losses`](a2c::A2c::losses) builds the actor, critic and negentropy
//! losses of one episode.
pub mod a2c;
pub mod mlp;
pub mod model;
pub mod models;
pub mod opt;
pub mod representation;
pub mod targets;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A GPU device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Creates the corresponding [`candle_core::Device`].
    pub fn build(&self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(*n)?),
        }
    }
}
