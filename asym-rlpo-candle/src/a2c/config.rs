//! Configuration of [`A2cAgent`](super::A2cAgent).
use crate::{models::ModelsConfig, opt::OptimizerConfig, targets::TargetConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Which value function the critic learns.
///
/// The actor is the same in all variants: a policy on the agent's history.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum A2cVariant {
    /// `V(h)` on the agent's own history features.
    A2c,

    /// `V(h, s)` on the critic's history features and the privileged state.
    AsymA2c,

    /// `V(s)` on the privileged state only.
    AsymA2cState,
}

impl A2cVariant {
    /// Keys of the models required by the variant.
    pub fn model_keys(&self) -> &'static [&'static str] {
        match self {
            Self::A2c => &[
                "action_model",
                "observation_model",
                "history_model",
                "policy_model",
                "vh_model",
            ],
            Self::AsymA2c => &[
                "action_model",
                "observation_model",
                "history_model",
                "policy_model",
                "critic_state_model",
                "critic_action_model",
                "critic_observation_model",
                "critic_history_model",
                "vhs_model",
            ],
            Self::AsymA2cState => &[
                "action_model",
                "observation_model",
                "history_model",
                "policy_model",
                "critic_state_model",
                "vs_model",
            ],
        }
    }
}

/// Configuration of [`A2cAgent`](super::A2cAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct A2cConfig {
    /// Critic variant.
    pub variant: A2cVariant,

    /// Discount factor in `(0, 1]`.
    pub discount: f64,

    /// Value target.
    pub target: TargetConfig,

    /// Weight of the actor loss.
    pub actor_weight: f64,

    /// Weight of the critic loss.
    pub critic_weight: f64,

    /// Weight of the negentropy loss.
    pub negentropy_weight: f64,

    /// Number of episodes per optimization step.
    pub batch_size: usize,

    /// Number of buffered episodes required before optimization starts.
    pub min_episodes_warmup: usize,

    /// Models.
    pub models: ModelsConfig,

    /// Optimizer.
    pub opt_config: OptimizerConfig,

    /// Upper bound of the global gradient norm of an optimization step.
    #[serde(default)]
    pub max_grad_norm: Option<f64>,

    /// Device on which the models are placed.
    pub device: Device,
}

impl Default for A2cConfig {
    fn default() -> Self {
        Self {
            variant: A2cVariant::A2c,
            discount: 0.99,
            target: TargetConfig::Td0,
            actor_weight: 1.0,
            critic_weight: 1.0,
            negentropy_weight: 0.01,
            batch_size: 1,
            min_episodes_warmup: 1,
            models: ModelsConfig::default(),
            opt_config: OptimizerConfig::default(),
            max_grad_norm: None,
            device: Device::Cpu,
        }
    }
}

impl A2cConfig {
    /// Sets the critic variant.
    pub fn variant(mut self, v: A2cVariant) -> Self {
        self.variant = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount(mut self, v: f64) -> Self {
        self.discount = v;
        self
    }

    /// Sets the value target.
    pub fn target(mut self, v: TargetConfig) -> Self {
        self.target = v;
        self
    }

    /// Sets the weights of the actor, critic and negentropy losses.
    pub fn loss_weights(mut self, actor: f64, critic: f64, negentropy: f64) -> Self {
        self.actor_weight = actor;
        self.critic_weight = critic;
        self.negentropy_weight = negentropy;
        self
    }

    /// Sets the number of episodes per optimization step.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of episodes required before optimization.
    pub fn min_episodes_warmup(mut self, v: usize) -> Self {
        self.min_episodes_warmup = v;
        self
    }

    /// Sets the model configuration.
    pub fn models(mut self, v: ModelsConfig) -> Self {
        self.models = v;
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the bound on the gradient norm.
    pub fn max_grad_norm(mut self, v: Option<f64>) -> Self {
        self.max_grad_norm = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A2cConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
