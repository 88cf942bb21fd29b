//! Loss construction of the advantage actor-critic.
use super::A2cVariant;
use crate::{
    mlp::Mlp,
    model::SubModel,
    models::{required, Models},
    representation::{HistoryRepresentation, Representation},
    targets::{TargetFunction, Td0},
};
use anyhow::Result;
use asym_rlpo_core::{error::RlpoError, Episode};
use candle_core::{Device, Tensor, D};
use candle_nn::ops::log_softmax;

/// Loss terms of one episode.
///
/// Each term is a scalar tensor with its own gradient path. The caller
/// combines them, e.g. with a weighted sum, before the optimizer step.
pub struct A2cLosses {
    /// Discount-weighted policy-gradient loss.
    pub actor: Tensor,

    /// Sum of squared errors between values and targets.
    pub critic: Tensor,

    /// Negative sum of the entropies of the action distributions.
    pub negentropy: Tensor,
}

/// Shifts per-step features one step forward in time.
///
/// Row `t` of the output is row `t - 1` of `features`; row 0 is zero.
pub fn shift_forward(features: &Tensor) -> Result<Tensor> {
    let (len, dim) = features.dims2()?;
    let zeros = Tensor::zeros((1, dim), features.dtype(), features.device())?;
    match len {
        0 => Err(RlpoError::EmptyEpisode.into()),
        1 => Ok(zeros),
        _ => Ok(Tensor::cat(&[&zeros, &features.narrow(0, 0, len - 1)?], 0)?),
    }
}

/// Returns `[1, γ, γ², ..., γ^(len-1)]`.
///
/// Powers are computed in `f64` and stored as `f32`. The sequence is strictly
/// decreasing while it stays above [`f32::MIN_POSITIVE`] (`t < 829` for
/// `γ = 0.9`). Smaller powers are subnormal and flush to zero beyond `t ≈ 980`.
pub fn discounts(discount: f64, len: usize, device: &Device) -> Result<Tensor> {
    let discounts = (0..len)
        .map(|t| discount.powi(t as i32) as f32)
        .collect::<Vec<_>>();
    Ok(Tensor::from_vec(discounts, (len,), device)?)
}

/// Encodes the action-observation history of an episode.
struct HistoryEncoder<O> {
    action_model: Box<dyn Representation<usize>>,
    observation_model: Box<dyn Representation<O>>,
    history_model: Box<dyn HistoryRepresentation>,
}

impl<O> HistoryEncoder<O> {
    /// Per-step inputs `[action features of a[t-1] ‖ observation features of o[t]]`.
    fn inputs<S>(&self, episode: &Episode<S, O>) -> Result<Tensor> {
        let action_features = self.action_model.forward(episode.actions())?;
        let action_features = shift_forward(&action_features)?;
        let observation_features = self.observation_model.forward(episode.observations())?;
        Ok(Tensor::cat(
            &[&action_features, &observation_features],
            D::Minus1,
        )?)
    }

    /// History features of shape `(T, dim)`.
    fn features<S>(&self, episode: &Episode<S, O>) -> Result<Tensor> {
        let inputs = self.inputs(episode)?;
        let (history_features, _) = self.history_model.forward(&inputs.unsqueeze(0)?)?;
        Ok(history_features.squeeze(0)?)
    }
}

enum Critic<S, O> {
    History {
        vh_model: Mlp,
    },
    HistoryState {
        encoder: HistoryEncoder<O>,
        critic_state_model: Box<dyn Representation<S>>,
        vhs_model: Mlp,
    },
    State {
        critic_state_model: Box<dyn Representation<S>>,
        vs_model: Mlp,
    },
}

/// Advantage actor-critic on observation histories.
///
/// The models are passed in at construction and only read by
/// [`A2c::losses`]; updating them is the business of the optimizer.
pub struct A2c<S, O> {
    variant: A2cVariant,
    device: Device,
    encoder: HistoryEncoder<O>,
    policy_model: Mlp,
    critic: Critic<S, O>,
}

impl<S, O> A2c<S, O> {
    /// Takes the models required by `variant` out of `models`.
    ///
    /// Fails with [`RlpoError::ModelKey`] if one of them is missing.
    pub fn build(variant: A2cVariant, mut models: Models<S, O>, device: &Device) -> Result<Self> {
        let encoder = HistoryEncoder {
            action_model: required(&mut models.action_model, "action_model")?,
            observation_model: required(&mut models.observation_model, "observation_model")?,
            history_model: required(&mut models.history_model, "history_model")?,
        };
        let policy_model = required(&mut models.policy_model, "policy_model")?;
        let critic = match variant {
            A2cVariant::A2c => Critic::History {
                vh_model: required(&mut models.vh_model, "vh_model")?,
            },
            A2cVariant::AsymA2c => Critic::HistoryState {
                encoder: HistoryEncoder {
                    action_model: required(&mut models.critic_action_model, "critic_action_model")?,
                    observation_model: required(
                        &mut models.critic_observation_model,
                        "critic_observation_model",
                    )?,
                    history_model: required(
                        &mut models.critic_history_model,
                        "critic_history_model",
                    )?,
                },
                critic_state_model: required(&mut models.critic_state_model, "critic_state_model")?,
                vhs_model: required(&mut models.vhs_model, "vhs_model")?,
            },
            A2cVariant::AsymA2cState => Critic::State {
                critic_state_model: required(&mut models.critic_state_model, "critic_state_model")?,
                vs_model: required(&mut models.vs_model, "vs_model")?,
            },
        };

        Ok(Self {
            variant,
            device: device.clone(),
            encoder,
            policy_model,
            critic,
        })
    }

    /// Returns the critic variant.
    pub fn variant(&self) -> A2cVariant {
        self.variant
    }

    /// Returns the per-step inputs of the agent's history model, of shape
    /// `(T, action_dim + observation_dim)`.
    pub fn history_inputs(&self, episode: &Episode<S, O>) -> Result<Tensor> {
        self.encoder.inputs(episode)
    }

    fn values(&self, episode: &Episode<S, O>, history_features: &Tensor) -> Result<Tensor> {
        let values = match &self.critic {
            Critic::History { vh_model } => vh_model.forward(history_features)?,
            Critic::HistoryState {
                encoder,
                critic_state_model,
                vhs_model,
            } => {
                let critic_history_features = encoder.features(episode)?;
                let state_features = critic_state_model.forward(episode.states())?;
                let inputs = Tensor::cat(&[&critic_history_features, &state_features], D::Minus1)?;
                vhs_model.forward(&inputs)?
            }
            Critic::State {
                critic_state_model,
                vs_model,
            } => vs_model.forward(&critic_state_model.forward(episode.states())?)?,
        };
        Ok(values.squeeze(D::Minus1)?)
    }

    /// Returns action logits of shape `(T, n_actions)` and values of shape `(T,)`.
    pub fn forward(&self, episode: &Episode<S, O>) -> Result<(Tensor, Tensor)> {
        let history_features = self.encoder.features(episode)?;
        let action_logits = self.policy_model.forward(&history_features)?;
        let values = self.values(episode, &history_features)?;
        Ok((action_logits, values))
    }

    /// Computes the losses of `episode`.
    ///
    /// `target_fn` defaults to [`Td0`]. Targets and advantages are computed
    /// from detached values, so the critic is trained only through its
    /// prediction and the actor only through the action log-likelihood.
    pub fn losses(
        &self,
        episode: &Episode<S, O>,
        discount: f64,
        target_fn: Option<&dyn TargetFunction>,
    ) -> Result<A2cLosses> {
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(RlpoError::InvalidInput(format!(
                "discount must be in (0, 1], got {}",
                discount
            ))
            .into());
        }
        let target_fn = target_fn.unwrap_or(&Td0);
        let len = episode.len();

        let (action_logits, values) = self.forward(episode)?;
        let action_logprobs = log_softmax(&action_logits, D::Minus1)?;

        let rewards = Tensor::from_slice(episode.rewards(), (len,), &self.device)?;
        let targets = target_fn.targets(&rewards, &values.detach(), discount)?;
        let discounts = discounts(discount, len, &self.device)?;

        let actions = episode
            .actions()
            .iter()
            .map(|&a| a as u32)
            .collect::<Vec<_>>();
        let actions = Tensor::from_vec(actions, (len, 1), &self.device)?;
        let action_nlls = action_logprobs
            .gather(&actions, D::Minus1)?
            .squeeze(D::Minus1)?
            .neg()?;

        let advantages = (&targets - &values.detach())?;
        let actor = (discounts * advantages)?.mul(&action_nlls)?.sum_all()?;
        let critic = (&values - &targets)?.sqr()?.sum_all()?;
        let negentropy = (action_logprobs.exp()? * &action_logprobs)?.sum_all()?;

        Ok(A2cLosses {
            actor,
            critic,
            negentropy,
        })
    }
}
