//! Assembly of the models used by the agent and the critic.
//!
//! Every model is built under the [`VarBuilder`] prefix equal to its key, so
//! that the variables of a subset of models can be selected with [`model_vars`].
mod config;
mod spec;
use crate::{
    mlp::{Mlp, MlpConfig},
    model::SubModel,
    representation::{
        EmbeddingRepresentation, GruHistoryRepresentation, HistoryRepresentation,
        IdentityRepresentation, NormalizationRepresentation, OneHotRepresentation,
        Representation, ResizeRepresentation,
    },
};
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use candle_core::Var;
use candle_nn::{VarBuilder, VarMap};
pub use config::ModelsConfig;
use log::info;
pub use spec::{EnvKind, EnvSpec, Space};

/// Keys of all models assembled by [`make_models`].
pub const MODEL_KEYS: [&str; 12] = [
    "state_model",
    "action_model",
    "observation_model",
    "history_model",
    "critic_state_model",
    "critic_action_model",
    "critic_observation_model",
    "critic_history_model",
    "policy_model",
    "vh_model",
    "vhs_model",
    "vs_model",
];

fn check_key(key: &str) -> Result<()> {
    match MODEL_KEYS.contains(&key) {
        true => Ok(()),
        false => Err(RlpoError::ModelKey(format!("unknown model key {}", key)).into()),
    }
}

/// Inputs (states or observations) that can be represented for a given [`Space`].
pub trait SpaceInput: Sized + 'static {
    /// Dimension of the features produced by [`SpaceInput::representation`].
    fn dim(space: &Space, config: &ModelsConfig) -> Result<usize>;

    /// Builds the representation of inputs of `space`.
    fn representation(
        space: &Space,
        config: &ModelsConfig,
        vb: VarBuilder,
    ) -> Result<Box<dyn Representation<Self>>>;
}

impl SpaceInput for Vec<f32> {
    fn dim(space: &Space, _config: &ModelsConfig) -> Result<usize> {
        match space {
            Space::Box(dim) => Ok(*dim),
            Space::Discrete(_) => Err(RlpoError::InvalidSpace(format!(
                "{:?} cannot be represented with real-valued vectors",
                space
            ))
            .into()),
        }
    }

    fn representation(
        space: &Space,
        config: &ModelsConfig,
        vb: VarBuilder,
    ) -> Result<Box<dyn Representation<Self>>> {
        let dim = Self::dim(space, config)?;
        Ok(Box::new(IdentityRepresentation::new(dim, vb.device())))
    }
}

impl SpaceInput for usize {
    fn dim(space: &Space, config: &ModelsConfig) -> Result<usize> {
        Ok(config.embedding_dim.unwrap_or(space.n()?))
    }

    fn representation(
        space: &Space,
        config: &ModelsConfig,
        vb: VarBuilder,
    ) -> Result<Box<dyn Representation<Self>>> {
        let n = space.n()?;
        match config.embedding_dim {
            Some(dim) => Ok(Box::new(EmbeddingRepresentation::build(vb, n, dim)?)),
            None => Ok(Box::new(OneHotRepresentation::new(n, vb.device()))),
        }
    }
}

/// Models assembled for an environment.
///
/// A model is `None` when it was not requested from [`make_models`] or has
/// been taken out by its consumer.
pub struct Models<S, O> {
    /// Agent's state model.
    pub state_model: Option<Box<dyn Representation<S>>>,
    /// Agent's action model.
    pub action_model: Option<Box<dyn Representation<usize>>>,
    /// Agent's observation model.
    pub observation_model: Option<Box<dyn Representation<O>>>,
    /// Agent's history model.
    pub history_model: Option<Box<dyn HistoryRepresentation>>,
    /// Critic's state model.
    pub critic_state_model: Option<Box<dyn Representation<S>>>,
    /// Critic's action model.
    pub critic_action_model: Option<Box<dyn Representation<usize>>>,
    /// Critic's observation model.
    pub critic_observation_model: Option<Box<dyn Representation<O>>>,
    /// Critic's history model.
    pub critic_history_model: Option<Box<dyn HistoryRepresentation>>,
    /// Policy head on agent's history features; outputs action logits.
    pub policy_model: Option<Mlp>,
    /// Value head on history features.
    pub vh_model: Option<Mlp>,
    /// Value head on critic's history and state features.
    pub vhs_model: Option<Mlp>,
    /// Value head on critic's state features.
    pub vs_model: Option<Mlp>,
}

/// Takes a model out of its slot, failing if it is absent.
pub fn required<T>(slot: &mut Option<T>, key: &str) -> Result<T> {
    slot.take()
        .ok_or_else(|| RlpoError::ModelKey(format!("models do not contain {}", key)).into())
}

fn feature_model<S: 'static>(
    model: Box<dyn Representation<S>>,
    config: &ModelsConfig,
    vb: VarBuilder,
) -> Result<Box<dyn Representation<S>>> {
    let mut model = model;
    if let Some(dim) = config.hs_features_dim {
        let in_dim = model.dim();
        model = Box::new(ResizeRepresentation::build(vb, model, in_dim, dim)?);
    }
    if config.normalize_hs_features {
        model = Box::new(NormalizationRepresentation::new(model));
    }
    Ok(model)
}

fn build_history_model(
    in_dim: usize,
    config: &ModelsConfig,
    vb: VarBuilder,
) -> Result<Box<dyn HistoryRepresentation>> {
    let mut model: Box<dyn HistoryRepresentation> = Box::new(GruHistoryRepresentation::build(
        vb.clone(),
        in_dim,
        config.history_hidden_size,
    )?);
    if let Some(dim) = config.hs_features_dim {
        let in_dim = model.dim();
        model = Box::new(ResizeRepresentation::build(vb, model, in_dim, dim)?);
    }
    if config.normalize_hs_features {
        model = Box::new(NormalizationRepresentation::new(model));
    }
    Ok(model)
}

fn head(vb: VarBuilder, config: &ModelsConfig, in_dim: usize, out_dim: usize) -> Result<Mlp> {
    Mlp::build(
        vb,
        MlpConfig::new(in_dim, config.head_units.clone(), out_dim, false),
    )
}

/// Runs `build` only if `wanted`.
fn build_if<T>(wanted: bool, build: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
    match wanted {
        true => Ok(Some(build()?)),
        false => Ok(None),
    }
}

/// Assembles the models for `spec`.
///
/// If `keys` is given, only the listed models are built, so that the
/// [`VarMap`] behind `vb` holds no parameters of other models; an unknown key
/// is an error. Unsupported environments fail with [`RlpoError::NotImplemented`].
pub fn make_models<S: SpaceInput, O: SpaceInput>(
    spec: &EnvSpec,
    config: &ModelsConfig,
    keys: Option<&[&str]>,
    vb: VarBuilder,
) -> Result<Models<S, O>> {
    spec.check_supported()?;
    if let Some(keys) = keys {
        for key in keys {
            check_key(key)?;
        }
    }
    let wanted = |key: &str| keys.map_or(true, |keys| keys.contains(&key));

    let n_actions = spec.action_space.n()?;
    let device = vb.device().clone();
    let state_dim = config
        .hs_features_dim
        .unwrap_or(S::dim(&spec.state_space, config)?);
    let observation_dim = O::dim(&spec.observation_space, config)?;
    let history_dim = config
        .hs_features_dim
        .unwrap_or(config.history_hidden_size);
    let history_in_dim = n_actions + observation_dim;

    let state_model = |key: &str| {
        build_if(wanted(key), || {
            let model = S::representation(&spec.state_space, config, vb.pp(key))?;
            feature_model(model, config, vb.pp(key))
        })
    };
    let action_model = |key: &str| {
        build_if(wanted(key), || {
            let model: Box<dyn Representation<usize>> =
                Box::new(OneHotRepresentation::new(n_actions, &device));
            Ok(model)
        })
    };
    let observation_model = |key: &str| {
        build_if(wanted(key), || {
            O::representation(&spec.observation_space, config, vb.pp(key))
        })
    };
    let history_model = |key: &str| {
        build_if(wanted(key), || {
            build_history_model(history_in_dim, config, vb.pp(key))
        })
    };
    let head_model = |key: &str, in_dim: usize, out_dim: usize| {
        build_if(wanted(key), || head(vb.pp(key), config, in_dim, out_dim))
    };

    let models = Models {
        state_model: state_model("state_model")?,
        action_model: action_model("action_model")?,
        observation_model: observation_model("observation_model")?,
        history_model: history_model("history_model")?,
        critic_state_model: state_model("critic_state_model")?,
        critic_action_model: action_model("critic_action_model")?,
        critic_observation_model: observation_model("critic_observation_model")?,
        critic_history_model: history_model("critic_history_model")?,
        policy_model: head_model("policy_model", history_dim, n_actions)?,
        vh_model: head_model("vh_model", history_dim, 1)?,
        vhs_model: head_model("vhs_model", history_dim + state_dim, 1)?,
        vs_model: head_model("vs_model", state_dim, 1)?,
    };

    info!(
        "Assembled models for {} (history dim {}, {} actions)",
        spec.id, history_dim, n_actions
    );
    Ok(models)
}

/// Returns the variables of the models with the given keys, sorted by name.
pub fn model_vars(varmap: &VarMap, keys: &[&str]) -> Result<Vec<Var>> {
    for key in keys {
        check_key(key)?;
    }
    let prefixes = keys.iter().map(|k| format!("{}.", k)).collect::<Vec<_>>();
    let data = varmap
        .data()
        .lock()
        .map_err(|_| anyhow::anyhow!("VarMap lock is poisoned"))?;

    let mut vars = data
        .iter()
        .filter(|(name, _)| prefixes.iter().any(|p| name.starts_with(p.as_str())))
        .map(|(name, var)| (name.clone(), var.clone()))
        .collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(vars.into_iter().map(|(_, var)| var).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::a2c::A2cVariant;
    use candle_core::{DType, Device};

    fn cartpole() -> EnvSpec {
        EnvSpec {
            id: "CartPole-v1".to_string(),
            kind: EnvKind::Gym,
            state_space: Space::Box(4),
            observation_space: Space::Box(2),
            action_space: Space::Discrete(2),
        }
    }

    fn small_config() -> ModelsConfig {
        ModelsConfig::default()
            .history_hidden_size(8)
            .head_units(vec![16])
    }

    #[test]
    fn test_make_models() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let models =
            make_models::<Vec<f32>, Vec<f32>>(&cartpole(), &small_config(), None, vb)?;

        assert_eq!(models.action_model.as_ref().unwrap().dim(), 2);
        assert_eq!(models.observation_model.as_ref().unwrap().dim(), 2);
        assert_eq!(models.history_model.as_ref().unwrap().dim(), 8);
        assert_eq!(models.policy_model.as_ref().unwrap().config().out_dim(), 2);
        assert_eq!(models.vhs_model.as_ref().unwrap().config().in_dim(), 8 + 4);
        Ok(())
    }

    #[test]
    fn test_resized_and_normalized() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = small_config()
            .hs_features_dim(Some(6))
            .normalize_hs_features(true);
        let models = make_models::<Vec<f32>, Vec<f32>>(&cartpole(), &config, None, vb)?;

        assert_eq!(models.history_model.as_ref().unwrap().dim(), 6);
        assert_eq!(models.critic_state_model.as_ref().unwrap().dim(), 6);
        assert_eq!(models.vs_model.as_ref().unwrap().config().in_dim(), 6);
        Ok(())
    }

    #[test]
    fn test_keys() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let keys = ["action_model", "policy_model"];
        let mut models =
            make_models::<Vec<f32>, Vec<f32>>(&cartpole(), &small_config(), Some(&keys[..]), vb)?;
        assert!(models.policy_model.is_some());
        assert!(models.vh_model.is_none());
        assert!(required(&mut models.vh_model, "vh_model").is_err());

        let vars = model_vars(&varmap, &["policy_model"])?;
        // two linear layers with weight and bias
        assert_eq!(vars.len(), 4);
        Ok(())
    }

    #[test]
    fn test_unrequested_models_have_no_vars() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = small_config().hs_features_dim(Some(6));
        let keys = A2cVariant::A2c.model_keys();
        let models = make_models::<Vec<f32>, Vec<f32>>(&cartpole(), &config, Some(keys), vb)?;
        assert!(models.critic_history_model.is_none());
        assert!(models.vhs_model.is_none());

        let names = varmap.data().lock().unwrap().keys().cloned().collect::<Vec<_>>();
        assert!(!names.is_empty());
        for name in names.iter() {
            assert!(
                keys.iter().any(|k| name.starts_with(&format!("{}.", k))),
                "unexpected variable {}",
                name
            );
            assert!(!name.starts_with("critic_"), "unexpected variable {}", name);
        }

        // the same heads built alone have the same shapes as in a full build
        let full = VarMap::new();
        let vb = VarBuilder::from_varmap(&full, DType::F32, &Device::Cpu);
        make_models::<Vec<f32>, Vec<f32>>(&cartpole(), &config, None, vb)?;
        let shapes = |varmap: &VarMap, keys: &[&str]| -> Result<Vec<Vec<usize>>> {
            Ok(model_vars(varmap, keys)?
                .iter()
                .map(|v| v.as_tensor().dims().to_vec())
                .collect())
        };
        assert_eq!(shapes(&varmap, keys)?, shapes(&full, keys)?);
        assert!(!model_vars(&full, &["vhs_model"])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_key() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let result = make_models::<Vec<f32>, Vec<f32>>(
            &cartpole(),
            &small_config(),
            Some(&["q_model"][..]),
            vb,
        );
        let err = result.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<RlpoError>(),
            Some(RlpoError::ModelKey(_))
        ));
        assert!(model_vars(&varmap, &["q_model"]).is_err());
    }

    #[test]
    fn test_space_mismatch() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let result = make_models::<usize, Vec<f32>>(&cartpole(), &small_config(), None, vb);
        let err = result.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<RlpoError>(),
            Some(RlpoError::InvalidSpace(_))
        ));
    }

    #[test]
    fn test_flat_pomdp() -> Result<()> {
        let spec = EnvSpec {
            id: "tiger".to_string(),
            kind: EnvKind::Pomdp,
            state_space: Space::Discrete(2),
            observation_space: Space::Discrete(3),
            action_space: Space::Discrete(3),
        };
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = small_config().embedding_dim(Some(5));
        let models = make_models::<usize, usize>(&spec, &config, None, vb)?;
        assert_eq!(models.observation_model.as_ref().unwrap().dim(), 5);
        assert_eq!(models.state_model.as_ref().unwrap().dim(), 5);
        Ok(())
    }
}
