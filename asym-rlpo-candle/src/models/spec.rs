//! Description of the environment the models are assembled for.
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use serde::{Deserialize, Serialize};

/// A space of states, observations or actions.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum Space {
    /// Discrete values in `0..n`.
    Discrete(usize),

    /// Real-valued vectors of the given dimension.
    Box(usize),
}

impl Space {
    /// Returns the number of elements of a discrete space.
    pub fn n(&self) -> Result<usize> {
        match self {
            Self::Discrete(n) => Ok(*n),
            Self::Box(_) => Err(RlpoError::InvalidSpace(format!(
                "expected a discrete space, got {:?}",
                self
            ))
            .into()),
        }
    }
}

/// Kind of environment wrapper producing the episodes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum EnvKind {
    /// Classic control environments of gym.
    Gym,

    /// Gridverse environments.
    Gridverse,

    /// Flat POMDPs with discrete states and observations.
    Pomdp,
}

/// Environment description consumed by [`make_models`](super::make_models).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EnvSpec {
    /// Identifier, e.g. `CartPole-v1`.
    pub id: String,

    /// Kind of environment.
    pub kind: EnvKind,

    /// Space of privileged states.
    pub state_space: Space,

    /// Space of observations.
    pub observation_space: Space,

    /// Space of actions, which must be discrete.
    pub action_space: Space,
}

const GYM_ENVS: [&str; 3] = ["CartPole", "Acrobot", "LunarLander"];

/// Returns `true` if `id` is `{name}-v{digits}`.
fn is_versioned(id: &str, name: &str) -> bool {
    id.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix("-v"))
        .map_or(false, |v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
}

impl EnvSpec {
    /// Fails unless models can be assembled for this environment.
    pub fn check_supported(&self) -> Result<()> {
        match self.kind {
            EnvKind::Gym if GYM_ENVS.iter().any(|name| is_versioned(&self.id, name)) => Ok(()),
            EnvKind::Pomdp => Ok(()),
            EnvKind::Gym | EnvKind::Gridverse => Err(RlpoError::NotImplemented(format!(
                "models for {:?} environment {}",
                self.kind, self.id
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn spec(id: &str, kind: EnvKind) -> EnvSpec {
        EnvSpec {
            id: id.to_string(),
            kind,
            state_space: Space::Box(4),
            observation_space: Space::Box(2),
            action_space: Space::Discrete(2),
        }
    }

    #[test]
    fn test_supported_envs() {
        assert!(spec("CartPole-v1", EnvKind::Gym).check_supported().is_ok());
        assert!(spec("LunarLander-v2", EnvKind::Gym).check_supported().is_ok());
        assert!(spec("tiger", EnvKind::Pomdp).check_supported().is_ok());

        for (id, kind) in [
            ("CartPole-v", EnvKind::Gym),
            ("CartPole-vx", EnvKind::Gym),
            ("MountainCar-v0", EnvKind::Gym),
            ("GV-Empty-5x5-v0", EnvKind::Gridverse),
        ] {
            let err = spec(id, kind).check_supported().unwrap_err();
            assert!(matches!(
                err.downcast_ref::<RlpoError>(),
                Some(RlpoError::NotImplemented(_))
            ));
        }
    }
}
