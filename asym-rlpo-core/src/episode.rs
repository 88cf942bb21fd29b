//! Episode.
use crate::error::RlpoError;

/// One complete trajectory sampled from an environment.
///
/// The `t`-th entries describe the interaction at time `t`: the state and the
/// observation the agent was in, the (discrete) action it took and the reward
/// it received. All four sequences have the same, non-zero length.
///
/// `S` is the type of a state and `O` the type of an observation, e.g.
/// `Vec<f32>` for box spaces or `usize` for discrete spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode<S, O> {
    states: Vec<S>,
    observations: Vec<O>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
}

impl<S, O> Episode<S, O> {
    /// Constructs an episode.
    ///
    /// Fails if the sequences have different lengths or are empty.
    pub fn new(
        states: Vec<S>,
        observations: Vec<O>,
        actions: Vec<usize>,
        rewards: Vec<f32>,
    ) -> Result<Self, RlpoError> {
        let len = rewards.len();
        if states.len() != len || observations.len() != len || actions.len() != len {
            return Err(RlpoError::EpisodeLength {
                states: states.len(),
                observations: observations.len(),
                actions: actions.len(),
                rewards: rewards.len(),
            });
        }
        if len == 0 {
            return Err(RlpoError::EmptyEpisode);
        }

        Ok(Self {
            states,
            observations,
            actions,
            rewards,
        })
    }

    /// Returns the number of interaction steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Always `false`; an episode holds at least one step.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// States.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Observations.
    pub fn observations(&self) -> &[O] {
        &self.observations
    }

    /// Actions.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Rewards.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Returns the undiscounted sum of rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_episode_len() -> anyhow::Result<()> {
        let episode = Episode::new(
            vec![0usize, 1, 2],
            vec![0usize, 0, 1],
            vec![1, 0, 1],
            vec![0.0, 1.0, 0.5],
        )?;
        assert_eq!(episode.len(), 3);
        assert_eq!(episode.actions(), &[1, 0, 1]);
        assert_eq!(episode.total_reward(), 1.5);
        Ok(())
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = Episode::new(vec![0usize, 1], vec![0usize, 1], vec![0], vec![0.0, 0.0]);
        assert_eq!(
            err,
            Err(RlpoError::EpisodeLength {
                states: 2,
                observations: 2,
                actions: 1,
                rewards: 2
            })
        );
    }

    #[test]
    fn test_empty_episode() {
        let err = Episode::<usize, usize>::new(vec![], vec![], vec![], vec![]);
        assert_eq!(err, Err(RlpoError::EmptyEpisode));
    }
}
