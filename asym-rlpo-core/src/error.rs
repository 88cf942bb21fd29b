//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum RlpoError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// An episode without any interaction step.
    #[error("Episode must contain at least one step")]
    EmptyEpisode,

    /// The sequences of an episode do not share the same length.
    #[error(
        "Episode sequences have different lengths: states={states}, observations={observations}, \
         actions={actions}, rewards={rewards}"
    )]
    EpisodeLength {
        /// Number of states.
        states: usize,
        /// Number of observations.
        observations: usize,
        /// Number of actions.
        actions: usize,
        /// Number of rewards.
        rewards: usize,
    },

    /// A model key is unknown or the model was not assembled.
    #[error("Model key error: {0}")]
    ModelKey(String),

    /// Environment or model family without an implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A space cannot be represented by the requested input type.
    #[error("Invalid space: {0}")]
    InvalidSpace(String),

    /// Input data inconsistent with the model it is fed to.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
