//! Advantage actor-critic for POMDPs.
//!
//! [`A2c`] computes the actor, critic and negentropy losses of one episode.
//! [`A2cAgent`] owns the parameters and applies optimizer steps to a weighted
//! sum of these losses over episodes sampled from an
//! [`EpisodeBuffer`](asym_rlpo_core::EpisodeBuffer).
mod agent;
mod base;
mod config;
pub use agent::A2cAgent;
pub use base::{discounts, shift_forward, A2c, A2cLosses};
pub use config::{A2cConfig, A2cVariant};
