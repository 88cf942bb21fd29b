#![warn(missing_docs)]
//! Backend-independent building blocks of asymmetric reinforcement learning
//! in partially observable environments.
//!
//! * [`Episode`] - one complete trajectory of states, observations, actions and rewards.
//! * [`EpisodeBuffer`] - a bounded store of whole episodes with oldest-first eviction.
//! * [`record`] - key-value records used to report training losses.
pub mod error;
pub mod record;

mod episode;
pub use episode::Episode;

mod episode_buffer;
pub use episode_buffer::{EpisodeBuffer, EpisodeBufferConfig};
