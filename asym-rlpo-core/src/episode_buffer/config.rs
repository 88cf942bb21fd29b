//! Configuration of [`EpisodeBuffer`](super::EpisodeBuffer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpisodeBuffer`](super::EpisodeBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpisodeBufferConfig {
    /// Maximum number of interaction steps summed over all held episodes.
    pub max_timesteps: usize,

    /// Seed of the random number generator used for sampling episodes.
    pub seed: u64,
}

impl Default for EpisodeBufferConfig {
    fn default() -> Self {
        Self {
            max_timesteps: 1_000_000,
            seed: 42,
        }
    }
}

impl EpisodeBufferConfig {
    /// Sets the capacity in interaction steps.
    pub fn max_timesteps(mut self, max_timesteps: usize) -> Self {
        self.max_timesteps = max_timesteps;
        self
    }

    /// Sets the seed of the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Constructs [`EpisodeBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EpisodeBufferConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
