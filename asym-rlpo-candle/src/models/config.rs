//! Configuration of [`make_models`](super::make_models).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of the assembled models.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ModelsConfig {
    /// Hidden size of the recurrent history models.
    pub history_hidden_size: usize,

    /// If set, history and state features are resized to this dimension.
    pub hs_features_dim: Option<usize>,

    /// If `true`, history and state features are L2-normalized.
    pub normalize_hs_features: bool,

    /// Hidden units of the policy and value heads.
    pub head_units: Vec<usize>,

    /// If set, discrete states and observations are embedded with this
    /// dimension instead of being one-hot encoded.
    pub embedding_dim: Option<usize>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            history_hidden_size: 128,
            hs_features_dim: None,
            normalize_hs_features: false,
            head_units: vec![512, 256],
            embedding_dim: None,
        }
    }
}

impl ModelsConfig {
    /// Sets the hidden size of the history models.
    pub fn history_hidden_size(mut self, v: usize) -> Self {
        self.history_hidden_size = v;
        self
    }

    /// Sets the dimension of resized history and state features.
    pub fn hs_features_dim(mut self, v: Option<usize>) -> Self {
        self.hs_features_dim = v;
        self
    }

    /// Enables or disables normalization of history and state features.
    pub fn normalize_hs_features(mut self, v: bool) -> Self {
        self.normalize_hs_features = v;
        self
    }

    /// Sets the hidden units of the heads.
    pub fn head_units(mut self, v: Vec<usize>) -> Self {
        self.head_units = v;
        self
    }

    /// Sets the embedding dimension of discrete inputs.
    pub fn embedding_dim(mut self, v: Option<usize>) -> Self {
        self.embedding_dim = v;
        self
    }

    /// Constructs [`ModelsConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ModelsConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
