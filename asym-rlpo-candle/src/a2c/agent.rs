//! Agent owning the parameters and the optimizer.
use super::{A2c, A2cConfig};
use crate::{
    models::{make_models, model_vars, EnvSpec, SpaceInput},
    opt::Optimizer,
    targets::TargetFunction,
};
use anyhow::Result;
use asym_rlpo_core::{record::Record, EpisodeBuffer};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::{debug, info};
use std::{fs, path::Path};

/// Advantage actor-critic agent trained on whole episodes.
pub struct A2cAgent<S, O> {
    config: A2cConfig,
    device: Device,
    varmap: VarMap,
    a2c: A2c<S, O>,
    target_fn: Box<dyn TargetFunction>,
    opt: Optimizer,
    n_opts: usize,
}

impl<S: SpaceInput, O: SpaceInput> A2cAgent<S, O> {
    /// Builds the models of the configured variant for `spec` together with
    /// an optimizer over their parameters.
    pub fn build(spec: &EnvSpec, config: A2cConfig) -> Result<Self> {
        let device = config.device.build()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let keys = config.variant.model_keys();

        let models = make_models::<S, O>(spec, &config.models, Some(keys), vb)?;
        let a2c = A2c::build(config.variant, models, &device)?;
        let opt = config
            .opt_config
            .build(model_vars(&varmap, keys)?, config.max_grad_norm)?;
        let target_fn = config.target.build();
        info!("Built {:?} agent for {}", config.variant, spec.id);

        Ok(Self {
            config,
            device,
            varmap,
            a2c,
            target_fn,
            opt,
            n_opts: 0,
        })
    }
}

impl<S, O> A2cAgent<S, O> {
    /// Returns the loss engine.
    pub fn a2c(&self) -> &A2c<S, O> {
        &self.a2c
    }

    /// Returns the parameters of all models.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the configuration.
    pub fn config(&self) -> &A2cConfig {
        &self.config
    }

    /// Returns the number of optimization steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Performs one optimization step on episodes sampled from `buffer`.
    ///
    /// Returns `None` without touching the parameters while the buffer holds
    /// fewer than `min_episodes_warmup` episodes. Otherwise returns a record
    /// of the losses averaged over the sampled episodes, together with the
    /// gradient norm before clipping.
    pub fn opt(&mut self, buffer: &EpisodeBuffer<S, O>) -> Result<Option<Record>> {
        if buffer.num_episodes() < self.config.min_episodes_warmup.max(1) {
            return Ok(None);
        }

        let episodes = buffer.sample_episodes(self.config.batch_size.max(1));
        let n = episodes.len() as f64;
        let (mut actor, mut critic, mut negentropy) = (0f32, 0f32, 0f32);
        let mut total: Option<Tensor> = None;

        for episode in episodes {
            let losses = self
                .a2c
                .losses(episode, self.config.discount, Some(&*self.target_fn))?;
            actor += losses.actor.to_scalar::<f32>()?;
            critic += losses.critic.to_scalar::<f32>()?;
            negentropy += losses.negentropy.to_scalar::<f32>()?;

            let loss = ((losses.actor * self.config.actor_weight)?
                + (losses.critic * self.config.critic_weight)?)?;
            let loss = (loss + (losses.negentropy * self.config.negentropy_weight)?)?;
            total = Some(match total {
                None => loss,
                Some(total) => (total + loss)?,
            });
        }

        let loss = match total {
            Some(total) => (total / n)?,
            None => return Ok(None),
        };
        let grad_norm = self.opt.backward_step(&loss)? as f32;
        self.n_opts += 1;

        let n = n as f32;
        let loss = loss.to_scalar::<f32>()?;
        debug!(
            "opt {}: loss {:.4} (actor {:.4}, critic {:.4}, negentropy {:.4}), grad norm {:.4}",
            self.n_opts,
            loss,
            actor / n,
            critic / n,
            negentropy / n,
            grad_norm
        );

        Ok(Some(Record::from_slice(&[
            ("loss_actor", actor / n),
            ("loss_critic", critic / n),
            ("loss_negentropy", negentropy / n),
            ("loss", loss),
            ("grad_norm", grad_norm),
        ])))
    }

    /// Saves the parameters and the configuration in `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.varmap.save(dir.join("a2c.safetensors"))?;
        self.config.save(dir.join("a2c_config.yaml"))?;
        info!("Save A2C agent to {:?}", dir);
        Ok(())
    }

    /// Loads the parameters saved in `dir`.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.varmap.load(dir.join("a2c.safetensors"))?;
        info!("Load A2C agent from {:?}", dir);
        Ok(())
    }

    /// Returns the device of the parameters.
    pub fn device(&self) -> &Device {
        &self.device
    }
}
