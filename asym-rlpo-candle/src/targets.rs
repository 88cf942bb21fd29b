//! Bootstrapped value targets.
//!
//! A [`TargetFunction`] maps the rewards and the (detached) value estimates of
//! one episode to per-step targets. The last step of an episode has no
//! successor and never bootstraps.
use anyhow::Result;
use asym_rlpo_core::error::RlpoError;
use candle_core::{DType, Tensor};
use serde::{Deserialize, Serialize};

/// Computes per-step value targets of one episode.
pub trait TargetFunction: Send + Sync {
    /// `rewards` and `values` are 1-dimensional tensors of the same length `T`.
    /// Returns targets of length `T`.
    fn targets(&self, rewards: &Tensor, values: &Tensor, discount: f64) -> Result<Tensor>;
}

/// One-step temporal-difference target, `r[t] + discount * v[t+1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Td0;

impl TargetFunction for Td0 {
    fn targets(&self, rewards: &Tensor, values: &Tensor, discount: f64) -> Result<Tensor> {
        let len = check_lengths(rewards, values)?;
        let zero = Tensor::zeros((1,), values.dtype(), values.device())?;
        let next_values = match len {
            1 => zero,
            _ => Tensor::cat(&[&values.narrow(0, 1, len - 1)?, &zero], 0)?,
        };
        Ok((rewards + (next_values * discount)?)?)
    }
}

/// Discounted Monte-Carlo return.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mc;

impl TargetFunction for Mc {
    fn targets(&self, rewards: &Tensor, values: &Tensor, discount: f64) -> Result<Tensor> {
        TdLambda { lambda: 1.0 }.targets(rewards, values, discount)
    }
}

/// `n`-step temporal-difference target.
///
/// Bootstraps with `v[t+n]` when `t + n < T`, otherwise returns the
/// Monte-Carlo return of the remaining steps.
#[derive(Debug, Clone, Copy)]
pub struct TdN {
    /// Number of reward steps before bootstrapping.
    pub n: usize,
}

impl TargetFunction for TdN {
    fn targets(&self, rewards: &Tensor, values: &Tensor, discount: f64) -> Result<Tensor> {
        if self.n == 0 {
            return Err(RlpoError::InvalidInput("n-step target requires n >= 1".into()).into());
        }
        let len = check_lengths(rewards, values)?;
        let r = to_vec_f64(rewards)?;
        let v = to_vec_f64(values)?;

        let targets = (0..len)
            .map(|t| {
                let end = (t + self.n).min(len);
                let ret = (t..end)
                    .rev()
                    .fold(0.0, |acc, k| r[k] + discount * acc);
                match t + self.n < len {
                    true => ret + discount.powi(self.n as i32) * v[t + self.n],
                    false => ret,
                }
            })
            .collect::<Vec<_>>();
        from_vec_f64(targets, values)
    }
}

/// λ-return, `r[t] + discount * ((1 - λ) v[t+1] + λ G[t+1])`.
///
/// `lambda = 0` gives [`Td0`] and `lambda = 1` gives [`Mc`].
#[derive(Debug, Clone, Copy)]
pub struct TdLambda {
    /// Trace decay.
    pub lambda: f64,
}

impl TargetFunction for TdLambda {
    fn targets(&self, rewards: &Tensor, values: &Tensor, discount: f64) -> Result<Tensor> {
        let len = check_lengths(rewards, values)?;
        let r = to_vec_f64(rewards)?;
        let v = to_vec_f64(values)?;

        let mut targets = vec![0f64; len];
        targets[len - 1] = r[len - 1];
        for t in (0..len - 1).rev() {
            let next = (1.0 - self.lambda) * v[t + 1] + self.lambda * targets[t + 1];
            targets[t] = r[t] + discount * next;
        }
        from_vec_f64(targets, values)
    }
}

/// Serializable choice of [`TargetFunction`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum TargetConfig {
    /// [`Td0`].
    Td0,

    /// [`Mc`].
    Mc,

    /// [`TdN`].
    TdN {
        /// Number of reward steps.
        n: usize,
    },

    /// [`TdLambda`].
    TdLambda {
        /// Trace decay.
        lambda: f64,
    },
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::Td0
    }
}

impl TargetConfig {
    /// Constructs the target function.
    pub fn build(&self) -> Box<dyn TargetFunction> {
        match self {
            Self::Td0 => Box::new(Td0),
            Self::Mc => Box::new(Mc),
            Self::TdN { n } => Box::new(TdN { n: *n }),
            Self::TdLambda { lambda } => Box::new(TdLambda { lambda: *lambda }),
        }
    }
}

fn check_lengths(rewards: &Tensor, values: &Tensor) -> Result<usize> {
    let len = rewards.dims1()?;
    if values.dims1()? != len {
        return Err(RlpoError::InvalidInput(format!(
            "{} rewards but {} values",
            len,
            values.dims1()?
        ))
        .into());
    }
    if len == 0 {
        return Err(RlpoError::EmptyEpisode.into());
    }
    Ok(len)
}

fn to_vec_f64(t: &Tensor) -> Result<Vec<f64>> {
    Ok(t.to_dtype(DType::F64)?.to_vec1::<f64>()?)
}

fn from_vec_f64(v: Vec<f64>, like: &Tensor) -> Result<Tensor> {
    let len = v.len();
    Ok(Tensor::from_vec(v, (len,), like.device())?.to_dtype(like.dtype())?)
}
