//! Optimizer applied to the combined A2C loss.
use anyhow::Result;
use candle_core::{backprop::GradStore, DType, Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use log::trace;
use serde::{Deserialize, Serialize};

/// Configuration of the optimizer.
///
/// Parameters not listed keep the defaults of the underlying implementation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// AdamW with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Weight decay.
        weight_decay: f64,
    },

    /// Adam.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-3 }
    }
}

impl OptimizerConfig {
    /// Constructs the optimizer over `vars`.
    ///
    /// With `max_grad_norm`, every step rescales the gradients so that their
    /// global L2 norm does not exceed it.
    pub fn build(&self, vars: Vec<Var>, max_grad_norm: Option<f64>) -> Result<Optimizer> {
        let inner = match *self {
            Self::AdamW { lr, weight_decay } => {
                let params = ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                };
                Inner::AdamW(AdamW::new(vars.clone(), params)?)
            }
            Self::Adam { lr } => {
                let params = ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                };
                Inner::Adam(Adam::new(vars.clone(), params)?)
            }
        };

        Ok(Optimizer {
            vars,
            inner,
            max_grad_norm,
        })
    }
}

enum Inner {
    AdamW(AdamW),
    Adam(Adam),
}

/// Optimizer over a fixed set of variables.
pub struct Optimizer {
    vars: Vec<Var>,
    inner: Inner,
    max_grad_norm: Option<f64>,
}

impl Optimizer {
    /// Computes the gradients of `loss`, clips them if configured and applies
    /// one update.
    ///
    /// Returns the global gradient norm before clipping.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<f64> {
        let mut grads = loss.backward()?;
        let norm = match self.max_grad_norm {
            Some(max_norm) => clip_grad_norm(&mut grads, &self.vars, max_norm)?,
            None => grad_norm(&grads, &self.vars)?,
        };

        match &mut self.inner {
            Inner::AdamW(opt) => opt.step(&grads)?,
            Inner::Adam(opt) => opt.step(&grads)?,
        }
        Ok(norm)
    }
}

/// Global L2 norm of the gradients of `vars`. Variables without a gradient
/// count as zero.
pub fn grad_norm(grads: &GradStore, vars: &[Var]) -> Result<f64> {
    let mut sum = 0f64;
    for var in vars {
        if let Some(grad) = grads.get(var.as_tensor()) {
            sum += grad
                .sqr()?
                .sum_all()?
                .to_dtype(DType::F64)?
                .to_scalar::<f64>()?;
        }
    }
    Ok(sum.sqrt())
}

/// Rescales the gradients of `vars` in place so that their global norm is at
/// most `max_norm`. Returns the norm before rescaling.
pub fn clip_grad_norm(grads: &mut GradStore, vars: &[Var], max_norm: f64) -> Result<f64> {
    let norm = grad_norm(grads, vars)?;
    if norm > max_norm {
        let scale = max_norm / norm;
        trace!("Clip gradient norm {:.4} to {:.4}", norm, max_norm);
        for var in vars {
            if let Some(grad) = grads.remove(var.as_tensor()) {
                grads.insert(var.as_tensor(), (grad * scale)?);
            }
        }
    }
    Ok(norm)
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    fn setup() -> Result<(Var, Var, Tensor)> {
        let x = Var::new(&[3f32, 0.], &Device::Cpu)?;
        let y = Var::new(&[0f32, 4.], &Device::Cpu)?;
        // gradients: d/dx = [3, 0], d/dy = [0, 4]; global norm 5
        let loss = ((x.as_tensor().sqr()? + y.as_tensor().sqr()?)?.sum_all()? * 0.5)?;
        Ok((x, y, loss))
    }

    #[test]
    fn test_grad_norm() -> Result<()> {
        let (x, y, loss) = setup()?;
        let grads = loss.backward()?;
        let norm = grad_norm(&grads, &[x.clone(), y.clone()])?;
        assert!((norm - 5.0).abs() < 1e-6);
        assert!((grad_norm(&grads, &[y])? - 4.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_clip_grad_norm() -> Result<()> {
        let (x, y, loss) = setup()?;
        let vars = [x.clone(), y.clone()];

        let mut grads = loss.backward()?;
        let norm = clip_grad_norm(&mut grads, &vars, 1.0)?;
        assert!((norm - 5.0).abs() < 1e-6);
        assert!((grad_norm(&grads, &vars)? - 1.0).abs() < 1e-5);
        let gx = grads.get(x.as_tensor()).unwrap().to_vec1::<f32>()?;
        assert!((gx[0] - 0.6).abs() < 1e-6);

        // below the threshold the gradients are untouched
        let mut grads = loss.backward()?;
        clip_grad_norm(&mut grads, &vars, 10.0)?;
        let gy = grads.get(y.as_tensor()).unwrap().to_vec1::<f32>()?;
        assert_eq!(gy, vec![0.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_backward_step() -> Result<()> {
        for config in [
            OptimizerConfig::Adam { lr: 0.1 },
            OptimizerConfig::AdamW {
                lr: 0.1,
                weight_decay: 0.0,
            },
        ] {
            let (x, y, loss) = setup()?;
            let mut opt = config.build(vec![x.clone(), y.clone()], Some(1.0))?;
            let norm = opt.backward_step(&loss)?;
            assert!((norm - 5.0).abs() < 1e-6);

            // both parameters move towards zero
            let x = x.as_tensor().to_vec1::<f32>()?;
            assert!(x[0] < 3.0);
            assert!(y.as_tensor().to_vec1::<f32>()?[1] < 4.0);
        }
        Ok(())
    }
}
