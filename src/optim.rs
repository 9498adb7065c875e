//! Parameter update rules.
//!
//! Optimizer state (the momentum velocity) lives outside the parameters. The training
//! loop owns it for the whole run and reuses it across iterations and batches.

use crate::mlp::LayerCache;
use crate::{HyperParameters, Parameters, Result};

#[derive(Debug, Clone)]
pub(crate) enum Optimizer {
    /// `W -= lr * dW`, `b -= lr * db`.
    GradientDescent,
    /// `v = beta*v + (1-beta)*dW`, then `W -= lr * v` (same for biases).
    Momentum { beta: f32, velocity: Parameters },
}

impl Optimizer {
    /// Plain gradient descent, or momentum with a zeroed velocity store when enabled.
    pub fn for_run(hp: &HyperParameters, params: &Parameters) -> Self {
        if hp.momentum_enabled() {
            Optimizer::Momentum {
                beta: hp.momentum(),
                velocity: params.zeros_like(),
            }
        } else {
            Optimizer::GradientDescent
        }
    }

    /// Apply one update to every layer using the gradients held in `caches`.
    pub fn step(
        &mut self,
        params: &mut Parameters,
        caches: &[LayerCache],
        learning_rate: f32,
    ) -> Result<()> {
        debug_assert_eq!(caches.len(), params.num_layers());
        let descend = |p: f32, g: f32| p - learning_rate * g;

        match self {
            Optimizer::GradientDescent => {
                for (idx, cache) in caches.iter().enumerate() {
                    params.weights_mut(idx).combine_assign(cache.dw.view(), descend)?;
                    params.biases_mut(idx).combine_assign(cache.db.view(), descend)?;
                }
            }
            Optimizer::Momentum { beta, velocity } => {
                let beta = *beta;
                let average = |v: f32, g: f32| beta * v + (1.0 - beta) * g;

                for (idx, cache) in caches.iter().enumerate() {
                    velocity.weights_mut(idx).combine_assign(cache.dw.view(), average)?;
                    velocity.biases_mut(idx).combine_assign(cache.db.view(), average)?;

                    params
                        .weights_mut(idx)
                        .combine_assign(velocity.weights(idx).view(), descend)?;
                    params
                        .biases_mut(idx)
                        .combine_assign(velocity.biases(idx).view(), descend)?;
                }
            }
        }
        Ok(())
    }
}
