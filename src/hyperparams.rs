//! Validated training configuration.
//!
//! [`HyperParameters`] can only be obtained from [`crate::HyperParametersBuilder::build`],
//! so every instance satisfies the binary-classifier contract: at least one layer, no
//! empty layers, and a single sigmoid neuron at the output.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::Activation;

/// One dense layer: its width and activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerSpec {
    pub neurons: usize,
    pub activation: Activation,
}

impl LayerSpec {
    pub fn new(neurons: usize, activation: Activation) -> Self {
        Self {
            neurons,
            activation,
        }
    }

    /// Weight init upper bound given the previous layer's width.
    #[inline]
    pub fn init_scale(&self, fan_in: usize) -> f32 {
        self.activation.init_scale(fan_in)
    }
}

/// Immutable, validated hyperparameters.
///
/// Optional controls use 0 as "disabled": `regularization_factor`,
/// `dropout_keep_probability` (1 is also a no-op), `mini_batch_size` (full batch),
/// `momentum`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HyperParameters {
    pub(crate) layers: Vec<LayerSpec>,
    pub(crate) learning_rate: f32,
    pub(crate) iterations: usize,
    pub(crate) regularization_factor: f32,
    pub(crate) dropout_keep_probability: f32,
    pub(crate) mini_batch_size: usize,
    pub(crate) momentum: f32,
    pub(crate) seed: Option<u64>,
    pub(crate) cost_report_interval: usize,
}

impl HyperParameters {
    /// Layers after the input, in order; the last one is the sigmoid output.
    #[inline]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[inline]
    pub fn regularization_factor(&self) -> f32 {
        self.regularization_factor
    }

    #[inline]
    pub fn dropout_keep_probability(&self) -> f32 {
        self.dropout_keep_probability
    }

    #[inline]
    pub fn mini_batch_size(&self) -> usize {
        self.mini_batch_size
    }

    #[inline]
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn cost_report_interval(&self) -> usize {
        self.cost_report_interval
    }

    #[inline]
    pub fn regularization_enabled(&self) -> bool {
        self.regularization_factor > 0.0
    }

    #[inline]
    pub fn dropout_enabled(&self) -> bool {
        self.dropout_keep_probability > 0.0 && self.dropout_keep_probability < 1.0
    }

    #[inline]
    pub fn momentum_enabled(&self) -> bool {
        self.momentum > 0.0
    }

    /// Layer widths including the input layer: `[feature_count, n_1, ..., n_L]`.
    pub fn layer_sizes(&self, feature_count: usize) -> Vec<usize> {
        std::iter::once(feature_count)
            .chain(self.layers.iter().map(|l| l.neurons))
            .collect()
    }

    /// The run-local random source: seeded when a seed was configured.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl fmt::Display for HyperParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hyperparameters:")?;
        writeln!(
            f,
            "number of layers: {}, learning rate: {:.4}, iterations: {}",
            self.layers.len(),
            self.learning_rate,
            self.iterations
        )?;
        if self.regularization_enabled() {
            writeln!(f, "L2 regularization: {}", self.regularization_factor)?;
        }
        if self.dropout_enabled() {
            writeln!(f, "dropout keep probability: {}", self.dropout_keep_probability)?;
        }
        if self.mini_batch_size > 0 {
            writeln!(f, "mini-batch size: {}", self.mini_batch_size)?;
        }
        if self.momentum_enabled() {
            writeln!(f, "momentum: {}", self.momentum)?;
        }
        writeln!(f, "layers:")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "  layer {} - {} neuron(s), {} activation function",
                i + 1,
                layer.neurons,
                layer.activation
            )?;
        }
        Ok(())
    }
}
