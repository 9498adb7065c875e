//! Hyperparameter builder.
//!
//! `HyperParametersBuilder` is the recommended way to configure a training run.
//! Every setter is a pure `self -> Self` transformation; nothing is checked until
//! [`HyperParametersBuilder::build`], which either returns a fully validated
//! [`HyperParameters`] or a descriptive [`Error::InvalidConfig`].
//!
//! With the `serde` feature the builder can be deserialized from a config file and
//! still goes through the same validation in `build`.

use crate::{Activation, Error, HyperParameters, LayerSpec, Result};

const DEFAULT_LEARNING_RATE: f32 = 0.01;
const DEFAULT_ITERATIONS: usize = 1000;
const DEFAULT_COST_REPORT_INTERVAL: usize = 100;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
/// Builder for [`HyperParameters`].
///
/// Example:
///
/// ```rust
/// use rust_neuralnet::{Activation, HyperParametersBuilder};
///
/// # fn main() -> rust_neuralnet::Result<()> {
/// let hp = HyperParametersBuilder::new()
///     .add_layers(Activation::ReLU, &[5, 4])
///     .add_layer(1, Activation::Sigmoid)
///     .learning_rate(0.05)
///     .iterations(500)
///     .seed(42)
///     .build()?;
/// assert_eq!(hp.num_layers(), 3);
/// # Ok(())
/// # }
/// ```
pub struct HyperParametersBuilder {
    layers: Vec<LayerSpec>,
    learning_rate: f32,
    iterations: usize,
    regularization_factor: f32,
    dropout_keep_probability: f32,
    mini_batch_size: usize,
    momentum: f32,
    seed: Option<u64>,
    cost_report_interval: usize,
}

impl Default for HyperParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperParametersBuilder {
    /// Empty network, learning rate 0.01, 1000 iterations, every optional control off.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            learning_rate: DEFAULT_LEARNING_RATE,
            iterations: DEFAULT_ITERATIONS,
            regularization_factor: 0.0,
            dropout_keep_probability: 0.0,
            mini_batch_size: 0,
            momentum: 0.0,
            seed: None,
            cost_report_interval: DEFAULT_COST_REPORT_INTERVAL,
        }
    }

    /// Append a dense layer with `neurons` outputs.
    #[must_use]
    pub fn add_layer(mut self, neurons: usize, activation: Activation) -> Self {
        self.layers.push(LayerSpec::new(neurons, activation));
        self
    }

    /// Append one layer per entry of `neurons`, all using `activation`.
    #[must_use]
    pub fn add_layers(mut self, activation: Activation, neurons: &[usize]) -> Self {
        self.layers
            .extend(neurons.iter().map(|&n| LayerSpec::new(n, activation)));
        self
    }

    /// Append `count` identical layers.
    #[must_use]
    pub fn add_n_layers(mut self, activation: Activation, neurons: usize, count: usize) -> Self {
        self.layers
            .extend(std::iter::repeat_n(LayerSpec::new(neurons, activation), count));
        self
    }

    #[must_use]
    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// L2 penalty factor (lambda). 0 disables regularization.
    #[must_use]
    pub fn regularization_factor(mut self, factor: f32) -> Self {
        self.regularization_factor = factor;
        self
    }

    /// Probability of keeping a hidden activation during training. 0 disables dropout.
    #[must_use]
    pub fn dropout_keep_probability(mut self, keep_probability: f32) -> Self {
        self.dropout_keep_probability = keep_probability;
        self
    }

    /// Examples per gradient step. 0 trains on the full batch.
    #[must_use]
    pub fn mini_batch_size(mut self, size: usize) -> Self {
        self.mini_batch_size = size;
        self
    }

    /// Momentum coefficient (beta) in `[0, 1)`. 0 is plain gradient descent.
    #[must_use]
    pub fn momentum(mut self, beta: f32) -> Self {
        self.momentum = beta;
        self
    }

    /// Seed for weight initialization and dropout masks.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Log the cost every `interval` iterations. 0 turns periodic reporting off.
    #[must_use]
    pub fn cost_report_interval(mut self, interval: usize) -> Self {
        self.cost_report_interval = interval;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<HyperParameters> {
        if let Some(idx) = self.layers.iter().position(|l| l.neurons == 0) {
            return Err(Error::InvalidConfig(format!(
                "layer {} has 0 neurons",
                idx + 1
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "number of iterations must be > 0".to_owned(),
            ));
        }
        let Some(output) = self.layers.last() else {
            return Err(Error::InvalidConfig("no layers defined".to_owned()));
        };
        if output.activation != Activation::Sigmoid {
            return Err(Error::InvalidConfig(format!(
                "output layer must use the sigmoid activation, got {}",
                output.activation
            )));
        }
        if output.neurons != 1 {
            return Err(Error::InvalidConfig(format!(
                "output layer must have exactly 1 neuron, got {}",
                output.neurons
            )));
        }
        if !(self.regularization_factor.is_finite() && self.regularization_factor >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "regularization factor must be finite and >= 0, got {}",
                self.regularization_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.dropout_keep_probability) {
            return Err(Error::InvalidConfig(format!(
                "dropout keep probability must be in [0,1], got {}",
                self.dropout_keep_probability
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be in [0,1), got {}",
                self.momentum
            )));
        }

        Ok(HyperParameters {
            layers: self.layers,
            learning_rate: self.learning_rate,
            iterations: self.iterations,
            regularization_factor: self.regularization_factor,
            dropout_keep_probability: self.dropout_keep_probability,
            mini_batch_size: self.mini_batch_size,
            momentum: self.momentum,
            seed: self.seed,
            cost_report_interval: self.cost_report_interval,
        })
    }
}
