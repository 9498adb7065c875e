//! Trainable state.
//!
//! `Parameters` holds one weight matrix `(n_i x n_{i-1})` and one bias column
//! `(n_i x 1)` per layer. The input layer has no parameters, so index 0 is the first
//! layer after the input and the last index is the output layer.
//!
//! The same type doubles as the momentum velocity store (`zeros_like`).

use rand::Rng;

use crate::{LayerSpec, Matrix, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl Parameters {
    /// Weights uniform over `[0, init_scale)` of each layer, biases zero.
    pub(crate) fn init<R: Rng + ?Sized>(
        layers: &[LayerSpec],
        feature_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut weights = Vec::with_capacity(layers.len());
        let mut biases = Vec::with_capacity(layers.len());

        let mut fan_in = feature_count;
        for layer in layers {
            let scale = layer.init_scale(fan_in);
            weights.push(Matrix::random(layer.neurons, fan_in, scale, rng)?);
            biases.push(Matrix::zeros(layer.neurons, 1));
            fan_in = layer.neurons;
        }

        Ok(Self { weights, biases })
    }

    /// All-zero store with the same shapes.
    pub(crate) fn zeros_like(&self) -> Self {
        let zeros = |m: &Matrix| Matrix::zeros(m.rows(), m.cols());
        Self {
            weights: self.weights.iter().map(zeros).collect(),
            biases: self.biases.iter().map(zeros).collect(),
        }
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    /// Number of input features the first layer expects.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.weights.first().map_or(0, Matrix::cols)
    }

    /// Panics if `layer_idx >= num_layers()`.
    #[inline]
    pub fn weights(&self, layer_idx: usize) -> &Matrix {
        &self.weights[layer_idx]
    }

    /// Panics if `layer_idx >= num_layers()`.
    #[inline]
    pub fn biases(&self, layer_idx: usize) -> &Matrix {
        &self.biases[layer_idx]
    }

    #[inline]
    pub(crate) fn weights_mut(&mut self, layer_idx: usize) -> &mut Matrix {
        &mut self.weights[layer_idx]
    }

    #[inline]
    pub(crate) fn biases_mut(&mut self, layer_idx: usize) -> &mut Matrix {
        &mut self.biases[layer_idx]
    }

    /// Output layer weights.
    #[inline]
    pub(crate) fn output_weights(&self) -> &Matrix {
        self.weights
            .last()
            .expect("parameters must have at least one layer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::Activation;

    fn layers() -> Vec<LayerSpec> {
        vec![
            LayerSpec::new(3, Activation::ReLU),
            LayerSpec::new(2, Activation::Tanh),
            LayerSpec::new(1, Activation::Sigmoid),
        ]
    }

    #[test]
    fn shapes_follow_layer_widths() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = Parameters::init(&layers(), 4, &mut rng).unwrap();

        assert_eq!(params.num_layers(), 3);
        assert_eq!(params.input_dim(), 4);
        assert_eq!(params.weights(0).dims(), (3, 4));
        assert_eq!(params.weights(1).dims(), (2, 3));
        assert_eq!(params.weights(2).dims(), (1, 2));
        assert_eq!(params.biases(0).dims(), (3, 1));
        assert_eq!(params.biases(2).dims(), (1, 1));
    }

    #[test]
    fn weights_are_bounded_by_init_scale_and_biases_are_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let specs = layers();
        let params = Parameters::init(&specs, 4, &mut rng).unwrap();

        let mut fan_in = 4;
        for (idx, spec) in specs.iter().enumerate() {
            let scale = spec.init_scale(fan_in);
            assert!(
                params
                    .weights(idx)
                    .as_slice()
                    .iter()
                    .all(|&w| (0.0..scale).contains(&w))
            );
            assert!(params.biases(idx).as_slice().iter().all(|&b| b == 0.0));
            fan_in = spec.neurons;
        }
    }

    #[test]
    fn seeded_init_is_deterministic() {
        let a = Parameters::init(&layers(), 4, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Parameters::init(&layers(), 4, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zeros_like_copies_shapes_only() {
        let params = Parameters::init(&layers(), 4, &mut StdRng::seed_from_u64(2)).unwrap();
        let velocity = params.zeros_like();
        for idx in 0..params.num_layers() {
            assert_eq!(velocity.weights(idx).dims(), params.weights(idx).dims());
            assert_eq!(velocity.biases(idx).dims(), params.biases(idx).dims());
            assert_eq!(velocity.weights(idx).frobenius_norm_squared(), 0.0);
        }
    }
}
