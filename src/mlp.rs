//! Forward and backward propagation over a batch.
//!
//! Examples are columns: a batch of `m` examples with `n` features is an `(n x m)`
//! matrix. Each layer owns a [`LayerCache`] with its pre-activation, activation,
//! optional dropout mask and gradients, all sized to the batch. Layer 0's activation
//! is the batch's input view itself and is never copied into a cache.
//!
//! Caches are allocated once per batch and overwritten on every pass.

use rand::rngs::StdRng;

use crate::{Error, HyperParameters, Matrix, MatrixView, Parameters, Result, loss};

/// Per-layer working buffers (overwrite semantics).
#[derive(Debug, Clone)]
pub(crate) struct LayerCache {
    /// Pre-activation `W·A_prev + b`, `(n x m)`.
    pub z: Matrix,
    /// Activation (after dropout on training passes), `(n x m)`.
    pub a: Matrix,
    /// Inverted-dropout mask already scaled by `1/keep`; `None` when dropout does not
    /// apply to this layer.
    pub mask: Option<Matrix>,
    /// `(n x n_prev)`.
    pub dw: Matrix,
    /// `(n x 1)`.
    pub db: Matrix,
    /// `(n x m)`.
    pub dz: Matrix,
    /// `(n x m)`.
    pub da: Matrix,
}

impl LayerCache {
    fn new(neurons: usize, fan_in: usize, examples: usize, with_mask: bool) -> Self {
        Self {
            z: Matrix::zeros(neurons, examples),
            a: Matrix::zeros(neurons, examples),
            mask: with_mask.then(|| Matrix::zeros(neurons, examples)),
            dw: Matrix::zeros(neurons, fan_in),
            db: Matrix::zeros(neurons, 1),
            dz: Matrix::zeros(neurons, examples),
            da: Matrix::zeros(neurons, examples),
        }
    }
}

/// Allocate caches for every parameterized layer.
///
/// With `training` set and dropout enabled, hidden layers get a mask buffer; the
/// output layer never does.
pub(crate) fn layer_caches(
    hp: &HyperParameters,
    feature_count: usize,
    examples: usize,
    training: bool,
) -> Vec<LayerCache> {
    let sizes = hp.layer_sizes(feature_count);
    let last = hp.num_layers() - 1;
    let dropout = training && hp.dropout_enabled();

    sizes
        .windows(2)
        .enumerate()
        .map(|(idx, w)| LayerCache::new(w[1], w[0], examples, dropout && idx != last))
        .collect()
}

/// Output-layer activations from the most recent forward pass.
pub(crate) fn output(caches: &[LayerCache]) -> &Matrix {
    &caches
        .last()
        .expect("network must have at least one layer")
        .a
}

/// Forward propagation through every layer.
///
/// Pass `dropout_rng` only on training passes; with `None`, or for layers without a
/// mask buffer, the full network is used.
pub(crate) fn forward(
    hp: &HyperParameters,
    params: &Parameters,
    input: MatrixView<'_>,
    caches: &mut [LayerCache],
    mut dropout_rng: Option<&mut StdRng>,
) -> Result<()> {
    check_layer_count(hp, params, caches)?;
    let keep = hp.dropout_keep_probability();

    for idx in 0..caches.len() {
        let (done, rest) = caches.split_at_mut(idx);
        let entry = &mut rest[0];
        let prev = done.last().map_or(input, |p| p.a.view());
        let activation = hp.layers()[idx].activation;

        entry.z.multiply_into(params.weights(idx).view(), prev)?;
        entry.z.add_column_vector_assign(params.biases(idx).view())?;
        entry.a.elementwise(entry.z.view(), |z| activation.forward(z))?;

        if let (Some(mask), Some(rng)) = (entry.mask.as_mut(), dropout_rng.as_deref_mut()) {
            mask.fill_bernoulli(keep, rng)?;
            mask.apply(|d| d / keep);
            entry.a.combine_assign(mask.view(), |a, d| a * d)?;
        }
    }

    Ok(())
}

/// Backward propagation from the output layer down to the first layer.
///
/// Must follow a training-pass [`forward`] on the same `input` and `caches`; dropout
/// masks from that pass are reused, not regenerated.
pub(crate) fn backward(
    hp: &HyperParameters,
    params: &Parameters,
    input: MatrixView<'_>,
    labels: MatrixView<'_>,
    caches: &mut [LayerCache],
) -> Result<()> {
    check_layer_count(hp, params, caches)?;
    let m = labels.cols() as f32;
    let lambda = hp.regularization_factor();

    {
        let out = caches
            .last_mut()
            .expect("network must have at least one layer");
        loss::cross_entropy_backward(out.a.view(), labels, &mut out.da)?;
    }

    for idx in (0..caches.len()).rev() {
        let (before, rest) = caches.split_at_mut(idx);
        let entry = &mut rest[0];
        let activation = hp.layers()[idx].activation;

        entry.dz.elementwise(entry.z.view(), |z| activation.derivative(z))?;
        entry.dz.combine_assign(entry.da.view(), |g, da| g * da)?;

        let prev = before.last().map_or(input, |p| p.a.view());
        entry.dw.multiply_into(entry.dz.view(), prev.transpose())?;
        if lambda > 0.0 {
            entry
                .dw
                .combine_assign(params.weights(idx).view(), |g, w| g + lambda * w)?;
        }
        entry.dw.apply(|g| g / m);
        entry.db.row_sum(entry.dz.view(), true)?;

        if let Some(prev) = before.last_mut() {
            prev.da
                .multiply_into(params.weights(idx).transpose(), entry.dz.view())?;
            if let Some(mask) = prev.mask.as_ref() {
                prev.da.combine_assign(mask.view(), |g, d| g * d)?;
            }
        }
    }

    Ok(())
}

fn check_layer_count(hp: &HyperParameters, params: &Parameters, caches: &[LayerCache]) -> Result<()> {
    if caches.len() != hp.num_layers() || params.num_layers() != hp.num_layers() {
        return Err(Error::DimensionMismatch(format!(
            "network has {} layers but got {} caches and {} parameter layers",
            hp.num_layers(),
            caches.len(),
            params.num_layers()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;

    use crate::{Activation, HyperParametersBuilder};

    fn hyperparams(lambda: f32) -> HyperParameters {
        HyperParametersBuilder::new()
            .add_layer(3, Activation::Tanh)
            .add_layer(2, Activation::Sigmoid)
            .add_layer(1, Activation::Sigmoid)
            .regularization_factor(lambda)
            .build()
            .unwrap()
    }

    fn batch() -> (Matrix, Matrix) {
        let x = Matrix::from_vec(2, 3, vec![0.3, -0.7, 0.5, -0.2, 0.4, 0.9]).unwrap();
        let y = Matrix::row_vector(vec![1.0, 0.0, 1.0]);
        (x, y)
    }

    fn params_for(hp: &HyperParameters) -> Parameters {
        let mut params =
            Parameters::init(hp.layers(), 2, &mut StdRng::seed_from_u64(0)).unwrap();
        // Mixed-sign weights and non-zero biases exercise every term.
        for idx in 0..params.num_layers() {
            params.weights_mut(idx).apply(|w| w - 0.3);
            params.biases_mut(idx).apply(|b| b + 0.1);
        }
        params
    }

    fn cost_for(hp: &HyperParameters, params: &Parameters, x: &Matrix, y: &Matrix) -> f32 {
        let mut caches = layer_caches(hp, x.rows(), x.cols(), false);
        forward(hp, params, x.view(), &mut caches, None).unwrap();
        loss::cost(
            output(&caches).view(),
            y.view(),
            hp.regularization_factor(),
            params.output_weights(),
        )
        .unwrap()
    }

    fn assert_close(analytic: f32, numeric: f32, abs_tol: f32, rel_tol: f32) {
        let diff = (analytic - numeric).abs();
        let scale = analytic.abs().max(numeric.abs()).max(1.0);
        assert!(
            diff <= abs_tol || diff / scale <= rel_tol,
            "analytic={analytic} numeric={numeric} diff={diff}"
        );
    }

    fn param_mut(params: &mut Parameters, layer_idx: usize, bias: bool) -> &mut Matrix {
        if bias {
            params.biases_mut(layer_idx)
        } else {
            params.weights_mut(layer_idx)
        }
    }

    /// Central difference of the cost with respect to one weight or bias.
    fn numeric_gradient(
        hp: &HyperParameters,
        params: &mut Parameters,
        x: &Matrix,
        y: &Matrix,
        layer_idx: usize,
        bias: bool,
        (row, col): (usize, usize),
    ) -> f32 {
        let eps = 1e-2_f32;
        let orig = param_mut(params, layer_idx, bias).at(row, col);

        param_mut(params, layer_idx, bias).set(row, col, orig + eps);
        let plus = cost_for(hp, params, x, y);
        param_mut(params, layer_idx, bias).set(row, col, orig - eps);
        let minus = cost_for(hp, params, x, y);
        param_mut(params, layer_idx, bias).set(row, col, orig);

        (plus - minus) / (2.0 * eps)
    }

    fn analytic_gradients(hp: &HyperParameters, params: &Parameters, x: &Matrix, y: &Matrix) -> Vec<LayerCache> {
        let mut caches = layer_caches(hp, x.rows(), x.cols(), true);
        forward(hp, params, x.view(), &mut caches, None).unwrap();
        backward(hp, params, x.view(), y.view(), &mut caches).unwrap();
        caches
    }

    #[test]
    fn backward_matches_numeric_gradients() {
        let hp = hyperparams(0.0);
        let (x, y) = batch();
        let mut params = params_for(&hp);
        let caches = analytic_gradients(&hp, &params, &x, &y);

        for layer_idx in 0..params.num_layers() {
            let (rows, cols) = params.weights(layer_idx).dims();
            for row in 0..rows {
                for col in 0..cols {
                    let numeric =
                        numeric_gradient(&hp, &mut params, &x, &y, layer_idx, false, (row, col));
                    let analytic = caches[layer_idx].dw.at(row, col);
                    assert_close(analytic, numeric, 1e-3, 1e-2);
                }
                let numeric = numeric_gradient(&hp, &mut params, &x, &y, layer_idx, true, (row, 0));
                let analytic = caches[layer_idx].db.at(row, 0);
                assert_close(analytic, numeric, 1e-3, 1e-2);
            }
        }
    }

    #[test]
    fn l2_term_in_cost_only_covers_the_output_layer() {
        // The cost penalizes W_L only, while every DW carries lambda*W/m. The output
        // layer therefore still matches finite differences; hidden layers are off by
        // exactly lambda*W/m.
        let lambda = 0.5;
        let hp = hyperparams(lambda);
        let plain = hyperparams(0.0);
        let (x, y) = batch();
        let mut params = params_for(&hp);
        let m = x.cols() as f32;

        let caches = analytic_gradients(&hp, &params, &x, &y);
        let unregularized = analytic_gradients(&plain, &params, &x, &y);

        let last = params.num_layers() - 1;
        for col in 0..params.weights(last).cols() {
            let numeric = numeric_gradient(&hp, &mut params, &x, &y, last, false, (0, col));
            assert_close(caches[last].dw.at(0, col), numeric, 1e-3, 1e-2);
        }

        for layer_idx in 0..last {
            let (rows, cols) = params.weights(layer_idx).dims();
            for row in 0..rows {
                for col in 0..cols {
                    let expected = unregularized[layer_idx].dw.at(row, col)
                        + lambda * params.weights(layer_idx).at(row, col) / m;
                    assert!((caches[layer_idx].dw.at(row, col) - expected).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn dropout_masks_hidden_layers_only_and_are_reused_in_backward() {
        let hp = HyperParametersBuilder::new()
            .add_layer(4, Activation::ReLU)
            .add_layer(1, Activation::Sigmoid)
            .dropout_keep_probability(0.5)
            .build()
            .unwrap();
        let (x, y) = batch();
        let params = params_for(&hp);
        let mut rng = StdRng::seed_from_u64(11);

        let mut caches = layer_caches(&hp, 2, 3, true);
        assert!(caches[0].mask.is_some());
        assert!(caches[1].mask.is_none());

        forward(&hp, &params, x.view(), &mut caches, Some(&mut rng)).unwrap();
        let mask = caches[0].mask.clone().unwrap();
        assert!(mask.as_slice().iter().all(|&d| d == 0.0 || d == 2.0));
        for (idx, &d) in mask.as_slice().iter().enumerate() {
            if d == 0.0 {
                assert_eq!(caches[0].a.as_slice()[idx], 0.0);
            }
        }

        backward(&hp, &params, x.view(), y.view(), &mut caches).unwrap();
        assert_eq!(caches[0].mask.as_ref().unwrap(), &mask);

        // Unmasked upstream gradient W2ᵀ·dZ2; survivors carry it scaled by 1/keep.
        let mut upstream = Matrix::zeros(4, 3);
        upstream
            .multiply_into(params.weights(1).transpose(), caches[1].dz.view())
            .unwrap();
        for (idx, &d) in mask.as_slice().iter().enumerate() {
            let da = caches[0].da.as_slice()[idx];
            if d == 0.0 {
                assert_eq!(da, 0.0);
            } else {
                let expected = upstream.as_slice()[idx] * 2.0;
                assert!((da - expected).abs() < 1e-6, "da={da} expected={expected}");
            }
        }
    }

    #[test]
    fn inference_caches_skip_dropout() {
        let hp = HyperParametersBuilder::new()
            .add_layer(4, Activation::ReLU)
            .add_layer(1, Activation::Sigmoid)
            .dropout_keep_probability(0.5)
            .build()
            .unwrap();
        let caches = layer_caches(&hp, 2, 3, false);
        assert!(caches.iter().all(|c| c.mask.is_none()));
    }

    #[test]
    fn forward_rejects_mismatched_input() {
        let hp = hyperparams(0.0);
        let params = params_for(&hp);
        let x = Matrix::zeros(3, 2);
        let mut caches = layer_caches(&hp, 3, 2, false);
        assert!(matches!(
            forward(&hp, &params, x.view(), &mut caches, None),
            Err(Error::DimensionMismatch(_))
        ));
    }
}
