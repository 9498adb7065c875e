//! Training loop and predictor.
//!
//! A run initializes parameters from the hyperparameters' RNG, partitions the dataset
//! into fixed mini-batches once, then repeats `forward -> cost -> backward -> update`
//! for every batch on every iteration. Any error aborts the run; no partially trained
//! model is returned.

use log::{debug, info};

use crate::metrics::{self, Prediction};
use crate::mlp::{self, layer_caches};
use crate::optim::Optimizer;
use crate::{Dataset, Error, HyperParameters, Matrix, Parameters, Result, batch, loss};

/// The result of a training run: the hyperparameters it used and the learned
/// parameters.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    hyperparameters: HyperParameters,
    parameters: Parameters,
    final_cost: f32,
}

impl HyperParameters {
    /// Train a new network on `data`.
    ///
    /// Fails with [`Error::Numerical`] if the output activations saturate (the run
    /// diverged), or with [`Error::DimensionMismatch`] on internal shape errors.
    pub fn train_model(&self, data: &Dataset) -> Result<TrainedModel> {
        let mut rng = self.rng();
        let mut parameters = Parameters::init(self.layers(), data.feature_count(), &mut rng)?;
        let mut optimizer = Optimizer::for_run(self, &parameters);
        let mut batches = batch::partition(self, data)?;

        debug!(
            "training: layer sizes {:?}, {} examples, {} batch(es)",
            self.layer_sizes(data.feature_count()),
            data.example_count(),
            batches.len()
        );
        for (idx, b) in batches.iter().enumerate() {
            debug!("batch {idx}: examples {:?} ({})", b.range, b.len());
        }

        let lambda = self.regularization_factor();
        let report_every = self.cost_report_interval();
        let mut final_cost = f32::NAN;

        for iteration in 0..self.iterations() {
            for b in &mut batches {
                let dropout_rng = self.dropout_enabled().then_some(&mut rng);
                mlp::forward(self, &parameters, b.features, &mut b.caches, dropout_rng)?;

                final_cost = loss::cost(
                    mlp::output(&b.caches).view(),
                    b.labels,
                    lambda,
                    parameters.output_weights(),
                )?;

                mlp::backward(self, &parameters, b.features, b.labels, &mut b.caches)?;
                optimizer.step(&mut parameters, &b.caches, self.learning_rate())?;
            }

            if report_every > 0 && iteration > 0 && iteration % report_every == 0 {
                info!("cost after iteration {iteration}: {final_cost:.6}");
            }
        }

        info!(
            "training finished after {} iteration(s), final cost {final_cost:.6}",
            self.iterations()
        );

        Ok(TrainedModel {
            hyperparameters: self.clone(),
            parameters,
            final_cost,
        })
    }
}

impl TrainedModel {
    #[inline]
    pub fn hyperparameters(&self) -> &HyperParameters {
        &self.hyperparameters
    }

    #[inline]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Cost of the last batch processed during training.
    #[inline]
    pub fn final_cost(&self) -> f32 {
        self.final_cost
    }

    /// Output activations `(1 x m)` for a `(feature_count x m)` feature matrix.
    ///
    /// Runs the full network once; dropout is never applied.
    pub fn predict_probabilities(&self, features: &Matrix) -> Result<Matrix> {
        if features.rows() != self.parameters.input_dim() {
            return Err(Error::InvalidData(format!(
                "features have {} rows, model expects {}",
                features.rows(),
                self.parameters.input_dim()
            )));
        }
        if features.cols() == 0 {
            return Err(Error::InvalidData(
                "need at least one example to predict".to_owned(),
            ));
        }

        let mut caches = layer_caches(&self.hyperparameters, features.rows(), features.cols(), false);
        mlp::forward(
            &self.hyperparameters,
            &self.parameters,
            features.view(),
            &mut caches,
            None,
        )?;

        let Some(last) = caches.pop() else {
            return Err(Error::DimensionMismatch("network has no layers".to_owned()));
        };
        Ok(last.a)
    }

    /// Thresholded class of every example (`true` when the output is above 0.5).
    pub fn classify(&self, features: &Matrix) -> Result<Vec<bool>> {
        let output = self.predict_probabilities(features)?;
        Ok(output.as_slice().iter().copied().map(metrics::classify).collect())
    }

    /// Classify every example of `data` and compare against its labels.
    ///
    /// Read-only: repeated calls on the same data give the same result.
    pub fn predict(&self, data: &Dataset) -> Result<Prediction> {
        let output = self.predict_probabilities(data.features())?;
        Prediction::from_outputs(output.view(), data.labels().view())
    }
}
