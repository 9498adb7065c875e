//! A from-scratch feed-forward network for binary classification.
//!
//! `rust-neuralnet` trains a dense multi-layer network with a single sigmoid output on
//! labelled examples and classifies new ones. It owns its matrix type, so the whole
//! path from matrix multiplication to parameter updates is readable in one crate.
//!
//! # Design goals
//!
//! - Zero-copy views: transposes and mini-batch column ranges are strided
//!   [`MatrixView`]s over existing storage, never copies.
//! - Reused buffers: per-layer caches are allocated once per batch and overwritten on
//!   every pass.
//! - Clear contracts: hyperparameters and datasets are validated once, at construction,
//!   and every matrix operation checks shapes and returns [`Result`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - Examples are columns: features are `(feature_count x m)`, labels `(1 x m)` with
//!   values `0` or `1`.
//! - Layer weights are `(n_i x n_{i-1})`, biases `(n_i x 1)`.
//!
//! # Training controls
//!
//! All optional and disabled by 0: L2 regularization, inverted dropout on hidden
//! layers, mini-batches (visited in a fixed order, never shuffled) and momentum.
//!
//! # Logging
//!
//! Progress is reported through the [`log`] facade; install any logger (for example
//! `env_logger`) to see the periodic cost.
//!
//! # Quick start
//!
//! ```rust
//! use rust_neuralnet::{Activation, Dataset, HyperParametersBuilder};
//!
//! # fn main() -> rust_neuralnet::Result<()> {
//! let examples = vec![
//!     vec![0.0, 0.0],
//!     vec![0.2, 0.2],
//!     vec![1.0, 1.0],
//!     vec![0.8, 1.0],
//! ];
//! let data = Dataset::from_examples(&examples, &[false, false, true, true])?;
//!
//! let hp = HyperParametersBuilder::new()
//!     .add_layer(4, Activation::ReLU)
//!     .add_layer(1, Activation::Sigmoid)
//!     .learning_rate(0.1)
//!     .iterations(200)
//!     .seed(0)
//!     .build()?;
//!
//! let model = hp.train_model(&data)?;
//! let prediction = model.predict(&data)?;
//! assert_eq!(prediction.correct + prediction.incorrect, 4);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod batch;
pub mod builder;
pub mod data;
pub mod error;
pub mod hyperparams;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub(crate) mod mlp;
pub(crate) mod optim;
pub mod params;
pub mod train;

pub use activation::Activation;
pub use batch::batch_ranges;
pub use builder::HyperParametersBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use hyperparams::{HyperParameters, LayerSpec};
pub use matrix::{Matrix, MatrixView};
pub use metrics::Prediction;
pub use params::Parameters;
pub use train::TrainedModel;
