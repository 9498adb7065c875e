//! Labelled datasets.
//!
//! Examples are stored as columns: `features` is `(feature_count x m)` and `labels` is
//! `(1 x m)` with values in `{0, 1}`. Both are validated once at construction, so the
//! training loop can slice them into column views without re-checking.

use crate::{Error, Matrix, Result};

/// A binary classification dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Matrix,
}

impl Dataset {
    /// Pair a feature matrix with a label row.
    ///
    /// Fails with [`Error::InvalidData`] unless `labels` is `(1 x m)`, `features` has
    /// the same `m > 0` columns and at least one row, and every label is `0` or `1`.
    pub fn new(features: Matrix, labels: Matrix) -> Result<Self> {
        if labels.rows() != 1 {
            return Err(Error::InvalidData(format!(
                "labels must be a single row, got {}x{}",
                labels.rows(),
                labels.cols()
            )));
        }
        if features.cols() != labels.cols() {
            return Err(Error::InvalidData(format!(
                "features have {} examples but labels have {}",
                features.cols(),
                labels.cols()
            )));
        }
        if features.cols() == 0 {
            return Err(Error::InvalidData(
                "dataset must contain at least one example".to_owned(),
            ));
        }
        if features.rows() == 0 {
            return Err(Error::InvalidData(
                "examples must have at least one feature".to_owned(),
            ));
        }
        if let Some((j, y)) = labels
            .as_slice()
            .iter()
            .enumerate()
            .find(|&(_, &y)| y != 0.0 && y != 1.0)
        {
            return Err(Error::InvalidData(format!(
                "label {y} for example {j} is not 0 or 1"
            )));
        }

        Ok(Self { features, labels })
    }

    /// Build from per-example feature vectors and boolean classes.
    ///
    /// This copies into column-major-by-example storage.
    pub fn from_examples(examples: &[Vec<f32>], classes: &[bool]) -> Result<Self> {
        if examples.len() != classes.len() {
            return Err(Error::InvalidData(format!(
                "got {} examples but {} labels",
                examples.len(),
                classes.len()
            )));
        }
        if examples.is_empty() {
            return Err(Error::InvalidData(
                "dataset must contain at least one example".to_owned(),
            ));
        }

        let features = Matrix::horizontal_stack(examples)
            .map_err(|e| Error::InvalidData(format!("inconsistent example vectors: {e}")))?;
        let labels = Matrix::row_vector(classes.iter().map(|&c| f32::from(u8::from(c))).collect());
        Self::new(features, labels)
    }

    #[inline]
    pub fn feature_count(&self) -> usize {
        self.features.rows()
    }

    #[inline]
    pub fn example_count(&self) -> usize {
        self.features.cols()
    }

    #[inline]
    pub fn features(&self) -> &Matrix {
        &self.features
    }

    #[inline]
    pub fn labels(&self) -> &Matrix {
        &self.labels
    }
}
