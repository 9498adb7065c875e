//! Prediction metrics.
//!
//! Metrics are evaluation helpers; they do not participate in backprop.

use std::fmt;

use crate::{Error, MatrixView, Result};

/// An output strictly greater than this is classified as `1`.
pub const DECISION_THRESHOLD: f32 = 0.5;

#[inline]
pub fn classify(probability: f32) -> bool {
    probability > DECISION_THRESHOLD
}

/// Outcome of classifying a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Examples whose predicted class equals the label.
    pub correct: usize,
    pub incorrect: usize,
    /// `correct / (correct + incorrect)`.
    pub accuracy: f64,
}

impl Prediction {
    /// Compare thresholded output probabilities `(1 x m)` against labels `(1 x m)`.
    pub fn from_outputs(output: MatrixView<'_>, labels: MatrixView<'_>) -> Result<Self> {
        if output.rows() != 1 || output.dims() != labels.dims() {
            return Err(Error::DimensionMismatch(format!(
                "output is {}x{}, labels are {}x{}; both must be 1xm",
                output.rows(),
                output.cols(),
                labels.rows(),
                labels.cols()
            )));
        }

        let total = labels.cols();
        let correct = (0..total)
            .filter(|&j| classify(output.at(0, j)) == (labels.at(0, j) == 1.0))
            .count();

        Ok(Self {
            correct,
            incorrect: total - correct,
            accuracy: if total == 0 {
                0.0
            } else {
                correct as f64 / total as f64
            },
        })
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "correct: {}, incorrect: {}, accuracy: {:.2}%",
            self.correct,
            self.incorrect,
            self.accuracy * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Matrix;

    #[test]
    fn counts_correct_and_incorrect() {
        let output = Matrix::row_vector(vec![0.9, 0.2, 0.7, 0.4]);
        let labels = Matrix::row_vector(vec![1.0, 0.0, 0.0, 0.0]);
        let p = Prediction::from_outputs(output.view(), labels.view()).unwrap();

        assert_eq!(p.correct, 3);
        assert_eq!(p.incorrect, 1);
        assert!((p.accuracy - 0.75).abs() < 1e-12);
        assert_eq!(p.to_string(), "correct: 3, incorrect: 1, accuracy: 75.00%");
    }

    #[test]
    fn exactly_half_is_class_zero() {
        assert!(!classify(0.5));
        assert!(classify(0.500_001));

        let output = Matrix::row_vector(vec![0.5]);
        let labels = Matrix::row_vector(vec![0.0]);
        let p = Prediction::from_outputs(output.view(), labels.view()).unwrap();
        assert_eq!(p.correct, 1);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let output = Matrix::row_vector(vec![0.9, 0.2]);
        let labels = Matrix::row_vector(vec![1.0]);
        assert!(matches!(
            Prediction::from_outputs(output.view(), labels.view()),
            Err(Error::DimensionMismatch(_))
        ));
    }
}
