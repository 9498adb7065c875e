//! Binary cross-entropy.
//!
//! Used like:
//!
//! - run forward propagation
//! - evaluate [`cost`] for reporting
//! - seed the output gradient with [`cross_entropy_backward`]
//! - run backward propagation
//!
//! The output activation must lie strictly inside `(0, 1)`. A saturated output means
//! the run has diverged; both functions report it as [`Error::Numerical`] instead of
//! clamping.

use crate::{Error, Matrix, MatrixView, Result};

/// Mean binary cross-entropy over the batch, plus the L2 penalty on the output
/// layer's weights when `regularization > 0`:
///
/// `J = (1/m) * ( -sum[y*ln(a) + (1-y)*ln(1-a)] + (lambda/2) * ||W_L||² )`
///
/// Only the output layer is penalized here, although every layer's weight gradient
/// carries the L2 term.
pub fn cost(
    output: MatrixView<'_>,
    labels: MatrixView<'_>,
    regularization: f32,
    output_weights: &Matrix,
) -> Result<f32> {
    check_shapes(output, labels)?;

    let m = labels.cols();
    let mut sum = 0.0_f32;
    for j in 0..m {
        let a = output.at(0, j);
        let y = labels.at(0, j);
        check_open_unit(a, j)?;
        sum += y * a.ln() + (1.0 - y) * (1.0 - a).ln();
    }

    let mut total = -sum;
    if regularization > 0.0 {
        total += 0.5 * regularization * output_weights.frobenius_norm_squared();
    }

    let cost = total / m as f32;
    if !cost.is_finite() {
        return Err(Error::Numerical(format!("cost is not finite: {cost}")));
    }
    Ok(cost)
}

/// Writes `dJ/dA = -y/a + (1-y)/(1-a)` for the output layer into `d_output`.
pub fn cross_entropy_backward(
    output: MatrixView<'_>,
    labels: MatrixView<'_>,
    d_output: &mut Matrix,
) -> Result<()> {
    check_shapes(output, labels)?;
    for j in 0..output.cols() {
        check_open_unit(output.at(0, j), j)?;
    }
    d_output.combine(labels, output, |y, a| -y / a + (1.0 - y) / (1.0 - a))
}

fn check_shapes(output: MatrixView<'_>, labels: MatrixView<'_>) -> Result<()> {
    if output.rows() != 1 || output.dims() != labels.dims() {
        return Err(Error::DimensionMismatch(format!(
            "output is {}x{}, labels are {}x{}; both must be 1xm",
            output.rows(),
            output.cols(),
            labels.rows(),
            labels.cols()
        )));
    }
    Ok(())
}

#[inline]
fn check_open_unit(a: f32, example: usize) -> Result<()> {
    if !(a > 0.0 && a < 1.0) {
        return Err(Error::Numerical(format!(
            "output activation {a} for example {example} is outside (0, 1); \
             the run diverged (try a smaller learning rate)"
        )));
    }
    Ok(())
}
