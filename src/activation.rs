//! Activation functions.
//!
//! A dense layer computes a pre-activation `Z = W·A_prev + b` and then applies an
//! activation element-wise: `A = activation(Z)`.
//!
//! Backprop needs `activation'(Z)`. We cache `Z` per layer, so the derivative is
//! expressed in terms of the pre-activation, which also keeps each derivative next to
//! its primal in a single `match`.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
/// Element-wise activation function.
pub enum Activation {
    ReLU,
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    pub fn forward(self, z: f32) -> f32 {
        match self {
            Activation::ReLU => z.max(0.0),
            Activation::Sigmoid => sigmoid(z),
            Activation::Tanh => z.tanh(),
        }
    }

    /// Derivative with respect to the pre-activation `z`.
    #[inline]
    pub fn derivative(self, z: f32) -> f32 {
        match self {
            Activation::ReLU => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => {
                let s = sigmoid(z);
                s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = z.tanh();
                1.0 - t * t
            }
        }
    }

    /// Upper bound of the uniform weight initialization for a layer with `fan_in` inputs.
    ///
    /// - ReLU: `sqrt(2 / fan_in)` (He)
    /// - sigmoid / tanh: `sqrt(1 / fan_in)`
    #[inline]
    pub fn init_scale(self, fan_in: usize) -> f32 {
        let numerator = match self {
            Activation::ReLU => 2.0,
            Activation::Sigmoid | Activation::Tanh => 1.0,
        };
        (numerator / fan_in as f32).sqrt()
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::ReLU => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::ReLU),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            other => Err(Error::InvalidConfig(format!(
                "unknown activation function {other:?}"
            ))),
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_derivative(act: Activation, z: f32) -> f32 {
        let eps = 1e-3_f32;
        (act.forward(z + eps) - act.forward(z - eps)) / (2.0 * eps)
    }

    #[test]
    fn sigmoid_basic_values() {
        let y0 = Activation::Sigmoid.forward(0.0);
        assert!((y0 - 0.5).abs() < 1e-6);

        let y_pos = Activation::Sigmoid.forward(10.0);
        let y_neg = Activation::Sigmoid.forward(-10.0);
        assert!(y_pos > 0.999);
        assert!(y_neg < 0.001);
        assert!(y_neg > 0.0);
    }

    #[test]
    fn relu_forward_and_derivative() {
        assert_eq!(Activation::ReLU.forward(-2.0), 0.0);
        assert_eq!(Activation::ReLU.forward(3.0), 3.0);
        assert_eq!(Activation::ReLU.derivative(-2.0), 0.0);
        assert_eq!(Activation::ReLU.derivative(0.0), 0.0);
        assert_eq!(Activation::ReLU.derivative(3.0), 1.0);
    }

    #[test]
    fn smooth_derivatives_match_finite_differences() {
        for act in [Activation::Sigmoid, Activation::Tanh] {
            for z in [-2.0_f32, -0.3, 0.0, 0.7, 1.5] {
                let analytic = act.derivative(z);
                let numeric = numeric_derivative(act, z);
                assert!(
                    (analytic - numeric).abs() < 1e-3,
                    "{act} at {z}: analytic={analytic} numeric={numeric}"
                );
            }
        }
        assert!((Activation::Sigmoid.derivative(0.0) - 0.25).abs() < 1e-6);
        assert!((Activation::Tanh.derivative(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn init_scale_depends_on_activation_and_fan_in() {
        assert!((Activation::ReLU.init_scale(2) - 1.0).abs() < 1e-6);
        assert!((Activation::Sigmoid.init_scale(4) - 0.5).abs() < 1e-6);
        assert!((Activation::Tanh.init_scale(1) - 1.0).abs() < 1e-6);
        assert!(Activation::ReLU.init_scale(8) > Activation::Tanh.init_scale(8));
    }

    #[test]
    fn parses_and_displays_names() {
        assert_eq!("relu".parse::<Activation>().unwrap(), Activation::ReLU);
        assert_eq!("Sigmoid".parse::<Activation>().unwrap(), Activation::Sigmoid);
        assert_eq!("tanh".parse::<Activation>().unwrap(), Activation::Tanh);
        assert!("softmax".parse::<Activation>().is_err());
        assert_eq!(Activation::ReLU.to_string(), "relu");
    }
}
