use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid hyperparameters or construction arguments.
    InvalidConfig(String),
    /// Dataset contract violations (labels, example counts, feature dims).
    InvalidData(String),
    /// Matrix operands or destination have incompatible shapes.
    DimensionMismatch(String),
    /// Column slice outside of the matrix.
    OutOfRange(String),
    /// Training diverged (e.g. log of a non-positive value in the cost).
    Numerical(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
            Error::OutOfRange(msg) => write!(f, "out of range: {msg}"),
            Error::Numerical(msg) => write!(f, "numerical error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
