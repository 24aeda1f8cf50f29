use std::fmt;

/// The numeric core's result type.
pub type Result<T> = std::result::Result<T, MlpErr>;

/// Errors produced by the numeric core when inputs are invalid.
#[derive(Debug, PartialEq)]
pub enum MlpErr {
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),

    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "params", "input width").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },
}

impl fmt::Display for MlpErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlpErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            MlpErr::ShapeMismatch { what, got, expected } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for MlpErr {}
