//! Error types for divclust operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for divclust operations.
///
/// Covers configuration mistakes, malformed inputs, numerical
/// non-convergence and collaborators that break their contract.
///
/// # Examples
///
/// ```
/// use divclust::error::DivclustError;
///
/// let err = DivclustError::DimensionMismatch {
///     expected: "10x10".to_string(),
///     actual: "10x4".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DivclustError {
    /// Matrix dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An iterative procedure failed to converge within its retry budget.
    ConvergenceFailure {
        /// Number of iterations (or restarts) attempted
        iterations: usize,
        /// Last objective value observed
        final_loss: f64,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input data violates a precondition (empty, duplicate ids, NaN, ...).
    InvalidInput {
        /// What is wrong with the input
        message: String,
    },

    /// A pluggable collaborator returned a result outside its contract.
    InvalidOutput {
        /// What the collaborator got wrong
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl DivclustError {
    /// Shorthand for [`DivclustError::InvalidHyperparameter`].
    pub fn invalid_hyperparameter(
        param: impl Into<String>,
        value: impl fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Shorthand for [`DivclustError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`DivclustError::InvalidOutput`].
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput {
            message: message.into(),
        }
    }
}

impl fmt::Display for DivclustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivclustError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            DivclustError::ConvergenceFailure {
                iterations,
                final_loss,
            } => {
                write!(
                    f,
                    "Convergence failure after {iterations} iterations, loss = {final_loss}"
                )
            }
            DivclustError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            DivclustError::InvalidInput { message } => write!(f, "Invalid input: {message}"),
            DivclustError::InvalidOutput { message } => {
                write!(f, "Collaborator contract violated: {message}")
            }
            DivclustError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DivclustError {}

impl From<&str> for DivclustError {
    fn from(msg: &str) -> Self {
        DivclustError::Other(msg.to_string())
    }
}

impl From<String> for DivclustError {
    fn from(msg: String) -> Self {
        DivclustError::Other(msg)
    }
}

/// Convenience type alias for Results with `DivclustError`.
pub type Result<T> = std::result::Result<T, DivclustError>;
