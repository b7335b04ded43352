use thiserror::Error;

/// A result type for surrogate modeling algorithms
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when building or fitting a surrogate model
#[derive(Error, Debug)]
pub enum GpError {
    /// When a kernel expression refers to an unregistered name
    #[error("Parse error: {0}")]
    ParseError(String),
    /// When a kernel expression is syntactically malformed
    #[error("Structure error: {0}")]
    StructureError(String),
    /// When a surrogate, mean function or kernel identifier is unknown
    #[error("Unsupported name: {0}")]
    UnsupportedName(String),
    /// When the correlation matrix is numerically not positive definite
    #[error("Matrix is not positive definite: pivot {pivot} is not positive")]
    NotPositiveDefinite { pivot: usize },
    /// When sample, hyperparameter or query dimensions are inconsistent
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// When a prediction is requested before any fit
    #[error("Surrogate model is not fitted")]
    NotFitted,
    /// When a value is invalid
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When an array shape error occurs
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
