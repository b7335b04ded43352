use thiserror::Error;

/// A result type for optimization errors
pub type Result<T> = std::result::Result<T, EgoError>;

/// An error for the sequential optimization loop
#[derive(Error, Debug)]
pub enum EgoError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When a criterion name is unknown
    #[error("Unsupported name: {0}")]
    UnsupportedName(String),
    /// When an operation is called in the wrong stage of the optimization
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// When no candidate point can be evaluated
    #[error("No reachable point: {0}")]
    NoReachablePoint(String),
    /// When surrogate computation fails
    #[error(transparent)]
    GpError(#[from] bopt_gp::GpError),
    /// When IO fails
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    /// When checkpoint (de)serialization fails
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
}
