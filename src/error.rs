//! Error types.
//!
//! - `AppError` is what the binary reports: a message plus the process exit code.
//! - `WeightError` is the taxonomy raised by the weighting engines. It converts
//!   into `AppError` so `?` works across the boundary.
//!
//! Exit codes:
//! - `2` bad input, configuration or file I/O
//! - `3` insufficient data (a category with nothing to weight)
//! - `4` a numerical invariant did not hold

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the catalog, the engines and the validator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("no station coordinates for receiver {receiver}")]
    MissingLocation { receiver: String },

    #[error("category {category} has zero measurements")]
    ZeroMeasurementCategory { category: String },

    #[error("category {category} has no stations to decluster")]
    EmptyCategory { category: String },

    #[error("invalid category ratio for {category}: {reason}")]
    InvalidCategoryRatio { category: String, reason: String },

    #[error("malformed channel id '{channel}' (expected NET.STA.LOC.CHAN)")]
    MalformedChannel { channel: String },

    #[error("invalid scan parameters: {reason}")]
    InvalidScanParams { reason: String },

    #[error("declustering {category} returned {actual} weights for {expected} stations")]
    DeclusterMismatch {
        category: String,
        expected: usize,
        actual: usize,
    },

    #[error("overall weight sum {sum:.12} is not within {tolerance:e} of 1.0")]
    Normalization { sum: f64, tolerance: f64 },
}

impl WeightError {
    pub fn exit_code(&self) -> u8 {
        match self {
            WeightError::MissingLocation { .. }
            | WeightError::InvalidCategoryRatio { .. }
            | WeightError::MalformedChannel { .. }
            | WeightError::InvalidScanParams { .. } => 2,
            WeightError::ZeroMeasurementCategory { .. } | WeightError::EmptyCategory { .. } => 3,
            WeightError::DeclusterMismatch { .. } | WeightError::Normalization { .. } => 4,
        }
    }
}

impl From<WeightError> for AppError {
    fn from(err: WeightError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
