//! Unified error types for the dashboard engine.
//!
//! Error codes:
//! - DATA_001-002: Dataset errors
//! - CALC_001-002: Comparison errors (recovered locally, never fatal)
//! - VALID_001: Validation errors
//! - STORE_001: Session store errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Dataset error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorCode {
    /// DATA_001: No records available at all
    EmptyDataset,
    /// DATA_002: Requested column absent from the record set
    MissingField,
}

impl DataErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "DATA_001",
            Self::MissingField => "DATA_002",
        }
    }
}

/// Calculation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcErrorCode {
    /// CALC_001: Zero denominator in a delta or rate
    UndefinedComparison,
    /// CALC_002: Control and test variants not both present
    InsufficientVariants,
}

impl CalcErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UndefinedComparison => "CALC_001",
            Self::InsufficientVariants => "CALC_002",
        }
    }
}

/// Unified error type for the dashboard engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The fetched snapshot holds no records; the render must stop.
    #[error("[DATA_001] No data available")]
    EmptyDataset,

    #[error("[DATA_002] missing field: {0}")]
    MissingField(String),

    #[error("[CALC_001] no comparison available: {0}")]
    UndefinedComparison(String),

    #[error("[CALC_002] insufficient data: {0}")]
    InsufficientVariants(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn undefined_comparison(msg: impl Into<String>) -> Self {
        Self::UndefinedComparison(msg.into())
    }

    pub fn insufficient_variants(msg: impl Into<String>) -> Self {
        Self::InsufficientVariants(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmptyDataset => 404,
            Self::MissingField(_) => 404,
            Self::UndefinedComparison(_) => 422,
            Self::InsufficientVariants(_) => 422,
            Self::Validation(_) => 400,
            Self::Store(_) => 502,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::EmptyDataset => Some(DataErrorCode::EmptyDataset.code()),
            Self::MissingField(_) => Some(DataErrorCode::MissingField.code()),
            Self::UndefinedComparison(_) => Some(CalcErrorCode::UndefinedComparison.code()),
            Self::InsufficientVariants(_) => Some(CalcErrorCode::InsufficientVariants.code()),
            Self::Validation(_) => Some("VALID_001"),
            Self::Store(_) => Some("STORE_001"),
            _ => None,
        }
    }

    /// Whether the render pass must stop on this error.
    ///
    /// Everything except an empty snapshot or a failed read degrades to an
    /// inline label next to the affected metric.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptyDataset | Self::Store(_) | Self::Internal(_))
    }
}
