use thiserror::Error;

/// Unified error type for the entire rate-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Domain ──────────────────────────────────────────────────────
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("No price data available: the rate store is empty")]
    NoPriceDataAvailable,

    #[error("Price not available for {asset} on {date}")]
    PriceNotAvailable { asset: String, date: String },

    // ── Request validation ──────────────────────────────────────────
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── Repository ──────────────────────────────────────────────────
    #[error("Repository error: {0}")]
    Repository(String),

    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

impl ErrorKind {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl CoreError {
    /// Domain errors map to client-facing statuses; everything else is a server error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::PortfolioNotFound(_)
            | CoreError::NoPriceDataAvailable
            | CoreError::PriceNotAvailable { .. } => ErrorKind::NotFound,
            CoreError::InvalidDateRange(_)
            | CoreError::InvalidDate(_)
            | CoreError::InvalidPeriod(_)
            | CoreError::ValidationError(_) => ErrorKind::BadRequest,
            CoreError::Repository(_)
            | CoreError::InvalidFileFormat(_)
            | CoreError::UnsupportedVersion(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_)
            | CoreError::FileIO(_) => ErrorKind::Internal,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<chrono::ParseError> for CoreError {
    fn from(e: chrono::ParseError) -> Self {
        CoreError::InvalidDate(e.to_string())
    }
}
