use thiserror::Error;

/// Failure talking to one of the upstream cluster services (directory, status, version).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} is unreachable: {reason}")]
    Unreachable { service: &'static str, reason: String },

    #[error("{service} returned a fault: {reason}")]
    Fault { service: &'static str, reason: String },

    #[error("{service} answered with HTTP {status}")]
    HttpStatus { service: &'static str, status: u16 },

    #[error("{service} returned an unparseable response: {reason}")]
    Malformed { service: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Terminal outcome of a failed self-description request.
///
/// The display text is what lands in the export's `Error` column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    #[error("Request timeout: device unreachable")]
    Unreachable,

    #[error("Connection error: web access disabled on device")]
    WebAccessDisabled,

    #[error("Request error: request not understood or malformed response")]
    Malformed { detail: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("chunk size {size} must be between 1 and {} (status service caps results at {cap})", cap - 1)]
    ChunkSize { size: usize, cap: usize },

    #[error("at least one enrichment worker is required")]
    Workers,

    #[error("device timeout must be greater than zero")]
    Timeout,

    #[error("no restricted models configured")]
    NoModels,

    #[error("device info path must start with '/': {0}")]
    DevicePath(String),
}
