//! # Outbound Services
//!
//! Contracts for the external capabilities the pipeline consumes. The core depends only on these
//! traits; concrete clients live in `hwrev-core` and tests substitute in-memory versions.

use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::device::{DeviceStatus, DirectoryEntry};
use crate::error::{EnrichmentError, ServiceError};

/// Authoritative registry of provisioned devices.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Lists every device whose name matches `pattern` (`%` acts as the wildcard).
    async fn list_devices(&self, pattern: &str) -> Result<Vec<DirectoryEntry>, ServiceError>;
}

/// Real-time registration status, queried by explicit device names.
#[async_trait]
pub trait StatusService: Send + Sync {
    /// Returns whatever the service knows about `names`. Devices may be missing from the answer
    /// and may appear more than once (one entry per cluster node).
    async fn select_devices(&self, names: &[String]) -> Result<Vec<DeviceStatus>, ServiceError>;
}

/// Per-device self-description endpoint.
#[async_trait]
pub trait DeviceInfoSource: Send + Sync {
    /// Fetches the raw self-description document from the device at `ip`.
    async fn fetch(&self, ip: Ipv4Addr) -> Result<String, EnrichmentError>;
}
