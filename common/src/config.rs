use std::time::Duration;

use crate::error::ConfigError;

/// Hard ceiling on devices returned by one status query. Anything beyond it is silently dropped
/// by the service, so batches must stay strictly below it.
pub const STATUS_RESULT_CAP: usize = 1000;

pub const DEFAULT_NAME_PATTERN: &str = "SEP%";
pub const DEFAULT_CHUNK_SIZE: usize = 900;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DEVICE_PORT: u16 = 80;
pub const DEFAULT_DEVICE_INFO_PATH: &str = "/DeviceInformationX";

/// Hardware models restricted from the firmware migration by hardware revision.
pub const DEFAULT_RESTRICTED_MODELS: &[&str] = &["Cisco 7821", "Cisco 7841", "Cisco 7861"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory search pattern matched against device names (`%` is the wildcard).
    pub name_pattern: String,
    /// Models kept from the directory catalog. Matched exactly.
    pub restricted_models: Vec<String>,
    /// Maximum number of device names per status query.
    pub chunk_size: usize,
    /// Number of self-description requests allowed in flight at once.
    pub workers: usize,
    /// Upper bound on a single self-description request, connect included.
    pub device_timeout: Duration,
    pub device_port: u16,
    pub device_info_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            restricted_models: DEFAULT_RESTRICTED_MODELS
                .iter()
                .map(|model| model.to_string())
                .collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
            device_timeout: DEFAULT_DEVICE_TIMEOUT,
            device_port: DEFAULT_DEVICE_PORT,
            device_info_path: DEFAULT_DEVICE_INFO_PATH.to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_size >= STATUS_RESULT_CAP {
            return Err(ConfigError::ChunkSize {
                size: self.chunk_size,
                cap: STATUS_RESULT_CAP,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::Workers);
        }
        if self.device_timeout.is_zero() {
            return Err(ConfigError::Timeout);
        }
        if self.restricted_models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        if !self.device_info_path.starts_with('/') {
            return Err(ConfigError::DevicePath(self.device_info_path.clone()));
        }
        Ok(())
    }

    pub fn is_restricted(&self, model: &str) -> bool {
        self.restricted_models.iter().any(|m| m == model)
    }
}
