//! Directory catalog reader: the first pipeline stage.

use hwrev_common::config::Config;
use hwrev_common::device::{DeviceRecord, Inventory};
use hwrev_common::services::DirectoryService;
use tracing::{debug, info};

use crate::discovery::DiscoveryError;

/// Lists devices matching the configured name pattern and keeps the restricted models.
///
/// Directory names are unique, so no deduplication happens here. Should the service ever repeat
/// a name, the later entry replaces the earlier one.
pub async fn load_catalog(
    directory: &dyn DirectoryService,
    cfg: &Config,
) -> Result<Inventory, DiscoveryError> {
    let entries = directory
        .list_devices(&cfg.name_pattern)
        .await
        .map_err(DiscoveryError::Directory)?;

    let listed = entries.len();
    let inventory: Inventory = entries
        .into_iter()
        .filter(|entry| cfg.is_restricted(&entry.model))
        .inspect(|entry| debug!(name = %entry.name, model = %entry.model, "catalogued"))
        .map(DeviceRecord::from)
        .collect();

    info!(
        listed,
        restricted = inventory.len(),
        pattern = %cfg.name_pattern,
        "directory catalog loaded"
    );
    Ok(inventory)
}
