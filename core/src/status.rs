//! Chunked status resolver: the second pipeline stage.
//!
//! The status service silently truncates answers past its result cap, so names go out in
//! bounded batches, one request at a time, in catalog order.

use std::collections::HashSet;

use hwrev_common::device::{DeviceStatus, Inventory, StatusLookup};
use hwrev_common::services::StatusService;
use tracing::{debug, info, warn};

use crate::discovery::{DiscoveryError, DiscoveryObserver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub size: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Resolved {
        index: usize,
        total: usize,
        requested: usize,
        found: usize,
    },
    Failed {
        index: usize,
        total: usize,
        requested: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub batches: usize,
    pub failed: Vec<BatchFailure>,
    /// Devices the service reported on.
    pub reported: usize,
    /// Devices in successful batches that the service did not mention.
    pub not_reported: usize,
}

/// Splits `names` into consecutive batches of at most `size` names.
///
/// # Panics
/// Panics if `size` is zero.
pub fn chunk_names(names: &[String], size: usize) -> Vec<&[String]> {
    assert!(size > 0, "chunk size must be positive");
    names.chunks(size).collect()
}

/// Queries the status service batch by batch and merges the answers into `inventory`.
///
/// A failed batch marks its devices [`StatusLookup::BatchFailed`] and the run moves on. Only when
/// every batch fails is the stage considered failed as a whole.
pub async fn resolve_status(
    service: &dyn StatusService,
    inventory: &mut Inventory,
    chunk_size: usize,
    observer: &dyn DiscoveryObserver,
) -> Result<StatusReport, DiscoveryError> {
    let names = inventory.names();
    let batches = chunk_names(&names, chunk_size);
    let total = batches.len();

    let mut report = StatusReport {
        batches: total,
        ..StatusReport::default()
    };
    let mut last_error = None;

    for (index, batch) in batches.into_iter().enumerate() {
        observer.batch_started(index, total, batch.len());

        let outcome = match service.select_devices(batch).await {
            Ok(devices) => {
                let found = merge_batch(inventory, batch, &devices);
                report.reported += found;
                report.not_reported += batch.len() - found;
                info!(
                    batch = index + 1,
                    of = total,
                    requested = batch.len(),
                    found,
                    "status batch resolved"
                );
                BatchOutcome::Resolved {
                    index,
                    total,
                    requested: batch.len(),
                    found,
                }
            }
            Err(err) => {
                warn!(batch = index + 1, of = total, error = %err, "status batch failed");
                for name in batch {
                    if let Some(record) = inventory.get_mut(name) {
                        record.status = StatusLookup::BatchFailed;
                    }
                }
                report.failed.push(BatchFailure {
                    index,
                    size: batch.len(),
                    reason: err.to_string(),
                });
                last_error = Some(err);
                BatchOutcome::Failed {
                    index,
                    total,
                    requested: batch.len(),
                }
            }
        };

        observer.batch_finished(&outcome);
    }

    if let Some(last) = last_error {
        if report.failed.len() == total {
            return Err(DiscoveryError::NoStatusPass {
                batches: total,
                last,
            });
        }
    }

    Ok(report)
}

/// Applies one batch answer and returns how many of the batch's devices were reported.
fn merge_batch(inventory: &mut Inventory, batch: &[String], devices: &[DeviceStatus]) -> usize {
    let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();

    for device in devices {
        if !requested.contains(device.name.as_str()) {
            debug!(name = %device.name, "ignoring status for a device outside the batch");
            continue;
        }
        if let Some(record) = inventory.get_mut(&device.name) {
            record.apply_status(device);
        }
    }

    let mut found = 0;
    for name in batch {
        if let Some(record) = inventory.get_mut(name) {
            match record.status {
                StatusLookup::Reported(_) => found += 1,
                _ => record.status = StatusLookup::NotReported,
            }
        }
    }
    found
}
