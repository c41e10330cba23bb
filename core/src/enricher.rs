//! Device enricher: the third pipeline stage.
//!
//! Every device with a resolved IPv4 address is asked for its self-description document. The
//! requests are independent network round trips, so they run on a bounded pool: a semaphore caps
//! the number in flight, each worker owns a copy of one record, and finished records come back
//! over a channel that the caller drains and merges as they arrive.

use std::sync::Arc;
use std::time::Duration;

use hwrev_common::device::{DeviceRecord, Enrichment, Inventory};
use hwrev_common::error::EnrichmentError;
use hwrev_common::services::DeviceInfoSource;
use tokio::sync::{Semaphore, mpsc};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::discovery::DiscoveryObserver;

pub mod device_info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub candidates: usize,
    pub identified: usize,
    pub unrecognized: usize,
    pub failed: usize,
}

pub struct Enricher {
    source: Arc<dyn DeviceInfoSource>,
    workers: usize,
    timeout: Duration,
}

impl Enricher {
    pub fn new(source: Arc<dyn DeviceInfoSource>, workers: usize, timeout: Duration) -> Self {
        Self {
            source,
            workers: workers.max(1),
            timeout,
        }
    }

    pub async fn run(
        &self,
        inventory: &mut Inventory,
        observer: &dyn DiscoveryObserver,
    ) -> EnrichmentReport {
        let jobs: Vec<DeviceRecord> = inventory
            .iter()
            .filter(|record| record.ip_address().is_some())
            .cloned()
            .collect();
        let total = jobs.len();
        let mut report = EnrichmentReport {
            candidates: total,
            ..EnrichmentReport::default()
        };

        observer.enrichment_started(total);
        if total == 0 {
            return report;
        }
        info!(candidates = total, workers = self.workers, "enriching devices");

        let (result_tx, mut result_rx) = mpsc::channel::<DeviceRecord>(self.workers);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let source = Arc::clone(&self.source);
        let limit = self.timeout;

        let dispatcher = tokio::spawn(async move {
            for record in jobs {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                let source = Arc::clone(&source);
                let tx = result_tx.clone();
                tokio::spawn(async move {
                    let updated = enrich_device(source.as_ref(), record, limit).await;
                    drop(permit);
                    let _ = tx.send(updated).await;
                });
            }
        });

        let mut done = 0;
        while let Some(record) = result_rx.recv().await {
            done += 1;
            match record.enrichment {
                Enrichment::Identified(_) => report.identified += 1,
                Enrichment::Unrecognized => report.unrecognized += 1,
                Enrichment::Failed(_) => report.failed += 1,
                Enrichment::NotAttempted => {}
            }
            observer.device_enriched(done, total, &record);
            inventory.replace(record);
        }

        if let Err(err) = dispatcher.await {
            warn!(error = %err, "enrichment dispatcher stopped early");
        }
        if done < total {
            warn!(missing = total - done, "some devices never reported back");
        }

        info!(
            identified = report.identified,
            unrecognized = report.unrecognized,
            failed = report.failed,
            "enrichment finished"
        );
        report
    }
}

/// Fetches and reads one device's self-description, returning the updated record.
///
/// Records without an IPv4 address come back untouched. Failures are captured in the record,
/// never returned.
pub async fn enrich_device(
    source: &dyn DeviceInfoSource,
    mut record: DeviceRecord,
    limit: Duration,
) -> DeviceRecord {
    let Some(ip) = record.ip_address() else {
        return record;
    };

    record.enrichment = match timeout(limit, source.fetch(ip)).await {
        Err(_elapsed) => Enrichment::Failed(EnrichmentError::Unreachable),
        Ok(Err(err)) => Enrichment::Failed(err),
        Ok(Ok(body)) => device_info::read_identity(&body),
    };

    match &record.enrichment {
        Enrichment::Identified(udi) => debug!(
            name = record.name(),
            %ip,
            revision = %udi.hardware_revision,
            "device identified"
        ),
        Enrichment::Unrecognized => debug!(name = record.name(), %ip, "no identifier in response"),
        Enrichment::Failed(EnrichmentError::Malformed { detail }) => {
            debug!(name = record.name(), %ip, %detail, "malformed response")
        }
        Enrichment::Failed(err) => debug!(name = record.name(), %ip, error = %err, "request failed"),
        Enrichment::NotAttempted => {}
    }

    record
}
