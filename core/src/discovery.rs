//! # Hardware Revision Discovery Service
//!
//! Runs the correlation pipeline end to end:
//! 1. **Catalog**: list devices from the directory and keep the restricted models.
//! 2. **Status**: resolve registration state and addresses in bounded batches.
//! 3. **Enrichment**: ask each reachable device for its hardware identity.
//!
//! The service owns the [`Inventory`] for the whole run. Stages borrow it one after another and
//! the concurrent enrichment stage merges worker results back from this single owner.

use std::sync::Arc;

use hwrev_common::config::Config;
use hwrev_common::device::{DeviceRecord, Inventory};
use hwrev_common::error::{ConfigError, ServiceError};
use hwrev_common::services::{DeviceInfoSource, DirectoryService, StatusService};
use thiserror::Error;

use crate::catalog;
use crate::enricher::{Enricher, EnrichmentReport};
use crate::status::{self, BatchOutcome, StatusReport};

/// Failures that abort a run. Per-device problems never end up here.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("directory lookup failed: {0}")]
    Directory(#[source] ServiceError),

    #[error("all {batches} status batches failed: {last}")]
    NoStatusPass {
        batches: usize,
        #[source]
        last: ServiceError,
    },
}

/// Receives progress as the pipeline moves along. Every method defaults to doing nothing.
pub trait DiscoveryObserver: Send + Sync {
    fn catalog_loaded(&self, _devices: usize) {}
    fn batch_started(&self, _index: usize, _total: usize, _size: usize) {}
    fn batch_finished(&self, _outcome: &BatchOutcome) {}
    fn enrichment_started(&self, _candidates: usize) {}
    /// Called once per finished device, in completion order.
    fn device_enriched(&self, _done: usize, _total: usize, _record: &DeviceRecord) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl DiscoveryObserver for Silent {}

#[derive(Debug)]
pub struct Discovery {
    pub inventory: Inventory,
    pub status: StatusReport,
    pub enrichment: EnrichmentReport,
}

pub struct DiscoveryService {
    directory: Box<dyn DirectoryService>,
    status: Box<dyn StatusService>,
    device_info: Arc<dyn DeviceInfoSource>,
    cfg: Config,
}

impl DiscoveryService {
    pub fn new(
        directory: Box<dyn DirectoryService>,
        status: Box<dyn StatusService>,
        device_info: Arc<dyn DeviceInfoSource>,
        cfg: Config,
    ) -> Result<Self, DiscoveryError> {
        cfg.validate()?;
        Ok(Self {
            directory,
            status,
            device_info,
            cfg,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub async fn perform_discovery(
        &self,
        observer: &dyn DiscoveryObserver,
    ) -> Result<Discovery, DiscoveryError> {
        let mut inventory = catalog::load_catalog(self.directory.as_ref(), &self.cfg).await?;
        observer.catalog_loaded(inventory.len());

        let status = status::resolve_status(
            self.status.as_ref(),
            &mut inventory,
            self.cfg.chunk_size,
            observer,
        )
        .await?;

        let enricher = Enricher::new(
            Arc::clone(&self.device_info),
            self.cfg.workers,
            self.cfg.device_timeout,
        );
        let enrichment = enricher.run(&mut inventory, observer).await;

        Ok(Discovery {
            inventory,
            status,
            enrichment,
        })
    }
}
