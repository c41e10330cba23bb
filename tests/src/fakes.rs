use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Mutex;

use async_trait::async_trait;
use hwrev_common::device::{AddressFamily, DeviceAddress, DeviceStatus, DirectoryEntry, REGISTERED};
use hwrev_common::error::{EnrichmentError, ServiceError};
use hwrev_common::services::{DeviceInfoSource, DirectoryService, StatusService};

pub fn entry(name: &str, model: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.to_string(),
        model: model.to_string(),
        description: format!("{name} desk phone"),
    }
}

pub fn registered(name: &str, ip: Ipv4Addr) -> DeviceStatus {
    DeviceStatus {
        name: name.to_string(),
        status: REGISTERED.to_string(),
        active_load_id: "sip78xx.14-2-1-0001-14".to_string(),
        inactive_load_id: "sip78xx.12-8-1-0001-455".to_string(),
        addresses: vec![DeviceAddress::new(ip.to_string(), AddressFamily::Ipv4)],
    }
}

pub fn unregistered(name: &str) -> DeviceStatus {
    DeviceStatus {
        name: name.to_string(),
        status: "UnRegistered".to_string(),
        ..DeviceStatus::default()
    }
}

/// A self-description page carrying `udi` the way the phones format it.
pub fn info_page(udi: &str) -> String {
    format!(
        "<?xml version=\"1.0\" ?><DeviceInformation><HostName>SEP</HostName>\
         <udi>{udi}</udi><versionID>14.2</versionID></DeviceInformation>"
    )
}

pub struct FakeDirectory {
    entries: Vec<DirectoryEntry>,
    fail: bool,
}

impl FakeDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries, fail: false }
    }

    pub fn down() -> Self {
        Self {
            entries: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list_devices(&self, _pattern: &str) -> Result<Vec<DirectoryEntry>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Unreachable {
                service: "AXL directory",
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.entries.clone())
    }
}

/// Answers from a fixed table and fails the batch indexes it is told to.
pub struct FakeStatus {
    known: HashMap<String, DeviceStatus>,
    failing: HashSet<usize>,
    seen: Mutex<Vec<usize>>,
}

impl FakeStatus {
    pub fn new(known: impl IntoIterator<Item = DeviceStatus>) -> Self {
        Self {
            known: known.into_iter().map(|s| (s.name.clone(), s)).collect(),
            failing: HashSet::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, batches: impl IntoIterator<Item = usize>) -> Self {
        self.failing.extend(batches);
        self
    }

    /// Sizes of the batches requested so far, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusService for FakeStatus {
    async fn select_devices(&self, names: &[String]) -> Result<Vec<DeviceStatus>, ServiceError> {
        let index = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(names.len());
            seen.len() - 1
        };
        if self.failing.contains(&index) {
            return Err(ServiceError::HttpStatus {
                service: "RIS status",
                status: 503,
            });
        }
        Ok(names
            .iter()
            .filter_map(|name| self.known.get(name).cloned())
            .collect())
    }
}

#[derive(Clone)]
pub enum Answer {
    Page(String),
    Error(EnrichmentError),
    Silent,
}

pub struct FakeDevices {
    answers: HashMap<Ipv4Addr, Answer>,
}

impl FakeDevices {
    pub fn new(answers: impl IntoIterator<Item = (Ipv4Addr, Answer)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DeviceInfoSource for FakeDevices {
    async fn fetch(&self, ip: Ipv4Addr) -> Result<String, EnrichmentError> {
        match self.answers.get(&ip) {
            Some(Answer::Page(body)) => Ok(body.clone()),
            Some(Answer::Error(err)) => Err(err.clone()),
            Some(Answer::Silent) => std::future::pending().await,
            None => Err(EnrichmentError::WebAccessDisabled),
        }
    }
}
