use std::net::Ipv4Addr;

use crate::device::Udi;
use crate::error::EnrichmentError;

/// Status string the status service uses for a registered device.
pub const REGISTERED: &str = "Registered";

/// One device as listed by the directory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub model: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    Other(String),
}

impl AddressFamily {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            _ => Self::Other(tag.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub ip: String,
    pub family: AddressFamily,
}

impl DeviceAddress {
    pub fn new(ip: impl Into<String>, family: AddressFamily) -> Self {
        Self {
            ip: ip.into(),
            family,
        }
    }
}

/// One device as reported by the real-time status service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    pub name: String,
    pub status: String,
    pub active_load_id: String,
    pub inactive_load_id: String,
    pub addresses: Vec<DeviceAddress>,
}

/// Picks the first address tagged IPv4 whose text actually parses as one.
pub fn first_ipv4(addresses: &[DeviceAddress]) -> Option<Ipv4Addr> {
    addresses
        .iter()
        .filter(|addr| addr.family == AddressFamily::Ipv4)
        .find_map(|addr| addr.ip.trim().parse::<Ipv4Addr>().ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub status: String,
    pub active_load_id: String,
    pub inactive_load_id: String,
    pub ip_address: Option<Ipv4Addr>,
}

impl From<&DeviceStatus> for Registration {
    fn from(report: &DeviceStatus) -> Self {
        Self {
            status: report.status.clone(),
            active_load_id: report.active_load_id.clone(),
            inactive_load_id: report.inactive_load_id.clone(),
            ip_address: first_ipv4(&report.addresses),
        }
    }
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        self.status == REGISTERED
    }
}

/// Where a record stands with respect to the status service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusLookup {
    /// Not queried yet.
    #[default]
    Pending,
    Reported(Registration),
    /// The batch succeeded but the service said nothing about this device.
    NotReported,
    /// The batch carrying this device failed; status is unknown.
    BatchFailed,
}

/// Outcome of the self-description request for a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Enrichment {
    /// No IPv4 address was resolved, so no request was made.
    #[default]
    NotAttempted,
    Identified(Udi),
    /// The document was fetched but no identifier could be read from it.
    Unrecognized,
    Failed(EnrichmentError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    name: String,
    pub model: String,
    pub description: String,
    pub status: StatusLookup,
    pub enrichment: Enrichment,
}

impl From<DirectoryEntry> for DeviceRecord {
    fn from(entry: DirectoryEntry) -> Self {
        Self {
            name: entry.name,
            model: entry.model,
            description: entry.description,
            status: StatusLookup::Pending,
            enrichment: Enrichment::NotAttempted,
        }
    }
}

impl DeviceRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration(&self) -> Option<&Registration> {
        match &self.status {
            StatusLookup::Reported(registration) => Some(registration),
            _ => None,
        }
    }

    pub fn ip_address(&self) -> Option<Ipv4Addr> {
        self.registration().and_then(|reg| reg.ip_address)
    }

    pub fn udi(&self) -> Option<&Udi> {
        match &self.enrichment {
            Enrichment::Identified(udi) => Some(udi),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EnrichmentError> {
        match &self.enrichment {
            Enrichment::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Merges a status report into the record.
    ///
    /// A device registered to one node shows up as unregistered on the others, so a
    /// registered report is never overwritten by a later non-registered one.
    pub fn apply_status(&mut self, report: &DeviceStatus) {
        let incoming = Registration::from(report);
        if let StatusLookup::Reported(current) = &self.status {
            if current.is_registered() && !incoming.is_registered() {
                return;
            }
        }
        self.status = StatusLookup::Reported(incoming);
    }
}
