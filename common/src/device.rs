//! # Device Model
//!
//! The per-device record set shared by every pipeline stage.
//!
//! Records are created once by the catalog reader, keyed by device name, and then mutated in
//! place by later stages. The [`Inventory`] keeps directory-scan order so the export can
//! reproduce it.

mod inventory;
mod record;
mod udi;

pub use inventory::Inventory;
pub use record::{
    AddressFamily, DeviceAddress, DeviceRecord, DeviceStatus, DirectoryEntry, Enrichment,
    REGISTERED, Registration, StatusLookup, first_ipv4,
};
pub use udi::Udi;
