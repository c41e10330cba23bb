//! Result aggregation: the export table and the run summary.

use std::io;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use hwrev_common::device::{DeviceRecord, Enrichment, Inventory, StatusLookup};
use thiserror::Error;

pub const COLUMNS: [&str; 11] = [
    "Name",
    "Model",
    "Description",
    "Status",
    "ActiveLoadID",
    "InactiveLoadID",
    "IPAddress",
    "SerialNumber",
    "ModelNumber",
    "HardwareRevision",
    "Error",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Io(#[from] io::Error),
}

/// Renders a record in [`COLUMNS`] order. Anything unset becomes an empty field.
pub fn row(record: &DeviceRecord) -> [String; 11] {
    let registration = record.registration();
    let udi = record.udi();
    let text = |value: Option<&String>| value.cloned().unwrap_or_default();

    [
        record.name().to_string(),
        record.model.clone(),
        record.description.clone(),
        text(registration.map(|r| &r.status)),
        text(registration.map(|r| &r.active_load_id)),
        text(registration.map(|r| &r.inactive_load_id)),
        record
            .ip_address()
            .map(|ip| ip.to_string())
            .unwrap_or_default(),
        text(udi.map(|u| &u.serial_number)),
        text(udi.map(|u| &u.model_number)),
        text(udi.map(|u| &u.hardware_revision)),
        record.error().map(|e| e.to_string()).unwrap_or_default(),
    ]
}

/// Writes the header and one fully quoted row per record, in inventory order.
pub fn write_csv<W: io::Write>(writer: W, inventory: &Inventory) -> Result<usize, ExportError> {
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(COLUMNS)?;
    for record in inventory.iter() {
        csv.write_record(row(record))?;
    }
    csv.flush()?;
    Ok(inventory.len())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Device count per restricted model, in configured order.
    pub per_model: Vec<(String, usize)>,
    /// Records with a hardware revision.
    pub discovered: usize,
    /// Records whose self-description request failed.
    pub errors: usize,
    /// Fetched but unreadable self-descriptions.
    pub unrecognized: usize,
    /// Records whose status batch failed.
    pub status_unknown: usize,
    /// Records the status service had nothing on.
    pub not_reported: usize,
}

impl Summary {
    pub fn new(inventory: &Inventory, restricted_models: &[String]) -> Self {
        let mut summary = Summary {
            total: inventory.len(),
            per_model: restricted_models
                .iter()
                .map(|model| (model.clone(), 0))
                .collect(),
            ..Summary::default()
        };

        for record in inventory.iter() {
            if let Some((_, count)) = summary
                .per_model
                .iter_mut()
                .find(|(model, _)| *model == record.model)
            {
                *count += 1;
            }

            match &record.enrichment {
                Enrichment::Identified(udi) if !udi.hardware_revision.is_empty() => {
                    summary.discovered += 1
                }
                Enrichment::Unrecognized => summary.unrecognized += 1,
                Enrichment::Failed(_) => summary.errors += 1,
                _ => {}
            }

            match record.status {
                StatusLookup::BatchFailed => summary.status_unknown += 1,
                StatusLookup::NotReported => summary.not_reported += 1,
                _ => {}
            }
        }

        summary
    }
}
