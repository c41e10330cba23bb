use std::time::Duration;

use crate::terminal::colors;
use colored::*;
use hwrev_common::device::{DeviceRecord, Enrichment, StatusLookup};

pub type Detail = (String, ColoredString);

pub fn record_to_details(record: &DeviceRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![("Model".to_string(), record.model.color(colors::MODEL))];

    let status = match &record.status {
        StatusLookup::Reported(registration) if registration.is_registered() => {
            registration.status.color(colors::GOOD)
        }
        StatusLookup::Reported(registration) => registration.status.color(colors::CAUTION),
        StatusLookup::NotReported => "not reported".color(colors::CAUTION),
        StatusLookup::BatchFailed => "unknown".color(colors::BAD),
        StatusLookup::Pending => "pending".dimmed(),
    };
    details.push(("Status".to_string(), status));

    if let Some(ip) = record.ip_address() {
        details.push(("IPv4".to_string(), ip.to_string().color(colors::IPV4_ADDR)));
    }

    match &record.enrichment {
        Enrichment::Identified(udi) => details.push((
            "HW rev".to_string(),
            udi.hardware_revision.color(colors::ACCENT),
        )),
        Enrichment::Unrecognized => details.push((
            "HW rev".to_string(),
            "unrecognized answer".color(colors::CAUTION),
        )),
        Enrichment::Failed(err) => {
            details.push(("Error".to_string(), err.to_string().color(colors::BAD)))
        }
        Enrichment::NotAttempted => {}
    }

    details
}

/// Colors a counter green when it is zero and `color` otherwise.
pub fn count(n: usize, color: Color) -> ColoredString {
    if n == 0 {
        n.to_string().color(colors::GOOD)
    } else {
        n.to_string().color(color).bold()
    }
}

pub fn seconds(elapsed: Duration) -> ColoredString {
    format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow()
}
