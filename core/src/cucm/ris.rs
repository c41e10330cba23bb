//! Registration status over RisPort70 (`selectCmDeviceExt`).

use async_trait::async_trait;
use hwrev_common::config::STATUS_RESULT_CAP;
use hwrev_common::device::{AddressFamily, DeviceAddress, DeviceStatus};
use hwrev_common::error::ServiceError;
use hwrev_common::services::StatusService;
use tracing::{debug, warn};

use super::Credentials;
use super::soap::{self, SoapEndpoint};
use crate::xml::{self, Node, XmlError};

const SERVICE: &str = "RIS status";
const RIS_NS: &str = "http://schemas.cisco.com/ast/soap";

pub struct RisStatus {
    endpoint: SoapEndpoint,
}

impl RisStatus {
    pub fn new(http: reqwest::Client, url: String, credentials: Credentials) -> Self {
        Self {
            endpoint: SoapEndpoint::new(http, url, credentials, SERVICE),
        }
    }
}

#[async_trait]
impl StatusService for RisStatus {
    async fn select_devices(&self, names: &[String]) -> Result<Vec<DeviceStatus>, ServiceError> {
        let response = self
            .endpoint
            .call("selectCmDeviceExt", "soap", RIS_NS, &select_body(names))
            .await?;

        let devices = parse_select_response(&response).map_err(|e| self.endpoint.malformed(e))?;
        let reported = reported_total(&response);
        debug!(
            service = self.endpoint.service(),
            requested = names.len(),
            returned = devices.len(),
            reported,
            "status batch answered"
        );
        if is_truncated(reported, devices.len()) {
            warn!(
                requested = names.len(),
                returned = devices.len(),
                reported,
                cap = STATUS_RESULT_CAP,
                "status answer truncated, some devices will show as not reported"
            );
        }
        Ok(devices)
    }
}

fn select_body(names: &[String]) -> String {
    let items: String = names
        .iter()
        .map(|name| format!("<soap:item><soap:Item>{}</soap:Item></soap:item>", soap::escape(name)))
        .collect();

    format!(
        concat!(
            "<soap:selectCmDeviceExt>",
            "<soap:StateInfo></soap:StateInfo>",
            "<soap:CmSelectionCriteria>",
            "<soap:MaxReturnedDevices>{max}</soap:MaxReturnedDevices>",
            "<soap:DeviceClass>Phone</soap:DeviceClass>",
            "<soap:Model>255</soap:Model>",
            "<soap:Status>Any</soap:Status>",
            "<soap:NodeName></soap:NodeName>",
            "<soap:SelectBy>Name</soap:SelectBy>",
            "<soap:SelectItems>{items}</soap:SelectItems>",
            "<soap:Protocol>Any</soap:Protocol>",
            "<soap:DownloadStatus>Any</soap:DownloadStatus>",
            "</soap:CmSelectionCriteria>",
            "</soap:selectCmDeviceExt>"
        ),
        max = STATUS_RESULT_CAP,
        items = items,
    )
}

/// `TotalDevicesFound` as announced by the service, which counts one entry per node report.
fn reported_total(xml: &str) -> Option<usize> {
    xml::first_text(xml, "TotalDevicesFound")
        .ok()
        .flatten()
        .and_then(|total| total.trim().parse().ok())
}

fn is_truncated(reported: Option<usize>, parsed: usize) -> bool {
    reported.is_some_and(|total| total > parsed)
}

/// Collects every device under `CmNodes/item/CmDevices/item`, one entry per node report.
pub(crate) fn parse_select_response(xml: &str) -> Result<Vec<DeviceStatus>, XmlError> {
    const DEVICE: [&str; 2] = ["CmDevices", "item"];
    const ADDRESS: [&str; 4] = ["CmDevices", "item", "IPAddress", "item"];

    let mut devices = Vec::new();
    let mut device: Option<DeviceStatus> = None;
    let mut address: Option<(String, String)> = None;

    xml::walk(xml, |node| match node {
        Node::Open(path) if xml::ends_with(path, &DEVICE) => {
            device = Some(DeviceStatus::default());
        }
        Node::Open(path) if xml::ends_with(path, &ADDRESS) => {
            address = Some((String::new(), String::new()));
        }
        Node::Text(path, text) => {
            let Some((field, parent)) = path.split_last() else {
                return;
            };
            if xml::ends_with(parent, &ADDRESS) {
                if let Some((ip, family)) = address.as_mut() {
                    match field.as_str() {
                        "IP" => *ip = text.to_string(),
                        "IPAddrType" => *family = text.to_string(),
                        _ => {}
                    }
                }
            } else if xml::ends_with(parent, &DEVICE) {
                if let Some(dev) = device.as_mut() {
                    match field.as_str() {
                        "Name" => dev.name = text.to_string(),
                        "Status" => dev.status = text.to_string(),
                        "ActiveLoadID" => dev.active_load_id = text.to_string(),
                        "InactiveLoadID" => dev.inactive_load_id = text.to_string(),
                        _ => {}
                    }
                }
            }
        }
        Node::Close(path) if xml::ends_with(path, &ADDRESS) => {
            if let (Some((ip, family)), Some(dev)) = (address.take(), device.as_mut()) {
                dev.addresses
                    .push(DeviceAddress::new(ip, AddressFamily::from_tag(&family)));
            }
        }
        Node::Close(path) if xml::ends_with(path, &DEVICE) => {
            if let Some(dev) = device.take() {
                devices.push(dev);
            }
        }
        _ => {}
    })?;

    Ok(devices)
}
