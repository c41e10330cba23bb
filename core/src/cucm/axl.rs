//! Directory listing over AXL (`listPhone`).

use async_trait::async_trait;
use hwrev_common::device::DirectoryEntry;
use hwrev_common::error::ServiceError;
use hwrev_common::services::DirectoryService;
use tracing::debug;

use super::Credentials;
use super::soap::{self, SoapEndpoint};
use crate::xml::{self, Node, XmlError};

const SERVICE: &str = "AXL directory";
const AXL_NS_BASE: &str = "http://www.cisco.com/AXL/API";

pub struct AxlDirectory {
    endpoint: SoapEndpoint,
    version: String,
}

impl AxlDirectory {
    pub fn new(
        http: reqwest::Client,
        url: String,
        credentials: Credentials,
        version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: SoapEndpoint::new(http, url, credentials, SERVICE),
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

#[async_trait]
impl DirectoryService for AxlDirectory {
    async fn list_devices(&self, pattern: &str) -> Result<Vec<DirectoryEntry>, ServiceError> {
        let action = format!("CUCM:DB ver={} listPhone", self.version);
        let namespace = format!("{AXL_NS_BASE}/{}", self.version);
        let response = self
            .endpoint
            .call(&action, "ns", &namespace, &list_phone_body(pattern))
            .await?;

        let entries = parse_list_phone(&response).map_err(|e| self.endpoint.malformed(e))?;
        debug!(
            service = self.endpoint.service(),
            count = entries.len(),
            "phones listed"
        );
        Ok(entries)
    }
}

fn list_phone_body(pattern: &str) -> String {
    format!(
        concat!(
            "<ns:listPhone>",
            "<searchCriteria><name>{}</name></searchCriteria>",
            "<returnedTags><name/><model/><description/></returnedTags>",
            "</ns:listPhone>"
        ),
        soap::escape(pattern)
    )
}

/// Pulls `name`, `model` and `description` out of every `return/phone` element.
pub(crate) fn parse_list_phone(xml: &str) -> Result<Vec<DirectoryEntry>, XmlError> {
    const PHONE: [&str; 2] = ["return", "phone"];

    let mut entries = Vec::new();
    let mut current: Option<DirectoryEntry> = None;

    xml::walk(xml, |node| match node {
        Node::Open(path) if xml::ends_with(path, &PHONE) => {
            current = Some(DirectoryEntry {
                name: String::new(),
                model: String::new(),
                description: String::new(),
            });
        }
        Node::Text(path, text) if path.len() > 1 && xml::ends_with(&path[..path.len() - 1], &PHONE) => {
            if let Some(entry) = current.as_mut() {
                match path[path.len() - 1].as_str() {
                    "name" => entry.name = text.to_string(),
                    "model" => entry.model = text.to_string(),
                    "description" => entry.description = text.to_string(),
                    _ => {}
                }
            }
        }
        Node::Close(path) if xml::ends_with(path, &PHONE) => {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
        }
        _ => {}
    })?;

    Ok(entries)
}
