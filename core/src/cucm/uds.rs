//! Cluster version lookup over UDS.

use hwrev_common::error::ServiceError;
use tracing::debug;

use crate::xml;

const SERVICE: &str = "UDS version";

/// Fetches the full cluster version string (e.g. `14.0.1.12900-161`).
pub async fn fetch_version(http: &reqwest::Client, base_url: &str) -> Result<String, ServiceError> {
    let url = format!("{base_url}/cucm-uds/version");
    debug!(%url, "querying cluster version");

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| ServiceError::Unreachable {
            service: SERVICE,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::HttpStatus {
            service: SERVICE,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| ServiceError::Unreachable {
        service: SERVICE,
        reason: e.to_string(),
    })?;

    parse_version(&body)
}

fn parse_version(body: &str) -> Result<String, ServiceError> {
    let malformed = |reason: String| ServiceError::Malformed {
        service: SERVICE,
        reason,
    };
    xml::first_text(body, "version")
        .map_err(|e| malformed(e.to_string()))?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| malformed("no version element".to_string()))
}

/// Reduces a full version to the `major.minor` form the AXL schema is published under.
pub fn major_version(full: &str) -> Option<String> {
    let mut parts = full.trim().split('.');
    let major = parts.next().filter(|p| is_number(p))?;
    let minor = parts
        .next()
        .map(|p| p.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(""))
        .filter(|p| is_number(p))?;
    Some(format!("{major}.{minor}"))
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
}
