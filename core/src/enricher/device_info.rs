//! HTTP client for the phone's self-description page and the reader for its document.

use std::io;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use hwrev_common::config::Config;
use hwrev_common::device::{Enrichment, Udi};
use hwrev_common::error::{EnrichmentError, ServiceError};
use hwrev_common::services::DeviceInfoSource;

use crate::xml;

const UDI_ELEMENT: &str = "udi";

pub struct HttpDeviceInfo {
    http: reqwest::Client,
    port: u16,
    path: String,
}

impl HttpDeviceInfo {
    /// The overall request deadline is enforced by the enricher, not by the client.
    pub fn new(port: u16, path: impl Into<String>) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        Ok(Self {
            http,
            port,
            path: path.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ServiceError> {
        Self::new(cfg.device_port, cfg.device_info_path.clone())
    }

    fn url(&self, ip: Ipv4Addr) -> String {
        match self.port {
            80 => format!("http://{ip}{}", self.path),
            port => format!("http://{ip}:{port}{}", self.path),
        }
    }
}

#[async_trait]
impl DeviceInfoSource for HttpDeviceInfo {
    async fn fetch(&self, ip: Ipv4Addr) -> Result<String, EnrichmentError> {
        let response = self
            .http
            .get(self.url(ip))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Malformed {
                detail: format!("HTTP {status}"),
            });
        }

        response.text().await.map_err(classify)
    }
}

/// Reads the hardware identity out of a self-description document.
///
/// A document without a `udi` element, or whose identifier does not follow the expected
/// grammar, is a soft miss rather than an error.
pub fn read_identity(body: &str) -> Enrichment {
    match xml::first_text(body, UDI_ELEMENT) {
        Ok(Some(text)) => Udi::parse(&text)
            .map(Enrichment::Identified)
            .unwrap_or(Enrichment::Unrecognized),
        Ok(None) => Enrichment::Unrecognized,
        Err(err) => Enrichment::Failed(EnrichmentError::Malformed {
            detail: err.to_string(),
        }),
    }
}

fn classify(err: reqwest::Error) -> EnrichmentError {
    if err.is_timeout() {
        return EnrichmentError::Unreachable;
    }
    if let Some(kind) = io_error_kind(&err) {
        match kind {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => return EnrichmentError::WebAccessDisabled,
            io::ErrorKind::TimedOut => return EnrichmentError::Unreachable,
            _ => {}
        }
    }
    EnrichmentError::Malformed {
        detail: err.to_string(),
    }
}

fn io_error_kind(err: &(dyn std::error::Error + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = inner.source();
    }
    None
}
