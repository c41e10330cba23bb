//! # Cluster Clients
//!
//! Talks to the call-control cluster that owns the phones:
//! * [`axl`]: directory listing through the administrative SOAP API.
//! * [`ris`]: real-time registration status through the RisPort SOAP API.
//! * [`uds`]: unauthenticated version lookup, used to pick the AXL schema.
//!
//! Only HTTP basic credentials are passed along; there is no session handling.

use std::fmt;
use std::time::Duration;

use hwrev_common::error::ServiceError;

pub mod axl;
pub mod ris;
mod soap;
pub mod uds;

pub use axl::AxlDirectory;
pub use ris::RisStatus;

const SERVICE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection details for one cluster publisher.
pub struct Cluster {
    host: String,
    http: reqwest::Client,
    credentials: Credentials,
}

impl Cluster {
    /// `insecure` accepts self-signed certificates, which is how most clusters ship.
    pub fn new(host: impl Into<String>, insecure: bool) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(SERVICE_TIMEOUT)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        Ok(Self {
            host: host.into(),
            http,
            credentials: Credentials::default(),
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub async fn version(&self) -> Result<String, ServiceError> {
        uds::fetch_version(&self.http, &format!("https://{}", self.host)).await
    }

    pub fn directory(&self, axl_version: &str) -> AxlDirectory {
        AxlDirectory::new(
            self.http.clone(),
            format!("https://{}:8443/axl/", self.host),
            self.credentials.clone(),
            axl_version,
        )
    }

    pub fn status(&self) -> RisStatus {
        RisStatus::new(
            self.http.clone(),
            format!(
                "https://{}:8443/realtimeservice2/services/RISService70",
                self.host
            ),
            self.credentials.clone(),
        )
    }
}
