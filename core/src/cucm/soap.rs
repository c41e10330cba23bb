use std::borrow::Cow;

use hwrev_common::error::ServiceError;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::Credentials;
use crate::xml::{self, XmlError};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub(crate) struct SoapEndpoint {
    http: reqwest::Client,
    url: String,
    credentials: Credentials,
    service: &'static str,
}

impl SoapEndpoint {
    pub(crate) fn new(
        http: reqwest::Client,
        url: String,
        credentials: Credentials,
        service: &'static str,
    ) -> Self {
        Self {
            http,
            url,
            credentials,
            service,
        }
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// Posts `body` inside an envelope declaring `namespace` under `prefix` and returns the raw
    /// response document. SOAP faults become [`ServiceError::Fault`] whatever the HTTP status.
    pub(crate) async fn call(
        &self,
        action: &str,
        prefix: &str,
        namespace: &str,
        body: &str,
    ) -> Result<String, ServiceError> {
        debug!(service = self.service, url = %self.url, action, "soap request");

        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", action)
            .body(envelope(prefix, namespace, body))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.unreachable(e))?;

        if let Ok(Some(reason)) = xml::first_text(&text, "faultstring") {
            return Err(ServiceError::Fault {
                service: self.service,
                reason,
            });
        }
        if !status.is_success() {
            return Err(ServiceError::HttpStatus {
                service: self.service,
                status: status.as_u16(),
            });
        }
        Ok(text)
    }

    pub(crate) fn malformed(&self, err: XmlError) -> ServiceError {
        ServiceError::Malformed {
            service: self.service,
            reason: err.to_string(),
        }
    }

    fn unreachable(&self, err: reqwest::Error) -> ServiceError {
        ServiceError::Unreachable {
            service: self.service,
            reason: err.to_string(),
        }
    }
}

pub(crate) fn envelope(prefix: &str, namespace: &str, body: &str) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="{env}" xmlns:{prefix}="{ns}">"#,
            "<soapenv:Header/><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"
        ),
        env = SOAP_ENV_NS,
        prefix = prefix,
        ns = namespace,
        body = body,
    )
}

pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}
