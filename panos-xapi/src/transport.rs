use std::fmt;
use std::net::IpAddr;

use log::debug;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// One request to the XML API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Operational command, already in XML form.
    Op { cmd: String },
    /// Replace the candidate configuration element at `xpath`.
    EditConfig { xpath: String, element: String },
}

impl ApiRequest {
    /// Form fields for this request, excluding the credential.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            ApiRequest::Op { cmd } => vec![("type", "op"), ("cmd", cmd.as_str())],
            ApiRequest::EditConfig { xpath, element } => vec![
                ("type", "config"),
                ("action", "edit"),
                ("xpath", xpath.as_str()),
                ("element", element.as_str()),
            ],
        }
    }
}

/// Sends API requests and returns the raw response document.
///
/// Implementations only move bytes; status checking and parsing belong to
/// [`crate::Firewall`].
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<String, ApiError>;
}

/// HTTPS transport to `https://<host>/api/`.
pub struct HttpTransport {
    client: Client,
    url: String,
    api_key: SecretString,
}

/// Options for [`HttpTransport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOptions {
    /// Verify the device certificate. Appliances usually ship self-signed
    /// certificates, so this is off unless asked for.
    pub verify_tls: bool,
}

impl HttpTransport {
    pub fn new(host: IpAddr, api_key: SecretString, options: HttpOptions) -> Result<Self, ApiError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!options.verify_tls)
            // Device calls run to completion; installs can take many minutes.
            .timeout(None)
            .build()?;

        Ok(Self {
            client,
            url: api_url(host),
            api_key,
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
        debug!("POST {} {:?}", self.url, request);

        let response = self
            .client
            .post(&self.url)
            .header("X-PAN-KEY", self.api_key.expose_secret())
            .form(&request.form_fields())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// API endpoint for a device address; IPv6 literals are bracketed.
pub fn api_url(host: IpAddr) -> String {
    match host {
        IpAddr::V4(v4) => format!("https://{v4}/api/"),
        IpAddr::V6(v6) => format!("https://[{v6}]/api/"),
    }
}
