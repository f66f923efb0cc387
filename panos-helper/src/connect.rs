//! Address and credential prompts, and opening the firewall session.

use std::io::{BufRead, Write};
use std::net::IpAddr;

use log::warn;
use panos_xapi::{ApiError, Firewall, HttpOptions};
use secrecy::SecretString;

use crate::console::{Console, ConsoleError};
use crate::report::{failure, progress, success, warning};

/// Opens a firewall session from an address and API key.
pub trait Connector {
    fn connect(&self, host: IpAddr, api_key: SecretString) -> Result<Firewall, ApiError>;
}

/// Connects over HTTPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector {
    pub options: HttpOptions,
}

impl Connector for HttpConnector {
    fn connect(&self, host: IpAddr, api_key: SecretString) -> Result<Firewall, ApiError> {
        Firewall::connect(host, api_key, self.options)
    }
}

impl<F> Connector for F
where
    F: Fn(IpAddr, SecretString) -> Result<Firewall, ApiError>,
{
    fn connect(&self, host: IpAddr, api_key: SecretString) -> Result<Firewall, ApiError> {
        self(host, api_key)
    }
}

/// Prompt until the operator enters an IPv4 or IPv6 literal.
pub fn prompt_address<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
) -> Result<IpAddr, ConsoleError> {
    loop {
        let raw = console.prompt("\nEnter firewall IP: ")?;
        match raw.trim().parse::<IpAddr>() {
            Ok(host) => return Ok(host),
            Err(_) => console.line(warning("Invalid IP format"))?,
        }
    }
}

/// Prompt until the operator enters a non-blank API key.
pub fn prompt_api_key<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
) -> Result<SecretString, ConsoleError> {
    loop {
        let raw = console.prompt("Enter API Key: ")?;
        let key = raw.trim();
        if key.is_empty() {
            console.line(warning("API key cannot be empty"))?;
            continue;
        }
        return Ok(SecretString::from(key.to_string()));
    }
}

/// Collect the address and key, then open the session.
///
/// `Ok(None)` means the connection attempt failed and was reported; it is
/// not retried.
pub fn connect_to_firewall<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    connector: &dyn Connector,
) -> Result<Option<Firewall>, ConsoleError> {
    let host = prompt_address(console)?;
    let api_key = prompt_api_key(console)?;

    console.blank()?;
    console.line(success(format!("Valid IP format - {host}")))?;
    console.line(success("API key is not empty"))?;
    console.blank()?;
    console.line(progress("Establishing connection to firewall"))?;

    match connector.connect(host, api_key) {
        Ok(firewall) => {
            console.line(success("Connected successfully"))?;
            console.line(format!("Firewall serial: {}", firewall.serial()))?;
            Ok(Some(firewall))
        }
        Err(err) => {
            warn!("connection to {host} failed: {err}");
            console.line(failure(format!("Failed to connect to firewall: {err}")))?;
            Ok(None)
        }
    }
}
