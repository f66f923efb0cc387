use std::fmt;
use std::net::IpAddr;

use log::{debug, info};
use secrecy::SecretString;

use crate::command::command_xml;
use crate::error::ApiError;
use crate::parser::parse_str;
use crate::transport::{ApiRequest, HttpOptions, HttpTransport, Transport};
use crate::tree::XmlNode;
use crate::writer::to_xml_string;

/// An authenticated session with one firewall.
///
/// The handle is created once and only read afterwards; every API exchange
/// takes `&self`.
pub struct Firewall {
    host: IpAddr,
    serial: String,
    transport: Box<dyn Transport>,
}

impl Firewall {
    /// Open a session over HTTPS and read the device serial.
    pub fn connect(
        host: IpAddr,
        api_key: SecretString,
        options: HttpOptions,
    ) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(host, api_key, options)?;
        Self::with_transport(host, Box::new(transport))
    }

    /// Open a session over any transport and read the device serial.
    ///
    /// Fails when the system info query fails or reports no serial.
    pub fn with_transport(host: IpAddr, transport: Box<dyn Transport>) -> Result<Self, ApiError> {
        let response = exchange(
            transport.as_ref(),
            &ApiRequest::Op {
                cmd: command_xml("show system info")?,
            },
        )?;
        let serial = response
            .get_text(&["result", "system", "serial"])
            .map(str::trim)
            .filter(|serial| !serial.is_empty())
            .ok_or(ApiError::MissingField("result/system/serial"))?
            .to_string();

        info!("connected to {host} (serial {serial})");
        Ok(Self {
            host,
            serial,
            transport,
        })
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Serial number reported by the device when the session was opened.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Run an operational command line and return the `<response>` document.
    pub fn op(&self, command: &str) -> Result<XmlNode, ApiError> {
        debug!("op: {command}");
        self.request(&ApiRequest::Op {
            cmd: command_xml(command)?,
        })
    }

    /// Replace the configuration element at `xpath`.
    pub fn edit_config(&self, xpath: &str, element: &XmlNode) -> Result<XmlNode, ApiError> {
        self.request(&ApiRequest::EditConfig {
            xpath: xpath.to_string(),
            element: to_xml_string(element)?,
        })
    }

    fn request(&self, request: &ApiRequest) -> Result<XmlNode, ApiError> {
        exchange(self.transport.as_ref(), request)
    }
}

impl fmt::Debug for Firewall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Firewall")
            .field("host", &self.host)
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}

fn exchange(transport: &dyn Transport, request: &ApiRequest) -> Result<XmlNode, ApiError> {
    let body = transport.send(request)?;
    let response = parse_str(&body)?;
    check_status(response)
}

/// Turn a `<response status="error">` document into [`ApiError::Device`].
pub fn check_status(response: XmlNode) -> Result<XmlNode, ApiError> {
    if response.tag != "response" {
        return Err(ApiError::MissingField("response"));
    }
    match response.attribute("status") {
        Some("success") => Ok(response),
        _ => {
            let message = response
                .find("msg")
                .map(|msg| msg.texts().join("; "))
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "no message".to_string());
            Err(ApiError::Device {
                code: response.attribute("code").map(str::to_string),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::check_status;
    use crate::error::ApiError;
    use crate::parser::parse_str;

    #[test]
    fn success_passes_through() {
        let doc = parse_str("<response status=\"success\"><result/></response>").unwrap();
        assert!(check_status(doc).is_ok());
    }

    #[test]
    fn error_collects_message_lines() {
        let doc = parse_str(
            "<response status=\"error\" code=\"17\"><msg><line>bad xpath</line><line>edit failed</line></msg></response>",
        )
        .unwrap();

        match check_status(doc) {
            Err(ApiError::Device { code, message }) => {
                assert_eq!(code.as_deref(), Some("17"));
                assert_eq!(message, "bad xpath; edit failed");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_message_inside_result() {
        let doc = parse_str(
            "<response status=\"error\"><result><msg>Invalid credentials.</msg></result></response>",
        )
        .unwrap();
        let err = check_status(doc).unwrap_err();
        assert_eq!(err.to_string(), "device error: Invalid credentials.");
    }

    #[test]
    fn non_response_root_is_rejected() {
        let doc = parse_str("<html><body/></html>").unwrap();
        assert!(matches!(check_status(doc), Err(ApiError::MissingField("response"))));
    }
}
