//! In-memory transport for exercising API clients without a device.

use std::cell::RefCell;
use std::net::{IpAddr, Ipv4Addr};
use std::rc::Rc;

use crate::error::ApiError;
use crate::firewall::Firewall;
use crate::transport::{ApiRequest, Transport};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<String, ApiError>>;

/// Requests seen by a [`ScriptedTransport`], shared with the test.
pub type RequestLog = Rc<RefCell<Vec<ApiRequest>>>;

/// A transport that answers every request with a closure and records it.
pub struct ScriptedTransport {
    responder: Responder,
    log: RequestLog,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&ApiRequest) -> Result<String, ApiError> + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            log: RequestLog::default(),
        }
    }

    /// Handle to the recorded requests; stays valid after the transport is
    /// moved into a [`Firewall`].
    pub fn log(&self) -> RequestLog {
        Rc::clone(&self.log)
    }

    /// Open a firewall session whose system info reports `serial`; every
    /// other request goes to `responder`. The system info request is not
    /// recorded.
    pub fn firewall(
        serial: &str,
        responder: impl Fn(&ApiRequest) -> Result<String, ApiError> + 'static,
    ) -> (Firewall, RequestLog) {
        let info = system_info(serial);
        let transport = ScriptedTransport::new(move |request| match request {
            ApiRequest::Op { cmd } if cmd == SYSTEM_INFO_CMD => Ok(info.clone()),
            _ => responder(request),
        });
        let log = transport.log();
        let host = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        match Firewall::with_transport(host, Box::new(transport)) {
            Ok(firewall) => (firewall, log),
            Err(err) => panic!("scripted connect failed: {err}"),
        }
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let reply = (self.responder)(request);
        if !matches!(request, ApiRequest::Op { cmd } if cmd == SYSTEM_INFO_CMD) {
            self.log.borrow_mut().push(request.clone());
        }
        reply
    }
}

/// `cmd` field of `show system info`.
pub const SYSTEM_INFO_CMD: &str = "<show><system><info/></system></show>";

/// A successful response wrapping `result` markup.
pub fn success(result: &str) -> String {
    format!("<response status=\"success\"><result>{result}</result></response>")
}

/// An error response carrying `message`.
pub fn error(message: &str) -> String {
    format!("<response status=\"error\"><msg><line>{message}</line></msg></response>")
}

/// A system info response reporting `serial`.
pub fn system_info(serial: &str) -> String {
    success(&format!(
        "<system><hostname>fw01</hostname><serial>{serial}</serial></system>"
    ))
}
