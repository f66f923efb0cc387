//! Blocking client for the PAN-OS XML management API.
//!
//! A [`Firewall`] is one authenticated session. Everything else is a small
//! client borrowed from it for a single concern:
//!
//! - [`updater::SoftwareUpdater`]: list, download and install PAN-OS images
//! - [`policies::Rulebase`]: create security rules
//!
//! Requests travel through the [`Transport`] trait. [`HttpTransport`] talks to
//! `https://<device>/api/`; tests plug in their own implementation (see the
//! `testing` feature).
//!
//! ```ignore
//! use panos_xapi::{Firewall, HttpOptions};
//!
//! let fw = Firewall::connect("192.0.2.1".parse()?, api_key, HttpOptions::default())?;
//! println!("serial {}", fw.serial());
//! let logs = fw.op("show log system direction equal forward max 5")?;
//! for entry in logs.find_all("entry") {
//!     println!("{}", entry);
//! }
//! ```

pub mod command;
pub mod error;
pub mod firewall;
pub mod parser;
pub mod policies;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod tree;
pub mod updater;
pub mod writer;

pub use command::{command_xml, CommandError};
pub use error::ApiError;
pub use firewall::Firewall;
pub use parser::{parse, parse_str, ParseError};
pub use transport::{ApiRequest, HttpOptions, HttpTransport, Transport};
pub use tree::XmlNode;
pub use writer::{to_xml_string, WriteError};
