//! Interactive administration of a PAN-OS firewall.
//!
//! The helper connects once and then offers a menu of three operations that
//! all run against the same session:
//!
//! - [`upgrade`]: pick a PAN-OS version the device offers, then download,
//!   install and reboot into it
//! - [`logs`]: query one or all log types for a time window, print each
//!   result as a table and export it to `<type>_logs.csv`
//! - [`policy`]: build a security rule from prompts and push it to the
//!   device
//!
//! [`session`] sequences these behind [`connect`], and [`console`] abstracts
//! the terminal so every flow can be driven from scripted input. Device
//! access goes through the `panos-xapi` crate.

pub mod config;
pub mod connect;
pub mod console;
pub mod logs;
pub mod policy;
pub mod report;
pub mod session;
pub mod upgrade;
