//! Colored status lines for the operator.

use colored::Colorize;

/// A step that completed.
pub fn success(message: impl AsRef<str>) -> String {
    format!("[ok] {}", message.as_ref()).green().to_string()
}

/// Rejected input or a non-fatal condition.
pub fn warning(message: impl AsRef<str>) -> String {
    format!("[!] {}", message.as_ref()).yellow().to_string()
}

/// A device or export operation that failed.
pub fn failure(message: impl AsRef<str>) -> String {
    format!("[x] {}", message.as_ref()).red().to_string()
}

/// Work about to start.
pub fn progress(message: impl AsRef<str>) -> String {
    format!("... {}", message.as_ref()).cyan().to_string()
}
