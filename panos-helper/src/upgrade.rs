use std::io::{BufRead, Write};

use log::warn;
use panos_xapi::updater::{SoftwareUpdater, SoftwareVersion};
use panos_xapi::Firewall;

use crate::config::Settings;
use crate::console::{Console, ConsoleError};
use crate::report::{failure, progress, success, warning};

/// How an upgrade request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    NoCandidates,
    NotFound(String),
    Initiated(String),
    Failed(String),
}

/// Versions other than the running one.
pub fn upgrade_candidates(versions: Vec<SoftwareVersion>) -> Vec<SoftwareVersion> {
    versions.into_iter().filter(|v| !v.current).collect()
}

/// Exact version match among `candidates`.
pub fn select_candidate<'a>(
    candidates: &'a [SoftwareVersion],
    target: &str,
) -> Option<&'a SoftwareVersion> {
    candidates.iter().find(|candidate| candidate.version == target)
}

/// The "Upgrade" menu operation.
pub fn upgrade_pan_os<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    firewall: &Firewall,
    settings: &Settings,
) -> Result<UpgradeOutcome, ConsoleError> {
    console.line("Initializing software updater...")?;
    let updater = SoftwareUpdater::new(firewall).with_poll_interval(settings.job_poll_interval);

    console.line("Checking for available software updates...")?;
    let versions = match updater.check() {
        Ok(versions) => versions,
        Err(err) => {
            warn!("software check failed: {err}");
            console.line(failure(format!("Failed to check for updates: {err}")))?;
            return Ok(UpgradeOutcome::Failed(err.to_string()));
        }
    };

    let candidates = upgrade_candidates(versions);
    if candidates.is_empty() {
        console.line(warning("No upgrade candidates available."))?;
        return Ok(UpgradeOutcome::NoCandidates);
    }

    console.line("\nAvailable PAN-OS Versions for Upgrade:")?;
    for candidate in &candidates {
        let status = if candidate.downloaded {
            "Downloaded"
        } else {
            "Not downloaded"
        };
        console.line(format!("- {} ({status})", candidate.version))?;
    }

    let target = console.prompt("\nEnter the version to upgrade to: ")?;
    let target = target.trim();
    let Some(selected) = select_candidate(&candidates, target) else {
        console.line(warning(format!(
            "Version {target} not found among upgrade candidates."
        )))?;
        return Ok(UpgradeOutcome::NotFound(target.to_string()));
    };

    console.blank()?;
    console.line(progress(format!(
        "Upgrading to PAN-OS {} (download + install + reboot)...",
        selected.version
    )))?;
    match updater.download_install_reboot(&selected.version) {
        Ok(()) => {
            console.line(success("Upgrade and reboot process initiated successfully."))?;
            Ok(UpgradeOutcome::Initiated(selected.version.clone()))
        }
        Err(err) => {
            warn!("upgrade to {} failed: {err}", selected.version);
            console.line(failure(format!("Upgrade failed: {err}")))?;
            Ok(UpgradeOutcome::Failed(err.to_string()))
        }
    }
}
