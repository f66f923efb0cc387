//! PAN-OS software image enumeration and upgrade.

use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::error::ApiError;
use crate::firewall::Firewall;
use crate::tree::XmlNode;

/// Default delay between two `show jobs id` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// One software image known to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareVersion {
    pub version: String,
    pub filename: Option<String>,
    pub released_on: Option<String>,
    pub downloaded: bool,
    /// The image the device is running.
    pub current: bool,
    pub latest: bool,
}

impl SoftwareVersion {
    fn from_entry(entry: &XmlNode) -> Option<Self> {
        let version = entry.get_text(&["version"])?.to_string();
        if version.is_empty() {
            return None;
        }
        let text = |tag: &str| entry.get_text(&[tag]).map(str::to_string);
        Some(Self {
            version,
            filename: text("filename"),
            released_on: text("released-on"),
            downloaded: yes(entry, "downloaded"),
            current: yes(entry, "current"),
            latest: yes(entry, "latest"),
        })
    }
}

fn yes(entry: &XmlNode, tag: &str) -> bool {
    entry
        .get_text(&[tag])
        .is_some_and(|value| value.eq_ignore_ascii_case("yes"))
}

/// Final state of a device job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub id: String,
    pub result: String,
    pub details: Vec<String>,
}

/// Software update client scoped to one firewall session.
pub struct SoftwareUpdater<'fw> {
    firewall: &'fw Firewall,
    poll_interval: Duration,
}

impl<'fw> SoftwareUpdater<'fw> {
    pub fn new(firewall: &'fw Firewall) -> Self {
        Self {
            firewall,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Ask the device to refresh and list the images it knows about.
    pub fn check(&self) -> Result<Vec<SoftwareVersion>, ApiError> {
        let response = self.firewall.op("request system software check")?;
        let versions = response
            .find("versions")
            .ok_or(ApiError::MissingField("versions"))?;
        Ok(versions
            .get_children("entry")
            .into_iter()
            .filter_map(SoftwareVersion::from_entry)
            .collect())
    }

    /// Download an image and wait for the download job to finish.
    pub fn download(&self, version: &str) -> Result<JobOutcome, ApiError> {
        info!("downloading PAN-OS {version}");
        let response = self
            .firewall
            .op(&format!("request system software download version \"{version}\""))?;
        self.wait_for_enqueued(&response)
    }

    /// Install a downloaded image and wait for the install job.
    pub fn install(&self, version: &str) -> Result<JobOutcome, ApiError> {
        info!("installing PAN-OS {version}");
        let response = self
            .firewall
            .op(&format!("request system software install version \"{version}\""))?;
        self.wait_for_enqueued(&response)
    }

    /// Restart the device. The device is not polled back to health.
    pub fn reboot(&self) -> Result<(), ApiError> {
        info!("rebooting {}", self.firewall.serial());
        self.firewall.op("request restart system")?;
        Ok(())
    }

    /// Download, install and reboot into `version`.
    ///
    /// When moving to a different feature release, its base image (`X.Y.0`)
    /// is downloaded first if the device lists it and does not have it.
    pub fn download_install_reboot(&self, version: &str) -> Result<(), ApiError> {
        let versions = self.check()?;
        if let Some(base) = base_image_needed(&versions, version) {
            info!("base image {base} required before {version}");
            self.download(&base)?;
        }

        self.download(version)?;
        self.install(version)?;
        self.reboot()
    }

    fn wait_for_enqueued(&self, response: &XmlNode) -> Result<JobOutcome, ApiError> {
        let job = response
            .get_text(&["result", "job"])
            .filter(|id| !id.is_empty());
        match job {
            Some(id) => self.wait_for_job(id),
            None => Err(ApiError::MissingField("result/job")),
        }
    }

    /// Poll `show jobs id` until the job reaches `FIN`.
    pub fn wait_for_job(&self, id: &str) -> Result<JobOutcome, ApiError> {
        loop {
            let response = self.firewall.op(&format!("show jobs id {id}"))?;
            let job = response
                .find("job")
                .ok_or(ApiError::MissingField("result/job"))?;
            let status = job.get_text(&["status"]).unwrap_or_default();
            let progress = job.get_text(&["progress"]).unwrap_or_default();
            debug!("job {id}: status={status} progress={progress}");

            if status == "FIN" {
                let result = job.get_text(&["result"]).unwrap_or("FAIL").to_string();
                let details = job
                    .get_child("details")
                    .map(|details| details.texts().into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                let outcome = JobOutcome {
                    id: id.to_string(),
                    result,
                    details,
                };
                if outcome.result != "OK" {
                    return Err(ApiError::Job {
                        id: outcome.id,
                        result: outcome.result,
                        details: outcome.details.join("; "),
                    });
                }
                return Ok(outcome);
            }

            thread::sleep(self.poll_interval);
        }
    }
}

/// Feature-release base image to fetch before `target`, if any.
fn base_image_needed(versions: &[SoftwareVersion], target: &str) -> Option<String> {
    let base = base_version(target)?;
    if base == target {
        return None;
    }
    let current = versions.iter().find(|v| v.current)?;
    if base_version(&current.version).as_deref() == Some(base.as_str()) {
        return None;
    }
    versions
        .iter()
        .find(|v| v.version == base && !v.downloaded)
        .map(|v| v.version.clone())
}

/// `10.2.4-h3` → `10.2.0`.
fn base_version(version: &str) -> Option<String> {
    let mut parts = version.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    Some(format!("{major}.{minor}.0"))
}
