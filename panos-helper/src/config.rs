use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use panos_xapi::policies::DEFAULT_VSYS;
use panos_xapi::updater::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use thiserror::Error;

/// Record count used when the operator does not enter a usable number.
pub const DEFAULT_LOG_LIMIT: u32 = 10;

/// Runtime settings shared by every menu operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub verify_tls: bool,
    pub vsys: String,
    pub default_log_limit: u32,
    pub job_poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            verify_tls: false,
            vsys: DEFAULT_VSYS.to_string(),
            default_log_limit: DEFAULT_LOG_LIMIT,
            job_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Settings file contents; every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub output_dir: Option<PathBuf>,
    pub verify_tls: Option<bool>,
    pub vsys: Option<String>,
    pub default_log_limit: Option<u32>,
    pub job_poll_interval_secs: Option<u64>,
}

impl Settings {
    /// Defaults overlaid with the keys present in `file`.
    pub fn from_file(file: SettingsFile) -> Self {
        let defaults = Settings::default();
        Self {
            output_dir: file.output_dir.unwrap_or(defaults.output_dir),
            verify_tls: file.verify_tls.unwrap_or(defaults.verify_tls),
            vsys: file
                .vsys
                .filter(|vsys| !vsys.trim().is_empty())
                .unwrap_or(defaults.vsys),
            default_log_limit: file
                .default_log_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.default_log_limit),
            job_poll_interval: file
                .job_poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_poll_interval),
        }
    }
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load a settings file from disk.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_settings(&raw, path.display().to_string())
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    let file: SettingsFile =
        toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })?;
    Ok(Settings::from_file(file))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{parse_settings, Settings, SettingsError};

    #[test]
    fn empty_file_yields_defaults() {
        let settings = parse_settings("", "inline".to_string()).expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_log_limit, 10);
        assert_eq!(settings.vsys, "vsys1");
    }

    #[test]
    fn keys_override_defaults() {
        let settings = parse_settings(
            r#"
output_dir = "/var/tmp/exports"
verify_tls = true
vsys = "vsys3"
default_log_limit = 50
job_poll_interval_secs = 2
"#,
            "inline".to_string(),
        )
        .expect("parse");

        assert_eq!(settings.output_dir, PathBuf::from("/var/tmp/exports"));
        assert!(settings.verify_tls);
        assert_eq!(settings.vsys, "vsys3");
        assert_eq!(settings.default_log_limit, 50);
        assert_eq!(settings.job_poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let settings =
            parse_settings("default_log_limit = 0", "inline".to_string()).expect("parse");
        assert_eq!(settings.default_log_limit, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_settings("api_key = \"x\"", "inline".to_string()).expect_err("unknown key");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
