//! Log retrieval, tabulation and CSV export.
//!
//! For each selected category the pipeline sends one `show log` query, turns
//! every returned `<entry>` into a [`LogRecord`], derives the columns from the
//! fields that actually came back, prints the table and writes it to
//! `<category>_logs.csv`. A failing category is reported and skipped; the
//! remaining categories still run.

pub mod export;
pub mod table;

use std::fmt::{self, Display, Formatter};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use panos_xapi::{ApiError, Firewall, XmlNode};
use thiserror::Error;

use crate::config::Settings;
use crate::console::{Console, ConsoleError};
use crate::report::{failure, progress, success, warning};

pub use table::{LogRecord, LogTable, MISSING};

/// Log types the firewall can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    Traffic,
    Threat,
    Url,
    Wildfire,
    Data,
    Config,
    System,
    Hipmatch,
    Gpc,
    Iptag,
    Tunnel,
    Alarm,
    Auth,
    UserId,
    Decryption,
    Unified,
}

impl LogCategory {
    /// Every category, in the order "all" processes them.
    pub const ALL: [LogCategory; 16] = [
        LogCategory::Traffic,
        LogCategory::Threat,
        LogCategory::Url,
        LogCategory::Wildfire,
        LogCategory::Data,
        LogCategory::Config,
        LogCategory::System,
        LogCategory::Hipmatch,
        LogCategory::Gpc,
        LogCategory::Iptag,
        LogCategory::Tunnel,
        LogCategory::Alarm,
        LogCategory::Auth,
        LogCategory::UserId,
        LogCategory::Decryption,
        LogCategory::Unified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogCategory::Traffic => "traffic",
            LogCategory::Threat => "threat",
            LogCategory::Url => "url",
            LogCategory::Wildfire => "wildfire",
            LogCategory::Data => "data",
            LogCategory::Config => "config",
            LogCategory::System => "system",
            LogCategory::Hipmatch => "hipmatch",
            LogCategory::Gpc => "gpc",
            LogCategory::Iptag => "iptag",
            LogCategory::Tunnel => "tunnel",
            LogCategory::Alarm => "alarm",
            LogCategory::Auth => "auth",
            LogCategory::UserId => "user-id",
            LogCategory::Decryption => "decryption",
            LogCategory::Unified => "unified",
        }
    }
}

impl Display for LogCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid log type: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for LogCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LogCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(wanted.to_ascii_lowercase()))
    }
}

/// Operator's category choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelection {
    One(LogCategory),
    All,
}

impl CategorySelection {
    pub fn categories(self) -> Vec<LogCategory> {
        match self {
            CategorySelection::One(category) => vec![category],
            CategorySelection::All => LogCategory::ALL.to_vec(),
        }
    }
}

impl FromStr for CategorySelection {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategorySelection::All);
        }
        s.parse().map(CategorySelection::One)
    }
}

/// Parse the record limit; blank, non-numeric or zero input uses `default`.
pub fn parse_limit(input: &str, default: u32) -> u32 {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return default;
    }
    match input.parse::<u32>() {
        Ok(0) | Err(_) => default,
        Ok(limit) => limit,
    }
}

/// One `show log` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub category: LogCategory,
    pub start: String,
    pub end: String,
    pub limit: u32,
}

impl LogQuery {
    /// Command text sent to the device; timestamps are passed through as typed.
    pub fn command(&self) -> String {
        format!(
            "show log {} direction equal forward time {} to {} max {}",
            self.category, self.start, self.end, self.limit
        )
    }
}

/// Records carried by a `show log` response, one per `<entry>`.
///
/// A record's fields are the entry's child elements, values untrimmed;
/// attributes such as `logid` are not fields. A repeated tag keeps its first
/// value.
pub fn records_from_response(response: &XmlNode) -> Vec<LogRecord> {
    response
        .find_all("entry")
        .into_iter()
        .map(|entry| {
            let mut record = LogRecord::new();
            for field in &entry.children {
                record
                    .entry(field.tag.clone())
                    .or_insert_with(|| field.text.clone().unwrap_or_default());
            }
            record
        })
        .collect()
}

/// Why a single category produced no export.
#[derive(Debug, Error)]
pub enum LogExportError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result of one category's query.
#[derive(Debug)]
pub enum CategoryOutcome {
    Exported { rows: usize, path: PathBuf },
    NoEntries,
    Failed(LogExportError),
}

/// Query, print and export one category.
pub fn fetch_category<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    firewall: &Firewall,
    query: &LogQuery,
    output_dir: &Path,
) -> Result<CategoryOutcome, ConsoleError> {
    console.blank()?;
    console.line(progress(format!("Fetching {} logs...", query.category)))?;

    let table = match firewall.op(&query.command()) {
        Ok(response) => LogTable::from_records(&records_from_response(&response)),
        Err(err) => return report_failure(console, query.category, err.into()),
    };
    if table.is_empty() {
        console.line(warning("No log entries found."))?;
        return Ok(CategoryOutcome::NoEntries);
    }

    console.line(table.render_grid())?;

    let path = export::export_path(output_dir, query.category);
    if let Err(err) = export::write_csv(&table, &path) {
        return report_failure(console, query.category, err.into());
    }
    console.line(success(format!("Logs exported to: {}", path.display())))?;

    Ok(CategoryOutcome::Exported {
        rows: table.rows.len(),
        path,
    })
}

fn report_failure<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    category: LogCategory,
    err: LogExportError,
) -> Result<CategoryOutcome, ConsoleError> {
    warn!("{category} logs failed: {err}");
    console.line(failure(format!("Error fetching {category} logs: {err}")))?;
    Ok(CategoryOutcome::Failed(err))
}

/// Run every category of `selection` with the same window and limit.
pub fn fetch_logs<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    firewall: &Firewall,
    selection: CategorySelection,
    window: (&str, &str),
    limit: u32,
    output_dir: &Path,
) -> Result<Vec<(LogCategory, CategoryOutcome)>, ConsoleError> {
    let (start, end) = window;
    let mut outcomes = Vec::new();
    for category in selection.categories() {
        let query = LogQuery {
            category,
            start: start.to_string(),
            end: end.to_string(),
            limit,
        };
        debug!("log query: {}", query.command());
        let outcome = fetch_category(console, firewall, &query, output_dir)?;
        outcomes.push((category, outcome));
    }
    Ok(outcomes)
}

/// The "Logs" menu operation: prompt for the query and run it.
pub fn get_network_logs<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    firewall: &Firewall,
    settings: &Settings,
) -> Result<Vec<(LogCategory, CategoryOutcome)>, ConsoleError> {
    console.line("Available log types:")?;
    for category in LogCategory::ALL {
        console.line(format!("- {category}"))?;
    }

    let raw = console.prompt("\nEnter log type ('all' to display all logs): ")?;
    let selection = match raw.parse::<CategorySelection>() {
        Ok(selection) => selection,
        Err(err) => {
            console.line(warning(err.to_string()))?;
            return Ok(Vec::new());
        }
    };

    let limit = parse_limit(
        &console.prompt("Enter number of logs to fetch: ")?,
        settings.default_log_limit,
    );
    let start = console.prompt("Start time (YYYY/MM/DD HH:MM:SS): ")?;
    let end = console.prompt("End time (YYYY/MM/DD HH:MM:SS): ")?;

    fetch_logs(
        console,
        firewall,
        selection,
        (start.trim(), end.trim()),
        limit,
        &settings.output_dir,
    )
}
