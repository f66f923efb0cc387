use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "panos-helper", version)]
#[command(about = "Interactively upgrade, pull logs from, and add security rules to a PAN-OS firewall")]
pub struct Cli {
    /// Optional settings file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Directory that receives `<category>_logs.csv` exports.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Verify the firewall's TLS certificate.
    #[arg(long)]
    pub verify_tls: bool,
    /// Virtual system that receives new security rules.
    #[arg(long, value_name = "NAME")]
    pub vsys: Option<String>,
    /// Increase diagnostic logging on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
