use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use panos_helper::config::{load_settings, Settings};
use panos_helper::connect::HttpConnector;
use panos_helper::console::StdConsole;
use panos_helper::session;
use panos_xapi::HttpOptions;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;
    let connector = HttpConnector {
        options: HttpOptions {
            verify_tls: settings.verify_tls,
        },
    };

    let mut console = StdConsole::stdio();
    session::run(&mut console, &connector, &settings)?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    let level = match verbose {
        0 if std::env::var_os("RUST_LOG").is_some() => None,
        0 => Some(LevelFilter::Warn),
        1 => Some(LevelFilter::Info),
        _ => Some(LevelFilter::Debug),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_target(false).init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.clone();
    }
    if cli.verify_tls {
        settings.verify_tls = true;
    }
    if let Some(vsys) = &cli.vsys {
        settings.vsys = vsys.clone();
    }

    log::debug!("settings: {settings:?}");
    Ok(settings)
}
