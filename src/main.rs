use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use topo_negotiator::config_loader::{self, CliOverrides};
use topo_negotiator::orchestrator;
use topo_negotiator::utils::duration::parse_duration;

/// Negotiates for an available topology and then starts the router on it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preferred topology to connect to [default: most recently used topology]
    #[arg(short, long, allow_hyphen_values = true)]
    topo: Option<String>,

    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allocation server host
    #[arg(short, long)]
    server: Option<String>,

    /// Allocation server TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Connect timeout per server address (e.g. "10s")
    #[arg(long, value_parser = parse_duration)]
    connect_timeout: Option<Duration>,

    /// Give up if the server sends nothing for this long (e.g. "30s")
    #[arg(long, value_parser = parse_duration)]
    read_timeout: Option<Duration>,

    /// Stop after writing the state files instead of starting the router
    #[arg(long)]
    no_launch: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.server.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            no_launch: self.no_launch,
        }
    }
}

fn main() -> Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = config_loader::load_or_default(args.config.as_deref())?;
    config_loader::apply_cli_overrides(&mut config, &args.overrides())?;
    info!("Allocation server: {}", config.server_address());

    let outcome = orchestrator::run(&config, args.topo.as_deref())?;

    Ok(ExitCode::from(outcome.exit_code()))
}
