use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise use defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

/// Command-line settings that override the YAML configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub no_launch: bool,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(host) = &overrides.host {
        info!("Server host overridden on the command line: {}", host);
        config.server.host = host.clone();
    }

    if let Some(port) = overrides.port {
        info!("Server port overridden on the command line: {}", port);
        config.server.port = port;
    }

    if let Some(timeout) = overrides.connect_timeout {
        config.server.connect_timeout = Some(timeout);
    }

    if let Some(timeout) = overrides.read_timeout {
        config.server.read_timeout = Some(timeout);
    }

    if overrides.no_launch {
        config.router.launch = false;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
