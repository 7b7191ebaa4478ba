//! Router invocation.
//!
//! The router is started with a plain argument vector:
//!
//! ```text
//! <binary> -s <server host> -t <topology> -r <routing table> -v <vhost> [extra args...]
//! ```
//!
//! No shell is involved, so hosts and paths are passed through untouched.

use crate::config::{RouterConfig, ServerConfig};
use crate::utils::binary::{validate_binary_spec, BinaryError};
use log::info;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Errors starting the router
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("router binary unusable: {0}")]
    Binary(#[from] BinaryError),

    #[error("failed to start router {}: {source}", binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything needed to start the router on an assigned topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterInvocation {
    pub binary: PathBuf,
    pub server_host: String,
    pub topology: u32,
    pub routing_table: PathBuf,
    pub vhost: String,
    pub extra_args: Vec<String>,
}

impl RouterInvocation {
    pub fn from_config(
        router: &RouterConfig,
        server: &ServerConfig,
        topology: u32,
        routing_table: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary: router.binary.clone(),
            server_host: server.host.clone(),
            topology,
            routing_table: routing_table.into(),
            vhost: router.vhost.clone(),
            extra_args: router.extra_args.clone(),
        }
    }

    /// Arguments passed to the router, binary excluded
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-s".into(),
            self.server_host.clone().into(),
            "-t".into(),
            self.topology.to_string().into(),
            "-r".into(),
            self.routing_table.clone().into_os_string(),
            "-v".into(),
            self.vhost.clone().into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Human-readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.as_os_str().to_owned())
            .chain(self.args())
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Start the router and wait for it to exit.
    pub fn run(&self) -> Result<ExitStatus, LaunchError> {
        let binary = validate_binary_spec(&self.binary)?;
        info!("{}", self.command_line());

        Command::new(&binary)
            .args(self.args())
            .status()
            .map_err(|source| LaunchError::Spawn { binary, source })
    }
}
