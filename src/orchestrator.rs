//! Negotiation orchestrator.
//!
//! Runs one invocation end to end: read the persisted preference, select the
//! topology, negotiate, persist, and start the router. Each step completes
//! before the next begins and nothing is persisted unless negotiation succeeded.

use crate::client::NegotiationClient;
use crate::config::Config;
use crate::process::{LaunchError, RouterInvocation};
use crate::state::StateFiles;
use crate::topology::{select_topology, TopologyRequest, TopologySource};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{error, info, warn};
use std::process::ExitStatus;

/// Exit status when the router could not be started or failed.
/// clap exits with 2 on usage errors, so this must differ from it.
pub const EXIT_ROUTER_FAILED: u8 = 3;

/// What happened to the router after a successful negotiation
#[derive(Debug)]
pub enum RouterOutcome {
    /// Launching was disabled in the configuration
    Skipped,
    /// The router ran and exited with this status
    Exited(ExitStatus),
    /// The router could not be started
    LaunchFailed(LaunchError),
}

impl RouterOutcome {
    pub fn succeeded(&self) -> bool {
        match self {
            RouterOutcome::Skipped => true,
            RouterOutcome::Exited(status) => status.success(),
            RouterOutcome::LaunchFailed(_) => false,
        }
    }
}

/// Result of a run whose negotiation succeeded
#[derive(Debug)]
pub struct RunOutcome {
    pub requested: TopologyRequest,
    pub source: TopologySource,
    pub assigned_topology: u32,
    pub routing_table_len: usize,
    pub router: RouterOutcome,
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.router.succeeded() {
            0
        } else {
            EXIT_ROUTER_FAILED
        }
    }
}

/// Negotiate a topology and start the router on it.
///
/// `topology_override` is the raw `--topo` value, if any. Errors returned here
/// are negotiation, persistence or configuration failures; router failures are
/// reported through [`RunOutcome::router`] instead.
pub fn run(config: &Config, topology_override: Option<&str>) -> Result<RunOutcome> {
    config.validate()?;

    let state = StateFiles::from_config(&config.state);
    let persisted = match topology_override {
        Some(_) => None,
        None => state.read_last_topology(),
    };
    let (requested, source) = select_topology(topology_override, persisted.as_deref());
    info!("Selected topology {} ({:?})", requested, source);

    let client = NegotiationClient::from_config(&config.server);
    let response = client
        .negotiate(requested)
        .wrap_err_with(|| format!("Negotiation with {} failed", client.address()))?;

    if response.assigned_topology == 0 {
        warn!("Server assigned topology #0; persisting it as received");
    }
    if !requested.is_no_preference() && requested.value() != response.assigned_topology {
        info!(
            "Requested topology #{} was not available; assigned #{} instead",
            requested.value(),
            response.assigned_topology
        );
    }

    state
        .persist(&response)
        .wrap_err("Failed to persist negotiation state")?;

    info!(
        "got topology #{}: \n{}",
        response.assigned_topology,
        String::from_utf8_lossy(&response.routing_table)
    );

    let router = if config.router.launch {
        let invocation = RouterInvocation::from_config(
            &config.router,
            &config.server,
            response.assigned_topology,
            &state.routing_table,
        );
        match invocation.run() {
            Ok(status) => {
                if !status.success() {
                    error!("Router exited unsuccessfully: {}", status);
                }
                RouterOutcome::Exited(status)
            }
            Err(err) => {
                error!("{}", err);
                RouterOutcome::LaunchFailed(err)
            }
        }
    } else {
        info!("Router launch disabled; routing table is at {:?}", state.routing_table);
        RouterOutcome::Skipped
    };

    Ok(RunOutcome {
        requested,
        source,
        assigned_topology: response.assigned_topology,
        routing_table_len: response.routing_table.len(),
        router,
    })
}
