//! # Topo Negotiator - topology assignment client for the allocation server
//!
//! This library negotiates a network topology from a central allocation server,
//! stores the assignment and its routing table on disk, and hands both to the
//! downstream router process.
//!
//! ## Overview
//!
//! One invocation performs exactly one negotiation:
//!
//! 1. **Selection**: pick the topology to request. An explicit override wins,
//!    otherwise the last assigned topology is preferred, otherwise `0`
//!    ("no preference").
//! 2. **Negotiation**: a single TCP exchange. The client sends a 4-byte
//!    big-endian topology number, half-closes, and reads until the server
//!    closes. The reply is a 4-byte assigned topology followed by the routing
//!    table bytes.
//! 3. **Persistence**: the routing table and the assigned topology are written
//!    to their state files.
//! 4. **Launch**: the router is started with the server host, the assigned
//!    topology and the routing table path.
//!
//! ## Architecture
//!
//! - `config`: Type-safe configuration structures and validation
//! - `config_loader`: YAML loading and command-line overrides
//! - `topology`: Topology request type and the selector
//! - `protocol`: Wire encoding of requests and decoding of responses
//! - `client`: The negotiation connection lifecycle
//! - `state`: Persisted last-topology and routing-table files
//! - `process`: Router invocation
//! - `utils`: Duration parsing and binary validation helpers
//! - `orchestrator`: Runs the steps above in order
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use topo_negotiator::{config::Config, orchestrator};
//!
//! let config = Config::default();
//! let outcome = orchestrator::run(&config, Some("42"))?;
//! println!("assigned topology #{}", outcome.assigned_topology);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed `thiserror` errors. The orchestrator and the
//! binary wrap them with `color_eyre` context. Nothing is persisted and the
//! router is never started unless the negotiation succeeded.

pub mod client;
pub mod config;
pub mod config_loader;
pub mod orchestrator;
pub mod process;
pub mod protocol;
pub mod state;
pub mod topology;
pub mod utils;
