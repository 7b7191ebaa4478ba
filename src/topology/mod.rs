//! Topology selection module.
//!
//! Decides which topology number to ask the allocation server for.

pub mod selector;
pub mod types;

// Re-export key types and functions for easier access
pub use selector::{select_topology, TopologySource};
pub use types::TopologyRequest;
