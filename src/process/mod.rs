//! Router process module.
//!
//! Starts the downstream router on the negotiated topology.

pub mod router;

// Re-export commonly used items for convenience
pub use router::{LaunchError, RouterInvocation};
