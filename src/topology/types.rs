//! Topology type definitions.

use std::fmt;

/// Topology number sent to the allocation server.
///
/// `0` means "no preference"; any other value asks for that specific topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TopologyRequest(u32);

impl TopologyRequest {
    /// Ask the server to pick any available topology
    pub const NO_PREFERENCE: TopologyRequest = TopologyRequest(0);

    pub fn new(topology: u32) -> Self {
        Self(topology)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_no_preference(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TopologyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_preference() {
            write!(f, "no preference")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TopologyRequest::NO_PREFERENCE.to_string(), "no preference");
        assert_eq!(TopologyRequest::new(42).to_string(), "#42");
        assert!(TopologyRequest::default().is_no_preference());
    }
}
