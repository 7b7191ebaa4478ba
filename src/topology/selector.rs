//! Topology selection from an explicit override and the persisted preference.
//!
//! The selector is pure: the caller reads the persisted state and hands its
//! contents in, so the precedence rules can be tested without touching disk.

use super::types::TopologyRequest;
use log::warn;

/// Where the selected topology came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologySource {
    /// Explicit override from the command line
    Override,
    /// First line of the persisted last-topology state
    Persisted,
    /// Nothing usable was available
    Default,
}

/// Choose the topology to request.
///
/// Precedence:
/// 1. `override_value`, used verbatim when present (including `0`)
/// 2. the first line of `persisted` when it parses as an unsigned 32-bit integer
/// 3. `0` ("no preference")
///
/// Malformed values in either input are recovered to `0` with a warning.
///
/// # Examples
/// ```
/// use topo_negotiator::topology::{select_topology, TopologyRequest, TopologySource};
///
/// let (request, source) = select_topology(None, Some("7\n"));
/// assert_eq!(request, TopologyRequest::new(7));
/// assert_eq!(source, TopologySource::Persisted);
///
/// let (request, _) = select_topology(Some("42"), Some("7\n"));
/// assert_eq!(request.value(), 42);
/// ```
pub fn select_topology(
    override_value: Option<&str>,
    persisted: Option<&str>,
) -> (TopologyRequest, TopologySource) {
    if let Some(raw) = override_value {
        let request = parse_topology(raw).unwrap_or_else(|| {
            warn!("Ignoring malformed topology override {:?}; requesting no preference", raw);
            TopologyRequest::NO_PREFERENCE
        });
        return (request, TopologySource::Override);
    }

    let Some(contents) = persisted else {
        return (TopologyRequest::NO_PREFERENCE, TopologySource::Default);
    };

    let Some(first_line) = contents.lines().next() else {
        return (TopologyRequest::NO_PREFERENCE, TopologySource::Default);
    };

    match parse_topology(first_line) {
        Some(request) => (request, TopologySource::Persisted),
        None => {
            warn!(
                "Persisted topology {:?} is not a valid topology number; requesting no preference",
                first_line
            );
            (TopologyRequest::NO_PREFERENCE, TopologySource::Default)
        }
    }
}

/// Parse a decimal topology number, tolerating surrounding whitespace
fn parse_topology(raw: &str) -> Option<TopologyRequest> {
    raw.trim().parse::<u32>().ok().map(TopologyRequest::new)
}
