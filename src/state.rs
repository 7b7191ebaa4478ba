//! Persisted negotiation state.
//!
//! Two files survive between runs: the last assigned topology (one decimal
//! line) and the raw routing table. Reads are best-effort; writes replace the
//! file atomically so the router never sees a half-written routing table.

use crate::config::StateConfig;
use crate::protocol::NegotiationResponse;
use log::{debug, warn};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors writing the state files
#[derive(Debug, thiserror::Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Paths of the persisted state files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFiles {
    pub last_topology: PathBuf,
    pub routing_table: PathBuf,
}

impl StateFiles {
    pub fn new(last_topology: impl Into<PathBuf>, routing_table: impl Into<PathBuf>) -> Self {
        Self {
            last_topology: last_topology.into(),
            routing_table: routing_table.into(),
        }
    }

    pub fn from_config(state: &StateConfig) -> Self {
        Self::new(&state.last_topology_file, &state.routing_table_file)
    }

    /// Contents of the last-topology file, or `None` if it cannot be read.
    ///
    /// A missing file is the normal first-run case and is not logged as a
    /// problem; any other read failure is reported and treated the same way.
    pub fn read_last_topology(&self) -> Option<String> {
        match fs::read_to_string(&self.last_topology) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No persisted topology at {:?}", self.last_topology);
                None
            }
            Err(err) => {
                warn!(
                    "Ignoring unreadable persisted topology {:?}: {}",
                    self.last_topology, err
                );
                None
            }
        }
    }

    /// Write the routing table, then remember the assigned topology.
    pub fn persist(&self, response: &NegotiationResponse) -> Result<(), PersistError> {
        write_atomic(&self.routing_table, &response.routing_table)?;
        write_atomic(
            &self.last_topology,
            format!("{}\n", response.assigned_topology).as_bytes(),
        )?;
        debug!(
            "Persisted topology #{} to {:?} and {}B routing table to {:?}",
            response.assigned_topology,
            self.last_topology,
            response.routing_table.len(),
            self.routing_table
        );
        Ok(())
    }
}

/// Replace `path` with `contents` via a temp file in the same directory
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    let wrap = |source: io::Error| PersistError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(wrap)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    // Temp files are created owner-only; keep the mode a plain write would give
    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions).map_err(wrap)?;
    }
    tmp.write_all(contents).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|err| wrap(err.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn response(topology: u32, table: &[u8]) -> NegotiationResponse {
        NegotiationResponse {
            assigned_topology: topology,
            routing_table: table.to_vec(),
        }
    }

    #[test]
    fn test_missing_state_reads_as_none() {
        let dir = tempdir().unwrap();
        let files = StateFiles::new(dir.path().join(".last_topo_num"), dir.path().join("rtable"));
        assert_eq!(files.read_last_topology(), None);
    }

    #[test]
    fn test_persist_writes_both_files() {
        let dir = tempdir().unwrap();
        let files = StateFiles::new(dir.path().join(".last_topo_num"), dir.path().join("rtable"));

        files.persist(&response(7, b"R1 R2\n")).unwrap();

        assert_eq!(fs::read_to_string(&files.last_topology).unwrap(), "7\n");
        assert_eq!(fs::read(&files.routing_table).unwrap(), b"R1 R2\n");
        assert_eq!(files.read_last_topology().as_deref(), Some("7\n"));
    }

    #[test]
    fn test_persist_overwrites_and_keeps_bytes() {
        let dir = tempdir().unwrap();
        let files = StateFiles::new(dir.path().join(".last_topo_num"), dir.path().join("rtable"));

        files.persist(&response(3, b"a much longer first routing table\n")).unwrap();
        let table = [0x00, 0xff, b'\r', b'\n', 0x1a];
        files.persist(&response(4, &table)).unwrap();

        assert_eq!(fs::read_to_string(&files.last_topology).unwrap(), "4\n");
        assert_eq!(fs::read(&files.routing_table).unwrap(), table);
    }

    #[test]
    fn test_persist_empty_table_and_nested_dirs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("state").join("sr");
        let files = StateFiles::new(nested.join("topo"), nested.join("rtable"));

        files.persist(&response(1, b"")).unwrap();

        assert_eq!(fs::read(&files.routing_table).unwrap(), b"");
        assert_eq!(fs::read_to_string(&files.last_topology).unwrap(), "1\n");
    }

    #[test]
    fn test_persist_error_names_path() {
        let dir = tempdir().unwrap();
        // A regular file where a directory is expected
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let files = StateFiles::new(dir.path().join("topo"), blocker.join("rtable"));

        let err = files.persist(&response(1, b"table")).unwrap_err();
        assert_eq!(err.path, blocker.join("rtable"));
        // Routing table failed first, so the topology file was never written
        assert!(!files.last_topology.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_persisted_files_are_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let files = StateFiles::new(dir.path().join(".last_topo_num"), dir.path().join("rtable"));

        files.persist(&response(7, b"table")).unwrap();
        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(files.routing_table.as_path()), 0o644);
        assert_eq!(mode(files.last_topology.as_path()), 0o644);

        // An existing file keeps its mode across rewrites
        fs::set_permissions(&files.routing_table, fs::Permissions::from_mode(0o664)).unwrap();
        files.persist(&response(8, b"newer table")).unwrap();
        assert_eq!(mode(files.routing_table.as_path()), 0o664);
    }
}
