//! Binary path resolution and validation utilities.
//!
//! This module resolves the router binary from an explicit path or a bare
//! name looked up on `PATH`, and checks that it exists and is executable
//! before the process is spawned.

use std::env;
use std::path::{Path, PathBuf};

/// Errors that can occur during binary resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Get the user's home directory from the HOME environment variable
fn get_home_dir() -> Result<PathBuf, BinaryError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BinaryError::NoHomeDir)
}

/// Resolve a binary from a bare name or an explicit path.
///
/// Resolution rules:
/// 1. Starts with `~/`: expanded against the home directory
/// 2. Contains `/`: used as given (relative paths stay relative to the cwd)
/// 3. Otherwise: the first match in `PATH`
///
/// # Examples
///
/// ```ignore
/// resolve_binary_path(Path::new("./sr"))          -> ./sr
/// resolve_binary_path(Path::new("~/bin/sr"))      -> /home/user/bin/sr
/// resolve_binary_path(Path::new("sr"))            -> /usr/local/bin/sr (if on PATH)
/// ```
pub fn resolve_binary_path(name_or_path: &Path) -> Result<PathBuf, BinaryError> {
    if let Ok(rest) = name_or_path.strip_prefix("~") {
        return Ok(get_home_dir()?.join(rest));
    }

    if name_or_path.components().count() > 1 || name_or_path.is_absolute() {
        return Ok(name_or_path.to_path_buf());
    }

    let path_var = env::var_os("PATH").unwrap_or_default();
    env::split_paths(&path_var)
        .map(|dir| dir.join(name_or_path))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| BinaryError::NotFound {
            path: name_or_path.display().to_string(),
        })
}

/// Validate that a binary exists and is executable.
///
/// Called right before the router is launched so a missing binary is
/// reported as a launch failure rather than an opaque spawn error.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    if !path.exists() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;

    if !metadata.is_file() {
        return Err(BinaryError::InvalidPath {
            path: path.display().to_string(),
        });
    }

    // Check if file is executable (any execute bit set)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(BinaryError::NotExecutable {
                path: path.display().to_string(),
            });
        }
    }

    Ok(())
}

/// Validate a binary specified by name or path.
///
/// Combines resolution and validation in one step.
pub fn validate_binary_spec(name_or_path: &Path) -> Result<PathBuf, BinaryError> {
    let resolved = resolve_binary_path(name_or_path)?;
    validate_binary(&resolved)?;
    Ok(resolved)
}
