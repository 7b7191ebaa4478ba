//! Shared utilities: duration parsing and binary validation.

pub mod binary;
pub mod duration;

pub use binary::{resolve_binary_path, validate_binary, validate_binary_spec, BinaryError};
pub use duration::parse_duration;
