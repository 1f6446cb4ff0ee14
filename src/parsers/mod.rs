//! Configuration loading — YAML text or file to the raw schema.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::RackError;
use crate::syntax::types::SystemConfig;

/// Parse a YAML system description.
///
/// An empty document is a system with nothing in it.
pub fn parse(src: &str) -> Result<SystemConfig, RackError> {
    if src.trim().is_empty() {
        return Ok(SystemConfig::default());
    }
    let cfg: SystemConfig = serde_yaml::from_str(src)?;
    debug!(
        "parsed {} racks, {} external entries, {} wiring layers, {} computer_info entries",
        cfg.racks.len(),
        cfg.external_devices.len(),
        cfg.wiring_layers.len(),
        cfg.computer_info.len()
    );
    Ok(cfg)
}

/// Read and parse the file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<SystemConfig, RackError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| RackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&src)
}
