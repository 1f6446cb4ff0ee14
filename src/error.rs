//! Error kinds raised while expanding, validating and rendering a system.
//!
//! Hard failures only. Recoverable conditions (unknown device type, bad
//! optional styling) are `Diagnostic`s, see `diagnostics.rs`.

use std::path::PathBuf;

/// Every way a generation run can fail.
#[derive(Debug, thiserror::Error)]
pub enum RackError {
    /// Malformed cluster range, placeholder token or structural field.
    #[error("configuration error in {context}: {reason}")]
    Configuration { context: String, reason: String },

    #[error("duplicate device name '{name}' (declared in {first} and again in {second})")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error(
        "rack '{rack}' {panel}: '{first}' and '{second}' both claim {}",
        unit_range(.low, .high)
    )]
    Overlap {
        rack: String,
        panel: String,
        first: String,
        second: String,
        low: i64,
        high: i64,
    },

    #[error(
        "rack '{rack}' {panel}: '{device}' spans {} but the rack holds U1-U{total_u}",
        unit_range(.bottom, .top)
    )]
    OutOfBounds {
        rack: String,
        panel: String,
        device: String,
        top: i64,
        bottom: i64,
        total_u: u32,
    },

    #[error("wiring layer '{layer}', connection #{index} ({from} -- {to}): unknown device '{device}'")]
    UnresolvedDevice {
        layer: String,
        index: usize,
        from: String,
        to: String,
        device: String,
    },

    #[error("computer_info entry '{device}' does not match any declared device")]
    Mismatch { device: String },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build table: {0}")]
    Table(#[from] csv::Error),
}

impl RackError {
    pub fn configuration(context: impl Into<String>, reason: impl Into<String>) -> Self {
        RackError::Configuration {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

fn unit_range(low: &i64, high: &i64) -> String {
    if low == high {
        format!("U{low}")
    } else {
        format!("U{low}-U{high}")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
