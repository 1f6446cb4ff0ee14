//! Configuration document types.

pub mod types;

pub use types::SystemConfig;
