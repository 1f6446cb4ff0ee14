//! Configuration for the generation pipeline.
//!
//! `RenderConfig` tunes the emitted text; `GenerateConfig` adds the run
//! policy on top.

pub const DEFAULT_FONT_FACE: &str = "Arial";
pub const DEFAULT_TITLE_COLOR: &str = "#5af282";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Font face used by every DOT label and HTML table.
    pub font_face: String,
    /// Background of rack titles and table headers.
    pub title_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_face: DEFAULT_FONT_FACE.to_string(),
            title_color: DEFAULT_TITLE_COLOR.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What a failing artifact does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPolicy {
    /// Drop the failing artifact, keep the others.
    #[default]
    Lenient,
    /// Abort on the first failure.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateConfig {
    pub render: RenderConfig,
    pub policy: RunPolicy,
}

impl GenerateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            policy: RunPolicy::Strict,
            ..Self::default()
        }
    }
}
