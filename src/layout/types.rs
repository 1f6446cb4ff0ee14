//! Shared model types: type color table and edge style resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::registry::Device;
use crate::syntax::types::StyleEntry;

// ─── Constants ────────────────────────────────────────────────────────────────

/// Fill for devices with neither an explicit color nor a known type.
pub const DEFAULT_DEVICE_COLOR: &str = "#FFFFFF";

pub const DEFAULT_EDGE_COLOR: &str = "#323232";
pub const DEFAULT_EDGE_WIDTH: f64 = 2.0;
pub const DEFAULT_EDGE_FONT_SIZE: f64 = 8.0;
pub const DEFAULT_NODE_FONT_SIZE: f64 = 11.0;

/// Built-in type colors; configuration entries override them by key.
const BUILTIN_TYPE_COLORS: &[(&str, &str)] = &[
    ("server", "#A7C7E7"),
    ("switch", "#B4E7B0"),
    ("router", "#9FD8CB"),
    ("pdu", "#F6C28B"),
    ("ups", "#F2A490"),
    ("patch_panel", "#D9D9D9"),
    ("pc", "#C9B6E4"),
    ("storage", "#F7E59B"),
];

// ─── TypeColors ──────────────────────────────────────────────────────────────

/// Mapping from device type tag to fill color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeColors {
    colors: BTreeMap<String, String>,
}

impl Default for TypeColors {
    fn default() -> Self {
        Self {
            colors: BUILTIN_TYPE_COLORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TypeColors {
    /// Built-in table with `overrides` layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (k, v) in overrides {
            table.colors.insert(k.clone(), v.clone());
        }
        table
    }

    pub fn get(&self, device_type: &str) -> Option<&str> {
        self.colors.get(device_type).map(String::as_str)
    }

    /// Explicit color, else type color, else the default fill.
    ///
    /// A type without a table entry is reported as a diagnostic.
    pub fn resolve(&self, device: &Device, diags: &mut Diagnostics) -> String {
        if let Some(color) = &device.color {
            return color.clone();
        }
        match device.device_type.as_deref() {
            Some(t) => match self.get(t) {
                Some(color) => color.to_string(),
                None => {
                    diags.push(
                        DiagnosticKind::UnknownType,
                        &device.name,
                        format!("type '{t}' has no color; using {DEFAULT_DEVICE_COLOR}"),
                    );
                    DEFAULT_DEVICE_COLOR.to_string()
                }
            },
            None => DEFAULT_DEVICE_COLOR.to_string(),
        }
    }
}

// ─── LineStyle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::Bold => "bold",
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solid" => Ok(LineStyle::Solid),
            "dashed" => Ok(LineStyle::Dashed),
            "dotted" => Ok(LineStyle::Dotted),
            "bold" => Ok(LineStyle::Bold),
            other => Err(format!(
                "unknown line style '{other}'; use solid, dashed, dotted or bold"
            )),
        }
    }
}

// ─── EdgeStyle ───────────────────────────────────────────────────────────────

/// Fully resolved edge styling.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub color: String,
    pub line: LineStyle,
    pub width: f64,
    pub font_size: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_EDGE_COLOR.to_string(),
            line: LineStyle::Solid,
            width: DEFAULT_EDGE_WIDTH,
            font_size: DEFAULT_EDGE_FONT_SIZE,
        }
    }
}

impl EdgeStyle {
    /// Global defaults: built-in values with the `wiring_defaults` section
    /// applied on top.
    pub fn global(overrides: &StyleEntry, diags: &mut Diagnostics) -> Self {
        Self::resolve(&[("wiring_defaults", overrides)], &Self::default(), diags)
    }

    /// Field-wise resolution over `levels`, most specific first, falling
    /// back to `base`. Each attribute is resolved independently.
    ///
    /// A line style that does not parse is reported and skipped, so the
    /// next level decides.
    pub fn resolve(levels: &[(&str, &StyleEntry)], base: &EdgeStyle, diags: &mut Diagnostics) -> Self {
        let color = levels
            .iter()
            .find_map(|(_, l)| l.color.clone())
            .unwrap_or_else(|| base.color.clone());
        let width = levels
            .iter()
            .find_map(|(_, l)| l.width.filter(|w| *w > 0.0))
            .unwrap_or(base.width);
        let font_size = levels
            .iter()
            .find_map(|(_, l)| l.font_size.filter(|s| *s > 0.0))
            .unwrap_or(base.font_size);
        let line = levels
            .iter()
            .find_map(|(subject, l)| {
                let raw = l.style.as_deref()?;
                match raw.parse::<LineStyle>() {
                    Ok(line) => Some(line),
                    Err(msg) => {
                        diags.push(DiagnosticKind::InvalidStyle, *subject, msg);
                        None
                    }
                }
            })
            .unwrap_or(base.line);
        Self {
            color,
            line,
            width,
            font_size,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
