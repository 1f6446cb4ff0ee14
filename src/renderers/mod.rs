//! Renderers and the Renderer trait.
//!
//! Models in, text out. Nothing here touches the filesystem; artifacts are
//! returned by name and written by the caller.

pub mod dot;
pub mod table;

pub use dot::DotRenderer;
pub use table::{CsvRenderer, HtmlRenderer};

use crate::error::RackError;
use crate::layout::topology::slug;

pub const RACK_LAYOUT_FILE: &str = "rack_layout.dot";
pub const INVENTORY_CSV_FILE: &str = "computer_info.csv";
pub const INVENTORY_HTML_FILE: &str = "computer_info.html";
pub const CABLE_CSV_FILE: &str = "cable_lengths.csv";
pub const CABLE_HTML_FILE: &str = "cable_lengths.html";

/// Trait for model renderers. One renderer may handle several models.
pub trait Renderer<M: ?Sized> {
    /// Render `model` to the text of one artifact.
    fn render(&self, model: &M) -> Result<String, RackError>;
}

/// A generated output file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name relative to the output directory.
    pub name: String,
    pub contents: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn is_dot(&self) -> bool {
        self.name.ends_with(".dot")
    }
}

/// Escape text for HTML and DOT HTML-like labels.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// File name of a wiring layer's diagram.
pub fn layer_file_name(layer: &str) -> String {
    format!("{}.dot", slug(layer))
}
