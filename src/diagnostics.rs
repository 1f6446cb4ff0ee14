//! Recoverable diagnostics collected alongside model values.
//!
//! A `Checked<T>` carries a value plus every warning raised while building
//! it. Nothing in here ever aborts a run.

use std::fmt;

use log::warn;

// ─── Diagnostic ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Device `type` has no entry in the type color table.
    UnknownType,
    /// Styling value that could not be interpreted; the next level applies.
    InvalidStyle,
    /// Device declared with `units` but no `start_u`; kept as logical.
    UnpositionedDevice,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnknownType => "unknown-type",
            DiagnosticKind::InvalidStyle => "invalid-style",
            DiagnosticKind::UnpositionedDevice => "unpositioned-device",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// What the diagnostic is about (device name, layer name, ...).
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.subject, self.message)
    }
}

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// Ordered, de-duplicated list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Identical entries are kept once.
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diag = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        if !self.items.contains(&diag) {
            self.items.push(diag);
        }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        for diag in other.items {
            if !self.items.contains(&diag) {
                self.items.push(diag);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }

    /// Emit every diagnostic through the `log` facade at warn level.
    pub fn log_all(&self) {
        for diag in &self.items {
            warn!("{diag}");
        }
    }
}

// ─── Checked ─────────────────────────────────────────────────────────────────

/// A value together with the diagnostics raised while producing it.
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Checked<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    /// Move the diagnostics into `sink` and return the bare value.
    pub fn unpack_into(self, sink: &mut Diagnostics) -> T {
        sink.extend(self.diagnostics);
        self.value
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
