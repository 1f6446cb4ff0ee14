//! Rack elevation — per-panel unit occupancy and render geometry.
//!
//! For every rack panel, walk the units from the top (`total_u`) down to U1
//! and emit one row per free unit and one segment per device, after
//! checking that every device fits the rack and no two devices share a unit.

use log::debug;

use crate::diagnostics::{Checked, Diagnostics};
use crate::error::RackError;
use crate::expand::{Rack, RackStyle};
use crate::layout::types::TypeColors;
use crate::registry::{NameRegistry, Panel, Position};

/// Font growth per rack unit above 1U, as a fraction of the base size.
pub const FONT_STEP_PER_U: f64 = 0.1;
/// Upper bound on the auto-scaled font, as a multiple of the base size.
pub const MAX_FONT_MULTIPLIER: f64 = 1.5;

// ─── Output types ─────────────────────────────────────────────────────────────

/// A device occupying `top_u..=bottom_u` on one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub device: String,
    pub top_u: u32,
    pub bottom_u: u32,
    pub units: u32,
    pub color: String,
    pub font_size: f64,
}

impl Segment {
    /// Number of table rows the device cell spans.
    pub fn row_span(&self) -> u32 {
        self.units
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Empty { unit: u32 },
    Device(Segment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelElevation {
    pub panel: Panel,
    /// Top to bottom. A `Row::Device` stands for all units it spans.
    pub rows: Vec<Row>,
}

impl PanelElevation {
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.rows.iter().filter_map(|row| match row {
            Row::Device(seg) => Some(seg),
            Row::Empty { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RackElevation {
    pub rack_id: String,
    pub name: String,
    pub total_u: u32,
    pub style: RackStyle,
    /// Declared panels only, front before rear.
    pub panels: Vec<PanelElevation>,
}

// ─── Builders ────────────────────────────────────────────────────────────────

/// Build elevations for every rack, in declaration order.
pub fn build_elevations(
    racks: &[Rack],
    registry: &NameRegistry,
    colors: &TypeColors,
) -> Result<Checked<Vec<RackElevation>>, RackError> {
    let mut diags = Diagnostics::new();
    let mut out = Vec::with_capacity(racks.len());
    for rack in racks {
        out.push(build_rack(rack, registry, colors)?.unpack_into(&mut diags));
    }
    Ok(Checked::new(out, diags))
}

pub fn build_rack(
    rack: &Rack,
    registry: &NameRegistry,
    colors: &TypeColors,
) -> Result<Checked<RackElevation>, RackError> {
    let mut diags = Diagnostics::new();
    let mut panels = Vec::new();
    for panel in Panel::ALL {
        if let Some(names) = rack.panel(panel) {
            panels.push(build_panel(rack, panel, names, registry, colors, &mut diags)?);
        }
    }
    Ok(Checked::new(
        RackElevation {
            rack_id: rack.id.clone(),
            name: rack.name.clone(),
            total_u: rack.total_u,
            style: rack.style.clone(),
            panels,
        },
        diags,
    ))
}

/// Scaled device-name font. Grows with height, capped.
pub fn device_font_size(style: &RackStyle, units: u32) -> f64 {
    if !style.auto_scale_font {
        return style.device_font_size;
    }
    let extra = f64::from(units.saturating_sub(1));
    let multiplier = (1.0 + FONT_STEP_PER_U * extra).min(MAX_FONT_MULTIPLIER);
    style.device_font_size * multiplier
}

struct Placed<'a> {
    name: &'a str,
    pos: Position,
    color: String,
}

fn build_panel(
    rack: &Rack,
    panel: Panel,
    names: &[String],
    registry: &NameRegistry,
    colors: &TypeColors,
    diags: &mut Diagnostics,
) -> Result<PanelElevation, RackError> {
    let total_u = i64::from(rack.total_u);

    let mut placed: Vec<Placed> = Vec::new();
    for name in names {
        let device = registry
            .resolve(name)
            .map_err(|e| RackError::configuration(format!("rack '{}'", rack.id), e.to_string()))?;
        let Some(pos) = device.position() else {
            continue;
        };
        if pos.start_u > total_u || pos.bottom_u() < 1 {
            return Err(RackError::OutOfBounds {
                rack: rack.id.clone(),
                panel: panel.to_string(),
                device: name.clone(),
                top: pos.start_u,
                bottom: pos.bottom_u(),
                total_u: rack.total_u,
            });
        }
        placed.push(Placed {
            name,
            pos,
            color: colors.resolve(device, diags),
        });
    }
    // Stable: equal tops keep declaration order.
    placed.sort_by(|a, b| b.pos.start_u.cmp(&a.pos.start_u));

    // occupancy[u] = index into `placed`; index 0 unused.
    let mut occupancy: Vec<Option<usize>> = vec![None; rack.total_u as usize + 1];
    for (i, dev) in placed.iter().enumerate() {
        for u in dev.pos.bottom_u()..=dev.pos.start_u {
            if let Some(j) = occupancy[u as usize] {
                let other = &placed[j];
                return Err(RackError::Overlap {
                    rack: rack.id.clone(),
                    panel: panel.to_string(),
                    first: other.name.to_string(),
                    second: dev.name.to_string(),
                    low: dev.pos.bottom_u().max(other.pos.bottom_u()),
                    high: dev.pos.start_u.min(other.pos.start_u),
                });
            }
            occupancy[u as usize] = Some(i);
        }
    }

    let mut rows = Vec::new();
    let mut u = rack.total_u;
    while u >= 1 {
        match occupancy[u as usize] {
            None => {
                rows.push(Row::Empty { unit: u });
                u -= 1;
            }
            Some(i) => {
                let dev = &placed[i];
                let units = dev.pos.units as u32;
                rows.push(Row::Device(Segment {
                    device: dev.name.to_string(),
                    top_u: u,
                    bottom_u: u + 1 - units,
                    units,
                    color: dev.color.clone(),
                    font_size: device_font_size(&rack.style, units),
                }));
                u -= units;
            }
        }
    }

    debug!(
        "rack '{}' {panel}: {} devices placed in {}U",
        rack.id,
        placed.len(),
        rack.total_u
    );
    Ok(PanelElevation { panel, rows })
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout_elevation.rs"]
mod tests;
