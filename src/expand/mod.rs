//! Cluster expansion — raw configuration entries to concrete items.
//!
//! Rack devices, external devices, wiring connections and inventory entries
//! all go through the same `ClusterRange` + `Template` primitive; only the
//! fields that get templated differ.

pub mod placeholder;

use std::collections::{BTreeMap, HashSet};

use log::{debug, info};

use crate::diagnostics::{Checked, DiagnosticKind, Diagnostics};
use crate::error::RackError;
use crate::registry::{Device, Panel, Placement, Position};
use crate::syntax::types::{
    ConnectionEntry, DeviceEntry, ExternalEntry, InventoryEntryRaw, PortEntry, RackEntry,
    RackHeader, StyleEntry, SystemConfig, WiringLayerEntry, DEFAULT_EXTERNAL_GROUP,
};

pub use placeholder::{stacked_start_u, substitute, ClusterRange, Template};

// ─── Expanded types ──────────────────────────────────────────────────────────

/// Layout tuning copied from the rack header.
#[derive(Debug, Clone, PartialEq)]
pub struct RackStyle {
    pub table_width: u32,
    pub device_width: u32,
    pub u_col_width: u32,
    pub device_font_size: f64,
    pub unit_font_size: f64,
    pub title_font_size: f64,
    pub auto_scale_font: bool,
}

impl From<&RackHeader> for RackStyle {
    fn from(h: &RackHeader) -> Self {
        Self {
            table_width: h.table_width,
            device_width: h.device_width,
            u_col_width: h.u_col_width,
            device_font_size: h.device_font_size,
            unit_font_size: h.unit_font_size,
            title_font_size: h.title_font_size,
            auto_scale_font: h.auto_scale_font,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rack {
    pub id: String,
    pub name: String,
    pub total_u: u32,
    pub style: RackStyle,
    /// Device names per panel in declaration order; `None` when the panel
    /// is not declared at all.
    pub front: Option<Vec<String>>,
    pub rear: Option<Vec<String>>,
}

impl Rack {
    pub fn panel(&self, panel: Panel) -> Option<&[String]> {
        match panel {
            Panel::Front => self.front.as_deref(),
            Panel::Rear => self.rear.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalGroup {
    pub name: String,
    pub distance_from_racks: f64,
    pub devices: Vec<String>,
}

/// One concrete edge of a wiring layer, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub cable_type: Option<String>,
    /// Per-connection style overrides.
    pub style: StyleEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WiringLayer {
    pub name: String,
    /// Layer-level edge style defaults.
    pub style: StyleEntry,
    pub node_font_size: Option<f64>,
    pub show_rack_labels: bool,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub device_name: String,
    pub part_number: String,
    pub ports: Vec<PortEntry>,
}

/// Cable-length tuning scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableParams {
    pub slack: f64,
    pub u_height: f64,
    pub front_to_back: f64,
    pub inter_rack_distance: f64,
}

/// Everything the model builders need, fully expanded.
#[derive(Debug, Clone)]
pub struct ExpandedSystem {
    pub racks: Vec<Rack>,
    pub external_groups: Vec<ExternalGroup>,
    /// Every declared device in declaration order, racks first.
    pub devices: Vec<Device>,
    pub layers: Vec<WiringLayer>,
    pub inventory: Vec<InventoryEntry>,
    pub type_colors: BTreeMap<String, String>,
    pub wiring_defaults: StyleEntry,
    pub cable: CableParams,
}

// ─── Whole document ──────────────────────────────────────────────────────────

/// Expand every cluster template in the document.
pub fn expand_system(cfg: &SystemConfig) -> Result<Checked<ExpandedSystem>, RackError> {
    let mut diags = Diagnostics::new();
    let mut devices = Vec::new();
    let mut racks = Vec::with_capacity(cfg.racks.len());
    let mut seen_ids = HashSet::new();

    for entry in &cfg.racks {
        let rack = expand_rack(entry, &mut devices, &mut diags)?;
        if !seen_ids.insert(rack.id.clone()) {
            return Err(RackError::configuration(
                format!("rack '{}'", rack.id),
                "rack id is declared more than once",
            ));
        }
        racks.push(rack);
    }

    let external_groups = expand_external(&cfg.external_devices, &mut devices)?;

    let layers = cfg
        .wiring_layers
        .iter()
        .map(expand_layer)
        .collect::<Result<Vec<_>, _>>()?;

    let inventory = expand_inventory(&cfg.computer_info)?;

    info!(
        "expanded {} racks, {} devices, {} wiring layers, {} inventory entries",
        racks.len(),
        devices.len(),
        layers.len(),
        inventory.len()
    );

    Ok(Checked::new(
        ExpandedSystem {
            racks,
            external_groups,
            devices,
            layers,
            inventory,
            type_colors: cfg.type_colors.clone(),
            wiring_defaults: cfg.wiring_defaults.clone(),
            cable: CableParams {
                slack: cfg.cable_slack_length,
                u_height: cfg.standard_u_height,
                front_to_back: cfg.front_to_back_length,
                inter_rack_distance: cfg.inter_rack_distance,
            },
        },
        diags,
    ))
}

// ─── Racks ───────────────────────────────────────────────────────────────────

fn expand_rack(
    entry: &RackEntry,
    devices: &mut Vec<Device>,
    diags: &mut Diagnostics,
) -> Result<Rack, RackError> {
    let header = &entry.rack;
    if header.total_u < 1 || header.total_u > i64::from(u32::MAX) {
        return Err(RackError::configuration(
            format!("rack '{}'", header.id),
            format!("total_u must be a positive integer, got {}", header.total_u),
        ));
    }

    let mut panel_names = |panel: Panel, list: &Option<Vec<DeviceEntry>>| {
        list.as_ref()
            .map(|entries| -> Result<Vec<String>, RackError> {
                let mut names = Vec::new();
                for entry in entries {
                    for decl in expand_device(entry)? {
                        let position = decl.position(diags)?;
                        names.push(decl.name.clone());
                        devices.push(Device {
                            name: decl.name,
                            device_type: decl.device_type,
                            color: decl.color,
                            placement: Placement::Rack {
                                rack_id: header.id.clone(),
                                panel,
                                position,
                            },
                        });
                    }
                }
                Ok(names)
            })
            .transpose()
    };

    let front = panel_names(Panel::Front, &entry.front)?;
    let rear = panel_names(Panel::Rear, &entry.rear)?;
    debug!(
        "rack '{}': {} front, {} rear devices",
        header.id,
        front.as_ref().map_or(0, Vec::len),
        rear.as_ref().map_or(0, Vec::len)
    );

    Ok(Rack {
        id: header.id.clone(),
        name: header.name.clone().unwrap_or_else(|| header.id.clone()),
        total_u: header.total_u as u32,
        style: RackStyle::from(header),
        front,
        rear,
    })
}

/// A device entry after cluster expansion, before it is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDecl {
    pub name: String,
    pub device_type: Option<String>,
    pub color: Option<String>,
    pub start_u: Option<i64>,
    pub units: Option<i64>,
}

impl DeviceDecl {
    /// Rack position, if the declaration has one.
    fn position(&self, diags: &mut Diagnostics) -> Result<Option<Position>, RackError> {
        match (self.start_u, self.units) {
            (Some(start_u), Some(units)) => {
                if units < 1 {
                    return Err(RackError::configuration(
                        format!("device '{}'", self.name),
                        format!("units must be at least 1, got {units}"),
                    ));
                }
                Ok(Some(Position { start_u, units }))
            }
            (Some(_), None) => Err(RackError::configuration(
                format!("device '{}'", self.name),
                "positioned device (start_u) needs 'units'",
            )),
            (None, Some(_)) => {
                diags.push(
                    DiagnosticKind::UnpositionedDevice,
                    &self.name,
                    "has 'units' but no 'start_u'; treated as logical",
                );
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }
}

/// Expand one device entry. Non-cluster entries pass through unchanged.
pub fn expand_device(entry: &DeviceEntry) -> Result<Vec<DeviceDecl>, RackError> {
    let context = format!("device '{}'", entry.name);
    let Some(range) = ClusterRange::from_keys(entry.start, entry.end, &context)? else {
        return Ok(vec![DeviceDecl {
            name: entry.name.clone(),
            device_type: entry.device_type.clone(),
            color: entry.color.clone(),
            start_u: entry.start_u,
            units: entry.units,
        }]);
    };

    let name = Template::parse(&entry.name)?;
    let spacing = entry.spacing.unwrap_or(0);
    range.expand(|index, step| {
        let start_u = match (entry.start_u, entry.units) {
            (Some(base), Some(units)) => Some(stacked_start_u(base, step, units, spacing)?),
            (base, _) => base,
        };
        Ok(DeviceDecl {
            name: name.render(index)?,
            device_type: entry.device_type.clone(),
            color: entry.color.clone(),
            start_u,
            units: entry.units,
        })
    })
}

// ─── External devices ────────────────────────────────────────────────────────

fn expand_external(
    entries: &[ExternalEntry],
    devices: &mut Vec<Device>,
) -> Result<Vec<ExternalGroup>, RackError> {
    let mut groups: Vec<ExternalGroup> = Vec::new();

    let mut add = |group_name: &str, distance: f64, entry: &DeviceEntry| -> Result<(), RackError> {
        let decls = expand_device(entry)?;
        let idx = match groups.iter().position(|g| g.name == group_name) {
            Some(idx) => idx,
            None => {
                groups.push(ExternalGroup {
                    name: group_name.to_string(),
                    distance_from_racks: distance,
                    devices: Vec::new(),
                });
                groups.len() - 1
            }
        };
        for decl in decls {
            groups[idx].devices.push(decl.name.clone());
            devices.push(Device {
                name: decl.name,
                device_type: decl.device_type,
                color: decl.color,
                placement: Placement::External {
                    group: group_name.to_string(),
                    distance_from_racks: distance,
                },
            });
        }
        Ok(())
    };

    for entry in entries {
        match entry {
            ExternalEntry::Group(group) => {
                let distance = group.distance_from_racks.unwrap_or(0.0);
                for dev in &group.devices {
                    add(&group.name, distance, dev)?;
                }
            }
            ExternalEntry::Device(flat) => {
                let distance = flat.distance_from_racks.unwrap_or(0.0);
                add(DEFAULT_EXTERNAL_GROUP, distance, &flat.device)?;
            }
        }
    }
    Ok(groups)
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

fn expand_layer(entry: &WiringLayerEntry) -> Result<WiringLayer, RackError> {
    let mut connections = Vec::new();
    for conn in &entry.connections {
        connections.extend(expand_connection(conn, entry.cable_type.as_deref())?);
    }
    debug!(
        "layer '{}': {} connections after expansion",
        entry.name,
        connections.len()
    );
    Ok(WiringLayer {
        name: entry.name.clone(),
        style: StyleEntry {
            color: entry.edge_color.clone(),
            style: entry.edge_style.clone(),
            width: entry.edge_width,
            font_size: entry
                .edge_font_size
                .or(entry.font_size.map(|size| size - 3.0)),
        },
        node_font_size: entry.font_size,
        show_rack_labels: entry.show_rack_labels,
        connections,
    })
}

/// Expand one connection entry: every `to` target, then every index.
pub fn expand_connection(
    entry: &ConnectionEntry,
    layer_cable_type: Option<&str>,
) -> Result<Vec<Connection>, RackError> {
    let overrides = StyleEntry {
        color: entry.edge_color.clone().or_else(|| entry.color.clone()),
        style: entry.style.clone(),
        width: entry.width,
        font_size: entry.font_size,
    };
    let cable_type = entry
        .cable_type
        .clone()
        .or_else(|| layer_cable_type.map(str::to_string));
    let make = |from: String, to: String| Connection {
        from,
        to,
        label: entry.label.clone(),
        cable_type: cable_type.clone(),
        style: overrides.clone(),
    };

    let context = format!("connection '{}'", entry.from);
    let Some(range) = ClusterRange::from_keys(entry.start, entry.end, &context)? else {
        return Ok(entry
            .to
            .as_slice()
            .iter()
            .map(|to| make(entry.from.clone(), to.clone()))
            .collect());
    };

    let from = Template::parse(&entry.from)?;
    let mut out = Vec::with_capacity(range.len().saturating_mul(entry.to.as_slice().len()));
    for to in entry.to.as_slice() {
        let to = Template::parse(to)?;
        out.extend(range.expand(|index, _| Ok(make(from.render(index)?, to.render(index)?)))?);
    }
    Ok(out)
}

// ─── Inventory ───────────────────────────────────────────────────────────────

fn expand_inventory(entries: &[InventoryEntryRaw]) -> Result<Vec<InventoryEntry>, RackError> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend(expand_inventory_entry(entry)?);
    }
    Ok(out)
}

/// Expand one `computer_info` entry. Only `device_name` and port `ip`
/// carry placeholders; `adapter` and `mac` are copied verbatim.
pub fn expand_inventory_entry(entry: &InventoryEntryRaw) -> Result<Vec<InventoryEntry>, RackError> {
    let context = format!("computer_info entry '{}'", entry.device_name);
    let Some(range) = ClusterRange::from_keys(entry.start, entry.end, &context)? else {
        return Ok(vec![InventoryEntry {
            device_name: entry.device_name.clone(),
            part_number: entry.arena_part_number.clone(),
            ports: entry.ethernet_ports.clone(),
        }]);
    };

    let name = Template::parse(&entry.device_name)?;
    let ips = entry
        .ethernet_ports
        .iter()
        .map(|port| Template::parse(&port.ip))
        .collect::<Result<Vec<_>, _>>()?;

    range.expand(|index, _| {
        let ports = entry
            .ethernet_ports
            .iter()
            .zip(&ips)
            .map(|(port, ip)| {
                Ok(PortEntry {
                    adapter: port.adapter.clone(),
                    ip: ip.render(index)?,
                    mac: port.mac.clone(),
                })
            })
            .collect::<Result<Vec<_>, RackError>>()?;
        Ok(InventoryEntry {
            device_name: name.render(index)?,
            part_number: entry.arena_part_number.clone(),
            ports,
        })
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
