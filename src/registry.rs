//! Name registry — the single lookup point from device name to device.
//!
//! Built once from the expanded configuration and read-only afterwards.
//! Racks, wiring layers and the inventory all resolve names through it, so
//! an unknown name is reported in exactly one way.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::RackError;

// ─── Placement ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Front,
    Rear,
}

impl Panel {
    pub const ALL: [Panel; 2] = [Panel::Front, Panel::Rear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::Front => "front",
            Panel::Rear => "rear",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Front => "Front",
            Panel::Rear => "Rear",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical extent of a positioned device. `start_u` is the top unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start_u: i64,
    pub units: i64,
}

impl Position {
    pub fn bottom_u(&self) -> i64 {
        self.start_u - self.units + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Mounted in (or logically attached to) a rack panel.
    /// `position` is `None` for logical, non-positioned devices.
    Rack {
        rack_id: String,
        panel: Panel,
        position: Option<Position>,
    },
    /// Outside every rack, in a named group.
    External {
        group: String,
        distance_from_racks: f64,
    },
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Rack { rack_id, panel, .. } => write!(f, "rack '{rack_id}' {panel}"),
            Placement::External { group, .. } => write!(f, "external group '{group}'"),
        }
    }
}

// ─── Device ──────────────────────────────────────────────────────────────────

/// A concrete, fully expanded device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub name: String,
    pub device_type: Option<String>,
    /// Explicit color; always wins over the type color.
    pub color: Option<String>,
    pub placement: Placement,
}

impl Device {
    pub fn rack_id(&self) -> Option<&str> {
        match &self.placement {
            Placement::Rack { rack_id, .. } => Some(rack_id),
            Placement::External { .. } => None,
        }
    }

    pub fn panel(&self) -> Option<Panel> {
        match &self.placement {
            Placement::Rack { panel, .. } => Some(*panel),
            Placement::External { .. } => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match &self.placement {
            Placement::Rack { position, .. } => *position,
            Placement::External { .. } => None,
        }
    }
}

// ─── NameRegistry ────────────────────────────────────────────────────────────

/// Lookup failure, surfaced by callers as their own error kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no device named '{0}'")]
pub struct NotFound(pub String);

#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    devices: Vec<Device>,
    index: HashMap<String, usize>,
}

impl NameRegistry {
    /// Index `devices` by name. Any name declared twice is an error.
    pub fn build(devices: impl IntoIterator<Item = Device>) -> Result<Self, RackError> {
        let mut registry = NameRegistry::default();
        for device in devices {
            if let Some(&existing) = registry.index.get(&device.name) {
                return Err(RackError::DuplicateName {
                    name: device.name,
                    first: registry.devices[existing].placement.to_string(),
                    second: device.placement.to_string(),
                });
            }
            registry
                .index
                .insert(device.name.clone(), registry.devices.len());
            registry.devices.push(device);
        }
        debug!("name registry holds {} devices", registry.devices.len());
        Ok(registry)
    }

    pub fn resolve(&self, name: &str) -> Result<&Device, NotFound> {
        self.index
            .get(name)
            .map(|&i| &self.devices[i])
            .ok_or_else(|| NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Devices in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
