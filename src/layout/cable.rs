//! Cable length estimates for every resolved connection.
//!
//! Length = vertical run + front-to-back crossing + rack-to-rack run + slack,
//! rounded up to the next half metre.

use std::collections::HashMap;

use log::debug;

use crate::error::RackError;
use crate::expand::{CableParams, Rack};
use crate::layout::topology::WiringTopology;
use crate::registry::{Device, NameRegistry};

/// Rack column shown for devices that live outside every rack.
pub const EXTERNAL_RACK_LABEL: &str = "external";
/// Minimum lengths are rounded up to a multiple of this, in metres.
pub const LENGTH_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct CableRun {
    pub layer: String,
    pub from: String,
    pub to: String,
    pub cable_type: Option<String>,
    pub from_rack: String,
    pub to_rack: String,
    pub unit_delta: i64,
    pub unit_length: f64,
    pub front_to_back: f64,
    pub inter_rack: f64,
    pub slack: f64,
    pub min_length: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CableTable {
    /// Layer order, then connection order.
    pub runs: Vec<CableRun>,
}

/// Rack id to (declaration position, display name).
struct RackIndex<'a> {
    racks: HashMap<&'a str, (usize, &'a str)>,
}

impl<'a> RackIndex<'a> {
    fn new(racks: &'a [Rack]) -> Self {
        Self {
            racks: racks
                .iter()
                .enumerate()
                .map(|(i, r)| (r.id.as_str(), (i, r.name.as_str())))
                .collect(),
        }
    }

    fn position(&self, id: &str) -> usize {
        self.racks.get(id).map_or(0, |(pos, _)| *pos)
    }

    fn label(&self, device: &Device) -> String {
        match device.rack_id() {
            Some(id) => self.racks.get(id).map_or(id, |(_, name)| *name).to_string(),
            None => EXTERNAL_RACK_LABEL.to_string(),
        }
    }
}

/// Round `length` up to the next multiple of [`LENGTH_STEP`].
pub fn round_up_length(length: f64) -> f64 {
    (length / LENGTH_STEP).ceil() * LENGTH_STEP
}

/// Estimate one run. The `layer`, `from`, `to` and `cable_type` columns
/// are filled from the devices and left for the caller to adjust.
fn estimate(from: &Device, to: &Device, racks: &RackIndex<'_>, params: &CableParams) -> CableRun {
    let (unit_delta, front_to_back, inter_rack) = match (from.rack_id(), to.rack_id()) {
        (Some(a), Some(b)) if a != b => {
            let to_floor = |d: &Device| d.position().map_or(0, |p| p.start_u - 1);
            let racks_apart = racks.position(a).abs_diff(racks.position(b));
            (
                to_floor(from) + to_floor(to),
                0.0,
                racks_apart as f64 * params.inter_rack_distance,
            )
        }
        (same_a, same_b) => {
            let unit_delta = match (from.position(), to.position()) {
                (Some(a), Some(b)) => (a.bottom_u() - b.bottom_u()).abs(),
                _ => 0,
            };
            let crosses = same_a.is_some() && same_a == same_b && from.panel() != to.panel();
            let f2b = if crosses { params.front_to_back } else { 0.0 };
            (unit_delta, f2b, 0.0)
        }
    };

    let unit_length = unit_delta as f64 * params.u_height;
    CableRun {
        layer: String::new(),
        from: from.name.clone(),
        to: to.name.clone(),
        cable_type: None,
        from_rack: racks.label(from),
        to_rack: racks.label(to),
        unit_delta,
        unit_length,
        front_to_back,
        inter_rack,
        slack: params.slack,
        min_length: round_up_length(unit_length + front_to_back + inter_rack + params.slack),
    }
}

/// Estimate cables for every edge of the given topologies.
pub fn build_cable_table(
    topologies: &[&WiringTopology],
    registry: &NameRegistry,
    racks: &[Rack],
    params: &CableParams,
) -> Result<CableTable, RackError> {
    let index = RackIndex::new(racks);
    let mut runs = Vec::new();
    for topo in topologies {
        for (i, edge) in topo.edges.iter().enumerate() {
            let lookup = |name: &str| {
                registry.resolve(name).map_err(|e| RackError::UnresolvedDevice {
                    layer: topo.layer.clone(),
                    index: i + 1,
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    device: e.0,
                })
            };
            let mut run = estimate(lookup(&edge.from)?, lookup(&edge.to)?, &index, params);
            run.layer = topo.layer.clone();
            run.cable_type = edge.cable_type.clone();
            runs.push(run);
        }
    }
    debug!("estimated {} cable runs", runs.len());
    Ok(CableTable { runs })
}
