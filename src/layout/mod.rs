//! Model builders — rack elevations, wiring topologies and cable runs.
//!
//! Every builder reads the expanded system and the name registry and never
//! mutates either, so racks and layers are built independently.

pub mod cable;
pub mod elevation;
pub mod topology;
pub mod types;

pub use cable::{CableRun, CableTable, build_cable_table};
pub use elevation::{PanelElevation, RackElevation, Row, Segment, build_elevations};
pub use topology::{
    ClusterKey, NodeRole, TopologyCluster, TopologyContext, TopologyEdge, TopologyNode,
    WiringTopology, build_topology,
};
pub use types::{EdgeStyle, LineStyle, TypeColors};
