//! Wiring topology — one undirected graph per wiring layer.
//!
//! Connections are resolved through the name registry into a petgraph
//! `UnGraph`; node degree decides hub vs. peripheral, and nodes are grouped
//! into clusters by owning rack (or external group).

use std::collections::HashMap;

use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::diagnostics::{Checked, Diagnostics};
use crate::error::RackError;
use crate::expand::{ExternalGroup, Rack, WiringLayer};
use crate::layout::types::{DEFAULT_NODE_FONT_SIZE, EdgeStyle, TypeColors};
use crate::registry::{NameRegistry, Placement};

/// Devices with more connections than this are hubs.
pub const HUB_DEGREE_THRESHOLD: usize = 1;

// ─── Graph payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub cluster: ClusterKey,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Position of the connection in the expanded layer.
    pub index: usize,
    pub label: Option<String>,
    pub cable_type: Option<String>,
    pub style: EdgeStyle,
}

// ─── Output types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusterKey {
    Rack(String),
    External(String),
}

impl ClusterKey {
    /// Identifier safe for use as a DOT subgraph name suffix.
    pub fn slug(&self) -> String {
        match self {
            ClusterKey::Rack(id) => slug(id),
            ClusterKey::External(group) => format!("external_{}", slug(group)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Hub,
    Peripheral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyNode {
    pub name: String,
    pub role: NodeRole,
    pub degree: usize,
    pub color: String,
}

impl TopologyNode {
    pub fn is_hub(&self) -> bool {
        self.role == NodeRole::Hub
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyCluster {
    pub key: ClusterKey,
    pub label: String,
    /// Hubs first, then peripherals; each group sorted by name.
    pub nodes: Vec<TopologyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
    /// Explicit label, else the cable type.
    pub label: Option<String>,
    pub cable_type: Option<String>,
    pub style: EdgeStyle,
}

/// Renderable model of one wiring layer.
#[derive(Debug, Clone)]
pub struct WiringTopology {
    pub layer: String,
    pub node_font_size: f64,
    pub show_rack_labels: bool,
    pub graph: UnGraph<NodeData, EdgeData>,
    pub node_index: HashMap<String, NodeIndex>,
    pub clusters: Vec<TopologyCluster>,
    /// In connection order.
    pub edges: Vec<TopologyEdge>,
}

impl WiringTopology {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Connection degree of `name` in this layer; 0 if absent.
    pub fn degree(&self, name: &str) -> usize {
        match self.node_index.get(name) {
            None => 0,
            Some(&idx) => self.graph.edges(idx).count(),
        }
    }

    pub fn node(&self, name: &str) -> Option<&TopologyNode> {
        self.clusters
            .iter()
            .flat_map(|c| c.nodes.iter())
            .find(|n| n.name == name)
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Context shared by every layer of one run.
pub struct TopologyContext<'a> {
    pub registry: &'a NameRegistry,
    pub colors: &'a TypeColors,
    pub racks: &'a [Rack],
    pub external_groups: &'a [ExternalGroup],
    pub global_style: &'a EdgeStyle,
}

impl TopologyContext<'_> {
    fn cluster_order(&self, key: &ClusterKey) -> usize {
        match key {
            ClusterKey::Rack(id) => self
                .racks
                .iter()
                .position(|r| &r.id == id)
                .unwrap_or(self.racks.len()),
            ClusterKey::External(group) => {
                self.racks.len()
                    + self
                        .external_groups
                        .iter()
                        .position(|g| &g.name == group)
                        .unwrap_or(self.external_groups.len())
            }
        }
    }

    fn cluster_label(&self, key: &ClusterKey) -> String {
        match key {
            ClusterKey::Rack(id) => self
                .racks
                .iter()
                .find(|r| &r.id == id)
                .map_or_else(|| id.clone(), |r| r.name.clone()),
            ClusterKey::External(group) => match self
                .external_groups
                .iter()
                .find(|g| &g.name == group)
            {
                Some(g) if g.distance_from_racks > 0.0 => {
                    format!("{} ({} m)", g.name, g.distance_from_racks)
                }
                _ => group.clone(),
            },
        }
    }
}

/// Build the topology of one layer.
pub fn build_topology(
    layer: &WiringLayer,
    ctx: &TopologyContext<'_>,
) -> Result<Checked<WiringTopology>, RackError> {
    let mut diags = Diagnostics::new();
    let mut graph: UnGraph<NodeData, EdgeData> = UnGraph::new_undirected();
    let mut node_index: HashMap<String, NodeIndex> = HashMap::new();
    let mut edges = Vec::with_capacity(layer.connections.len());

    let layer_subject = format!("layer '{}'", layer.name);
    for (index, conn) in layer.connections.iter().enumerate() {
        let mut endpoint = |name: &str| -> Result<NodeIndex, RackError> {
            if let Some(&idx) = node_index.get(name) {
                return Ok(idx);
            }
            let device = ctx
                .registry
                .resolve(name)
                .map_err(|e| RackError::UnresolvedDevice {
                    layer: layer.name.clone(),
                    index: index + 1,
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                    device: e.0,
                })?;
            let cluster = match &device.placement {
                Placement::Rack { rack_id, .. } => ClusterKey::Rack(rack_id.clone()),
                Placement::External { group, .. } => ClusterKey::External(group.clone()),
            };
            let idx = graph.add_node(NodeData {
                name: name.to_string(),
                cluster,
                color: ctx.colors.resolve(device, &mut diags),
            });
            node_index.insert(name.to_string(), idx);
            Ok(idx)
        };
        let a = endpoint(&conn.from)?;
        let b = endpoint(&conn.to)?;

        let conn_subject = format!("{layer_subject} connection #{}", index + 1);
        let style = EdgeStyle::resolve(
            &[(conn_subject.as_str(), &conn.style), (layer_subject.as_str(), &layer.style)],
            ctx.global_style,
            &mut diags,
        );
        let label = conn.label.clone().or_else(|| conn.cable_type.clone());
        graph.add_edge(
            a,
            b,
            EdgeData {
                index,
                label: label.clone(),
                cable_type: conn.cable_type.clone(),
                style: style.clone(),
            },
        );
        edges.push(TopologyEdge {
            from: conn.from.clone(),
            to: conn.to.clone(),
            label,
            cable_type: conn.cable_type.clone(),
            style,
        });
    }

    let clusters = group_clusters(&graph, ctx);
    debug!(
        "layer '{}': {} nodes, {} edges, {} clusters",
        layer.name,
        graph.node_count(),
        graph.edge_count(),
        clusters.len()
    );

    Ok(Checked::new(
        WiringTopology {
            layer: layer.name.clone(),
            node_font_size: layer.node_font_size.unwrap_or(DEFAULT_NODE_FONT_SIZE),
            show_rack_labels: layer.show_rack_labels,
            graph,
            node_index,
            clusters,
            edges,
        },
        diags,
    ))
}

/// Partition nodes by cluster key, tagging hubs by degree.
fn group_clusters(
    graph: &UnGraph<NodeData, EdgeData>,
    ctx: &TopologyContext<'_>,
) -> Vec<TopologyCluster> {
    let mut clusters: Vec<TopologyCluster> = Vec::new();
    for idx in graph.node_indices() {
        let data = &graph[idx];
        let degree = graph.edges(idx).count();
        let role = if degree > HUB_DEGREE_THRESHOLD {
            NodeRole::Hub
        } else {
            NodeRole::Peripheral
        };
        let node = TopologyNode {
            name: data.name.clone(),
            role,
            degree,
            color: data.color.clone(),
        };
        match clusters.iter_mut().find(|c| c.key == data.cluster) {
            Some(cluster) => cluster.nodes.push(node),
            None => clusters.push(TopologyCluster {
                key: data.cluster.clone(),
                label: ctx.cluster_label(&data.cluster),
                nodes: vec![node],
            }),
        }
    }

    clusters.sort_by_key(|c| ctx.cluster_order(&c.key));
    for cluster in &mut clusters {
        cluster
            .nodes
            .sort_by(|a, b| b.is_hub().cmp(&a.is_hub()).then_with(|| a.name.cmp(&b.name)));
    }
    clusters
}

/// Lower-case identifier with spaces and slashes replaced by `_`.
pub fn slug(name: &str) -> String {
    name.replace([' ', '/'], "_").to_lowercase()
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout_topology.rs"]
mod tests;
