use super::*;
use crate::diagnostics::DiagnosticKind;
use crate::expand::{expand_system, ExpandedSystem};
use crate::layout::types::{LineStyle, DEFAULT_EDGE_COLOR, DEFAULT_EDGE_WIDTH};
use crate::syntax::types::SystemConfig;
use indoc::indoc;

const SYSTEM: &str = indoc! {r##"
    racks:
      - rack: {id: r1, name: Rack 1, total_u: 42}
        front:
          - {name: "GS{N}", start: 1, end: 4, start_u: 42, units: 1, type: switch}
          - {name: PDU, start_u: 10, units: 1, type: pdu}
      - rack: {id: r2, name: Rack 2, total_u: 42}
        front:
          - {name: "IG {N}", start: 1, end: 3, start_u: 42, units: 2, type: gizmo}
    external_devices:
      - name: Operator Room
        devices:
          - {name: Operator PC, type: pc}
    wiring_layers:
      - name: Data
        edge_color: "#0000FF"
        edge_style: dashed
        connections:
          - {from: "GS{N}", to: "GS{N+1}", start: 1, end: 3}
          - {from: GS1, to: Operator PC, label: uplink}
          - {from: GS4, to: "IG 1", edge_color: "#FF0000", width: 4, cable_type: Cat6}
      - name: Power
        show_rack_labels: false
        connections:
          - {from: PDU, to: "GS{N}", start: 1, end: 2, style: dotted}
          - {from: PDU, to: "IG 2", style: sparkly}
"##};

fn expanded() -> ExpandedSystem {
    let cfg: SystemConfig = serde_yaml::from_str(SYSTEM).unwrap();
    expand_system(&cfg).unwrap().value
}

fn build(sys: &ExpandedSystem, layer: usize) -> Result<Checked<WiringTopology>, RackError> {
    let registry = NameRegistry::build(sys.devices.clone()).unwrap();
    let colors = TypeColors::with_overrides(&sys.type_colors);
    let global = EdgeStyle::default();
    let ctx = TopologyContext {
        registry: &registry,
        colors: &colors,
        racks: &sys.racks,
        external_groups: &sys.external_groups,
        global_style: &global,
    };
    build_topology(&sys.layers[layer], &ctx)
}

// ── Construction ──────────────────────────────────────────────────────────

#[test]
fn test_nodes_and_edges_counted() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    // GS1..GS4, Operator PC, IG 1
    assert_eq!(topo.node_count(), 6);
    assert_eq!(topo.edge_count(), 5);
    assert_eq!(topo.edges.len(), 5);
    assert_eq!(topo.edges[0].from, "GS1");
    assert_eq!(topo.edges[2].to, "GS4");
}

#[test]
fn test_unresolved_endpoint_names_layer_and_connection() {
    let mut sys = expanded();
    sys.layers[0].connections[1].to = "Ghost".to_string();
    match build(&sys, 0).unwrap_err() {
        RackError::UnresolvedDevice {
            layer,
            index,
            from,
            device,
            ..
        } => {
            assert_eq!(layer, "Data");
            assert_eq!(index, 2);
            assert_eq!(from, "GS2");
            assert_eq!(device, "Ghost");
        }
        other => panic!("expected UnresolvedDevice, got {other:?}"),
    }
}

// ── Hub classification ────────────────────────────────────────────────────

#[test]
fn test_hub_by_degree() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    // GS1: GS2 + Operator PC
    assert_eq!(topo.degree("GS1"), 2);
    assert!(topo.node("GS1").unwrap().is_hub());
    assert!(topo.node("GS2").unwrap().is_hub());
    assert_eq!(topo.node("Operator PC").unwrap().role, NodeRole::Peripheral);
    assert_eq!(topo.degree("missing"), 0);
}

#[test]
fn test_hub_recomputed_per_layer() {
    let sys = expanded();
    let data = build(&sys, 0).unwrap().value;
    let power = build(&sys, 1).unwrap().value;
    // GS2 has 2 connections in Data and 1 in Power.
    assert_eq!(data.degree("GS2"), 2);
    assert!(data.node("GS2").unwrap().is_hub());
    assert_eq!(power.degree("GS2"), 1);
    assert!(!power.node("GS2").unwrap().is_hub());
    assert!(power.node("PDU").unwrap().is_hub());
    assert_eq!(power.node("PDU").unwrap().degree, 3);
}

// ── Clusters ──────────────────────────────────────────────────────────────

#[test]
fn test_clusters_follow_rack_then_external_order() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    let keys: Vec<&ClusterKey> = topo.clusters.iter().map(|c| &c.key).collect();
    assert_eq!(
        keys,
        vec![
            &ClusterKey::Rack("r1".into()),
            &ClusterKey::Rack("r2".into()),
            &ClusterKey::External("Operator Room".into()),
        ]
    );
    assert_eq!(topo.clusters[0].label, "Rack 1");
    assert_eq!(topo.clusters[2].label, "Operator Room");
}

#[test]
fn test_external_cluster_label_shows_distance() {
    let mut sys = expanded();
    sys.external_groups[0].distance_from_racks = 30.0;
    let topo = build(&sys, 0).unwrap().value;
    assert_eq!(topo.clusters[2].label, "Operator Room (30 m)");
}

#[test]
fn test_cluster_nodes_hubs_first_sorted() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    let names: Vec<&str> = topo.clusters[0]
        .nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    // GS1, GS2, GS3 are hubs; GS4 has GS3 + IG 1 -> also a hub
    assert_eq!(names, vec!["GS1", "GS2", "GS3", "GS4"]);
    let power = build(&sys, 1).unwrap().value;
    let names: Vec<&str> = power.clusters[0]
        .nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["PDU", "GS1", "GS2"]);
    assert!(!power.show_rack_labels);
}

#[test]
fn test_cluster_slug() {
    assert_eq!(ClusterKey::Rack("Rack A".into()).slug(), "rack_a");
    assert_eq!(
        ClusterKey::External("Operator Room/West".into()).slug(),
        "external_operator_room_west"
    );
}

// ── Styles and colors ─────────────────────────────────────────────────────

#[test]
fn test_style_precedence() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    // Layer defaults
    assert_eq!(topo.edges[0].style.color, "#0000FF");
    assert_eq!(topo.edges[0].style.line, LineStyle::Dashed);
    assert_eq!(topo.edges[0].style.width, DEFAULT_EDGE_WIDTH);
    // Connection overrides color and width, keeps the layer's line style
    assert_eq!(topo.edges[4].style.color, "#FF0000");
    assert_eq!(topo.edges[4].style.width, 4.0);
    assert_eq!(topo.edges[4].style.line, LineStyle::Dashed);
}

#[test]
fn test_global_default_when_layer_silent() {
    let sys = expanded();
    let checked = build(&sys, 1).unwrap();
    let power = checked.value;
    assert_eq!(power.edges[0].style.color, DEFAULT_EDGE_COLOR);
    assert_eq!(power.edges[0].style.line, LineStyle::Dotted);
    // "sparkly" is reported and the global solid applies
    assert_eq!(power.edges[2].style.line, LineStyle::Solid);
    assert!(checked.diagnostics.has(DiagnosticKind::InvalidStyle));
}

#[test]
fn test_label_falls_back_to_cable_type() {
    let sys = expanded();
    let topo = build(&sys, 0).unwrap().value;
    assert_eq!(topo.edges[3].label.as_deref(), Some("uplink"));
    assert_eq!(topo.edges[4].label.as_deref(), Some("Cat6"));
    assert_eq!(topo.edges[0].label, None);
}

#[test]
fn test_unknown_type_node_gets_default_color() {
    let sys = expanded();
    let checked = build(&sys, 0).unwrap();
    let ig = checked.value.node("IG 1").unwrap().clone();
    assert_eq!(ig.color, "#FFFFFF");
    assert!(checked.diagnostics.has(DiagnosticKind::UnknownType));
}
