use super::*;
use crate::diagnostics::DiagnosticKind;
use crate::layout::types::DEFAULT_DEVICE_COLOR;
use crate::registry::{Device, Placement};

fn style(auto_scale_font: bool) -> RackStyle {
    RackStyle {
        table_width: 240,
        device_width: 200,
        u_col_width: 28,
        device_font_size: 10.0,
        unit_font_size: 15.0,
        title_font_size: 16.0,
        auto_scale_font,
    }
}

/// (name, start_u, units, type); `start_u == 0` means logical.
type Decl<'a> = (&'a str, i64, i64, Option<&'a str>);

fn make_rack(total_u: u32, front: &[Decl], rear: Option<&[Decl]>) -> (Rack, NameRegistry) {
    let mut devices = Vec::new();
    let mut names_for = |panel: Panel, decls: &[Decl]| -> Vec<String> {
        decls
            .iter()
            .map(|(name, start_u, units, t)| {
                devices.push(Device {
                    name: name.to_string(),
                    device_type: t.map(str::to_string),
                    color: None,
                    placement: Placement::Rack {
                        rack_id: "r1".into(),
                        panel,
                        position: (*start_u != 0).then_some(Position {
                            start_u: *start_u,
                            units: *units,
                        }),
                    },
                });
                name.to_string()
            })
            .collect()
    };
    let front = Some(names_for(Panel::Front, front));
    let rear = rear.map(|r| names_for(Panel::Rear, r));
    let rack = Rack {
        id: "r1".into(),
        name: "Rack 1".into(),
        total_u,
        style: style(true),
        front,
        rear,
    };
    (rack, NameRegistry::build(devices).unwrap())
}

fn build(rack: &Rack, reg: &NameRegistry) -> Result<Checked<RackElevation>, RackError> {
    build_rack(rack, reg, &TypeColors::default())
}

// ── Occupancy ─────────────────────────────────────────────────────────────

#[test]
fn test_empty_panel_all_rows_empty() {
    let (rack, reg) = make_rack(4, &[], None);
    let elev = build(&rack, &reg).unwrap().value;
    assert_eq!(elev.panels.len(), 1);
    let units: Vec<u32> = elev.panels[0]
        .rows
        .iter()
        .map(|r| match r {
            Row::Empty { unit } => *unit,
            Row::Device(_) => panic!("unexpected device"),
        })
        .collect();
    assert_eq!(units, vec![4, 3, 2, 1]);
}

#[test]
fn test_device_spans_rows_top_down() {
    let (rack, reg) = make_rack(42, &[("Server", 42, 3, Some("server")), ("Switch", 38, 1, None)], None);
    let elev = build(&rack, &reg).unwrap().value;
    let rows = &elev.panels[0].rows;
    match &rows[0] {
        Row::Device(seg) => {
            assert_eq!(seg.device, "Server");
            assert_eq!((seg.top_u, seg.bottom_u), (42, 40));
            assert_eq!(seg.row_span(), 3);
        }
        other => panic!("expected device row, got {other:?}"),
    }
    assert_eq!(rows[1], Row::Empty { unit: 39 });
    assert!(matches!(&rows[2], Row::Device(seg) if seg.device == "Switch"));
    // 1 + 1 + 1 + 37 empty rows
    assert_eq!(rows.len(), 40);
}

#[test]
fn test_segments_sorted_by_top_unit() {
    let (rack, reg) = make_rack(10, &[("Low", 2, 2, None), ("High", 10, 1, None), ("Mid", 6, 3, None)], None);
    let elev = build(&rack, &reg).unwrap().value;
    let order: Vec<&str> = elev.panels[0].segments().map(|s| s.device.as_str()).collect();
    assert_eq!(order, vec!["High", "Mid", "Low"]);
}

#[test]
fn test_overlap_names_both_devices() {
    let (rack, reg) = make_rack(42, &[("A", 42, 3, None), ("B", 40, 1, None)], None);
    match build(&rack, &reg).unwrap_err() {
        RackError::Overlap {
            first,
            second,
            low,
            high,
            panel,
            ..
        } => {
            assert_eq!(first, "A");
            assert_eq!(second, "B");
            assert_eq!((low, high), (40, 40));
            assert_eq!(panel, "front");
        }
        other => panic!("expected Overlap, got {other:?}"),
    }
}

#[test]
fn test_overlap_range_is_intersection() {
    let (rack, reg) = make_rack(20, &[("A", 10, 5, None), ("B", 12, 5, None)], None);
    match build(&rack, &reg).unwrap_err() {
        RackError::Overlap { first, low, high, .. } => {
            assert_eq!(first, "B");
            assert_eq!((low, high), (8, 10));
        }
        other => panic!("expected Overlap, got {other:?}"),
    }
}

#[test]
fn test_front_and_rear_are_independent() {
    let (rack, reg) = make_rack(10, &[("F", 10, 2, None)], Some(&[("R", 10, 2, None)]));
    let elev = build(&rack, &reg).unwrap().value;
    assert_eq!(elev.panels.len(), 2);
    assert_eq!(elev.panels[1].panel, Panel::Rear);
    assert_eq!(elev.panels[1].segments().count(), 1);
}

#[test]
fn test_adjacent_devices_do_not_overlap() {
    let (rack, reg) = make_rack(6, &[("A", 6, 3, None), ("B", 3, 3, None)], None);
    let elev = build(&rack, &reg).unwrap().value;
    assert_eq!(elev.panels[0].rows.len(), 2);
}

// ── Bounds ────────────────────────────────────────────────────────────────

#[test]
fn test_start_above_rack_is_out_of_bounds() {
    let (rack, reg) = make_rack(42, &[("Tall", 43, 1, None)], None);
    assert!(matches!(
        build(&rack, &reg),
        Err(RackError::OutOfBounds { top: 43, .. })
    ));
}

#[test]
fn test_extent_below_u1_is_out_of_bounds() {
    let (rack, reg) = make_rack(42, &[("UPS", 2, 3, None)], None);
    match build(&rack, &reg).unwrap_err() {
        RackError::OutOfBounds {
            device,
            top,
            bottom,
            total_u,
            ..
        } => {
            assert_eq!(device, "UPS");
            assert_eq!((top, bottom, total_u), (2, 0, 42));
        }
        other => panic!("expected OutOfBounds, got {other:?}"),
    }
}

#[test]
fn test_device_filling_rack_exactly() {
    let (rack, reg) = make_rack(4, &[("Full", 4, 4, None)], None);
    let elev = build(&rack, &reg).unwrap().value;
    assert_eq!(elev.panels[0].rows.len(), 1);
}

// ── Logical devices, colors, fonts ────────────────────────────────────────

#[test]
fn test_logical_devices_excluded() {
    let (rack, reg) = make_rack(4, &[("Virtual", 0, 0, None), ("Real", 4, 1, None)], None);
    let elev = build(&rack, &reg).unwrap().value;
    let names: Vec<&str> = elev.panels[0].segments().map(|s| s.device.as_str()).collect();
    assert_eq!(names, vec!["Real"]);
    assert!(reg.contains("Virtual"));
}

#[test]
fn test_unknown_type_is_warning_not_failure() {
    let (rack, reg) = make_rack(4, &[("Odd", 4, 1, Some("gizmo"))], None);
    let checked = build(&rack, &reg).unwrap();
    let seg = checked.value.panels[0].segments().next().unwrap().clone();
    assert_eq!(seg.color, DEFAULT_DEVICE_COLOR);
    assert!(checked.diagnostics.has(DiagnosticKind::UnknownType));
}

#[test]
fn test_font_scaling() {
    let s = style(true);
    assert_eq!(device_font_size(&s, 1), 10.0);
    assert!((device_font_size(&s, 3) - 12.0).abs() < 1e-9);
    // capped at 1.5x
    assert!((device_font_size(&s, 40) - 15.0).abs() < 1e-9);
    assert!(device_font_size(&s, 4) > device_font_size(&s, 2));
}

#[test]
fn test_font_scaling_disabled() {
    assert_eq!(device_font_size(&style(false), 8), 10.0);
}

#[test]
fn test_build_elevations_collects_diagnostics() {
    let (rack, reg) = make_rack(4, &[("Odd", 4, 1, Some("gizmo"))], None);
    let checked = build_elevations(&[rack], &reg, &TypeColors::default()).unwrap();
    assert_eq!(checked.value.len(), 1);
    assert_eq!(checked.diagnostics.len(), 1);
}
