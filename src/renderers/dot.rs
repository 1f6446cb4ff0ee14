//! Graphviz DOT renderer for rack elevations and wiring layers.
//!
//! Rack elevations become one HTML-like table node per panel laid out left
//! to right; wiring layers become undirected graphs with one cluster per
//! rack or external group.

use super::{Renderer, escape_html};
use crate::config::RenderConfig;
use crate::error::RackError;
use crate::layout::elevation::{PanelElevation, RackElevation, Row};
use crate::layout::topology::{ClusterKey, TopologyNode, WiringTopology};

pub const HUB_PENWIDTH: f64 = 2.5;
const RACK_CLUSTER_COLOR: &str = "#F5F5F5";
const EXTERNAL_CLUSTER_COLOR: &str = "#E0E0E0";
/// Extra points on a wiring diagram's title over its node font.
const TITLE_FONT_BUMP: f64 = 4.0;

pub struct DotRenderer {
    config: RenderConfig,
}

impl DotRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn face(&self) -> String {
        escape_html(&self.config.font_face)
    }
}

impl Default for DotRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Double-quoted DOT string with `\` and `"` escaped.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Point size without float noise (`14.850000000000001` -> `14.85`).
fn pt(size: f64) -> String {
    format!("{}", (size * 100.0).round() / 100.0)
}

// ─── Rack layout ─────────────────────────────────────────────────────────────

fn panel_node_id(rack: &RackElevation, panel: &PanelElevation) -> String {
    quote(&format!("{}_{}", rack.rack_id, panel.panel))
}

impl DotRenderer {
    fn unit_cell(&self, rack: &RackElevation, unit: u32) -> String {
        format!(
            "<TD WIDTH=\"{}\"><FONT FACE=\"{}\">{unit}</FONT></TD>",
            rack.style.u_col_width,
            self.face()
        )
    }

    fn panel_table(&self, rack: &RackElevation, panel: &PanelElevation, lines: &mut Vec<String>) {
        let face = self.face();
        lines.push(format!("  {} [", panel_node_id(rack, panel)));
        lines.push("    label=<".to_string());
        lines.push(format!(
            "<TABLE BORDER=\"2\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\" WIDTH=\"{}\">",
            rack.style.table_width
        ));
        lines.push(format!(
            "<TR><TD COLSPAN=\"3\" BGCOLOR=\"{}\"><FONT POINT-SIZE=\"{}\" FACE=\"{face}\"><B>{} {}</B></FONT></TD></TR>",
            escape_html(&self.config.title_color),
            pt(rack.style.title_font_size),
            escape_html(&rack.name),
            panel.panel.title()
        ));

        for row in &panel.rows {
            match row {
                Row::Empty { unit } => lines.push(format!(
                    "<TR>{}<TD COLSPAN=\"2\" WIDTH=\"{}\"></TD></TR>",
                    self.unit_cell(rack, *unit),
                    rack.style.device_width
                )),
                Row::Device(seg) => {
                    let mut content = format!(
                        "<FONT POINT-SIZE=\"{}\" FACE=\"{face}\"><B>{}</B></FONT>",
                        pt(seg.font_size),
                        escape_html(&seg.device)
                    );
                    if seg.units > 1 {
                        content.push_str(&format!(
                            "<BR/><FONT POINT-SIZE=\"{}\" FACE=\"{face}\">{}U</FONT>",
                            pt(rack.style.unit_font_size),
                            seg.units
                        ));
                    }
                    lines.push(format!(
                        "<TR>{}<TD COLSPAN=\"2\" ROWSPAN=\"{}\" BGCOLOR=\"{}\" WIDTH=\"{}\">{content}</TD></TR>",
                        self.unit_cell(rack, seg.top_u),
                        seg.row_span(),
                        escape_html(&seg.color),
                        rack.style.device_width
                    ));
                    for unit in (seg.bottom_u..seg.top_u).rev() {
                        lines.push(format!("<TR>{}</TR>", self.unit_cell(rack, unit)));
                    }
                }
            }
        }

        lines.push("</TABLE>".to_string());
        lines.push("    >".to_string());
        lines.push("  ];".to_string());
        lines.push(String::new());
    }
}

impl Renderer<[RackElevation]> for DotRenderer {
    fn render(&self, racks: &[RackElevation]) -> Result<String, RackError> {
        let mut lines = vec![
            "digraph rack_layout {".to_string(),
            "  graph [rankdir=TB, nodesep=0.3, ranksep=0, bgcolor=\"white\"];".to_string(),
            format!("  node [shape=plain, fontname={}];", quote(&self.config.font_face)),
            String::new(),
        ];

        for rack in racks {
            for panel in &rack.panels {
                self.panel_table(rack, panel, &mut lines);
            }
        }

        // Front, rear, spacer, front, rear, ... on one rank.
        let groups: Vec<Vec<String>> = racks
            .iter()
            .map(|r| r.panels.iter().map(|p| panel_node_id(r, p)).collect())
            .collect();
        let spacers = groups.len().saturating_sub(1);
        for i in 0..spacers {
            lines.push(format!(
                "  spacer_{i} [shape=point, style=invis, width=1.6, height=0, fixedsize=true];"
            ));
        }
        let mut rank = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            rank.extend(group.iter().cloned());
            if i < spacers {
                rank.push(format!("spacer_{i}"));
            }
        }
        if !rank.is_empty() {
            lines.push(format!("  {{ rank=same; {}; }}", rank.join("; ")));
        }
        for i in 0..spacers {
            if let Some(last) = groups[i].last() {
                lines.push(format!("  {last} -> spacer_{i} [style=invis, minlen=1];"));
            }
            if let Some(first) = groups[i + 1].first() {
                lines.push(format!("  spacer_{i} -> {first} [style=invis, minlen=1];"));
            }
        }

        lines.push("}".to_string());
        Ok(lines.join("\n") + "\n")
    }
}

// ─── Wiring layers ───────────────────────────────────────────────────────────

fn node_line(node: &TopologyNode, indent: &str) -> String {
    let name = quote(&node.name);
    if node.is_hub() {
        // `\n` is a DOT line break inside the quoted label.
        let label = format!("{}\\n({} conn)\"", &name[..name.len() - 1], node.degree);
        format!(
            "{indent}{name} [label={label}, fillcolor={}, penwidth={HUB_PENWIDTH}];",
            quote(&node.color)
        )
    } else {
        format!("{indent}{name} [label={name}, fillcolor={}];", quote(&node.color))
    }
}

impl Renderer<WiringTopology> for DotRenderer {
    fn render(&self, topo: &WiringTopology) -> Result<String, RackError> {
        let face = quote(&self.config.font_face);
        let title = quote(&topo.layer);
        let mut lines = vec![
            format!("graph {title} {{"),
            format!(
                "  graph [bgcolor=\"white\", label={title}, labelloc=t, fontsize={}, fontname={face}, overlap=false, sep=0.5];",
                pt(topo.node_font_size + TITLE_FONT_BUMP)
            ),
            format!(
                "  node [shape=box, style=\"rounded,filled\", fontsize={}, fontname={face}, margin=0.2];",
                pt(topo.node_font_size)
            ),
            format!("  edge [fontname={face}];"),
            String::new(),
        ];

        for cluster in &topo.clusters {
            if topo.show_rack_labels {
                let color = match cluster.key {
                    ClusterKey::Rack(_) => RACK_CLUSTER_COLOR,
                    ClusterKey::External(_) => EXTERNAL_CLUSTER_COLOR,
                };
                lines.push(format!(
                    "  subgraph {} {{",
                    quote(&format!("cluster_{}", cluster.key.slug()))
                ));
                lines.push(format!("    label={};", quote(&cluster.label)));
                lines.push(format!("    style=filled; color=\"{color}\"; fontname={face};"));
                for node in &cluster.nodes {
                    lines.push(node_line(node, "    "));
                }
                lines.push("  }".to_string());
            } else {
                for node in &cluster.nodes {
                    lines.push(node_line(node, "  "));
                }
            }
        }
        lines.push(String::new());

        for edge in &topo.edges {
            let mut attrs = vec![
                format!("color={}", quote(&edge.style.color)),
                format!("style={}", edge.style.line),
                format!("penwidth={}", pt(edge.style.width)),
            ];
            if let Some(label) = &edge.label {
                attrs.push(format!("label={}", quote(&format!("   {label}"))));
                attrs.push(format!("fontsize={}", pt(edge.style.font_size)));
            }
            lines.push(format!(
                "  {} -- {} [{}];",
                quote(&edge.from),
                quote(&edge.to),
                attrs.join(", ")
            ));
        }

        lines.push("}".to_string());
        Ok(lines.join("\n") + "\n")
    }
}
