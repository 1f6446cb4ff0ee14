//! Tabular renderers: CSV via the `csv` crate, and standalone HTML pages.

use super::{Renderer, escape_html};
use crate::config::RenderConfig;
use crate::error::RackError;
use crate::inventory::InventoryRecord;
use crate::layout::cable::{CableRun, CableTable};

const INVENTORY_HEADERS: [&str; 6] = [
    "Device Name",
    "Part Number",
    "Port #",
    "Adapter/Network",
    "MAC Address",
    "IP Address",
];

const CABLE_HEADERS: [&str; 12] = [
    "Network",
    "From",
    "To",
    "Cable Type",
    "From Rack",
    "To Rack",
    "U Distance (units)",
    "Unit Length (m)",
    "F2B Length (m)",
    "Inter-rack Length (m)",
    "Cable Slack (m)",
    "Min Cable Length (m)",
];

fn inventory_cells(r: &InventoryRecord) -> [String; 6] {
    [
        r.device_name.clone(),
        r.part_number.clone(),
        r.port_index.map(|i| i.to_string()).unwrap_or_default(),
        r.adapter.clone(),
        r.mac.clone(),
        r.ip.clone(),
    ]
}

fn cable_cells(r: &CableRun) -> [String; 12] {
    [
        r.layer.clone(),
        r.from.clone(),
        r.to.clone(),
        r.cable_type.clone().unwrap_or_default(),
        r.from_rack.clone(),
        r.to_rack.clone(),
        r.unit_delta.to_string(),
        format!("{:.3}", r.unit_length),
        format!("{:.3}", r.front_to_back),
        format!("{:.1}", r.inter_rack),
        format!("{:.3}", r.slack),
        format!("{:.2}", r.min_length),
    ]
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    fn write<const N: usize>(
        headers: [&str; N],
        rows: impl Iterator<Item = [String; N]>,
    ) -> Result<String, RackError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RackError::Table(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Renderer<[InventoryRecord]> for CsvRenderer {
    fn render(&self, records: &[InventoryRecord]) -> Result<String, RackError> {
        Self::write(INVENTORY_HEADERS, records.iter().map(inventory_cells))
    }
}

impl Renderer<CableTable> for CsvRenderer {
    fn render(&self, table: &CableTable) -> Result<String, RackError> {
        Self::write(CABLE_HEADERS, table.runs.iter().map(cable_cells))
    }
}

// ─── HTML ────────────────────────────────────────────────────────────────────

/// Cell class per column; `None` for a plain cell.
type Classes<const N: usize> = [Option<&'static str>; N];

const INVENTORY_CLASSES: Classes<6> = [
    Some("device-name"),
    None,
    Some("port-number"),
    None,
    Some("mac-address"),
    Some("ip-address"),
];

const CABLE_CLASSES: Classes<12> = [
    Some("network"),
    None,
    None,
    None,
    None,
    None,
    Some("metric"),
    Some("metric"),
    Some("metric"),
    Some("metric"),
    Some("metric"),
    Some("metric total"),
];

pub struct HtmlRenderer {
    config: RenderConfig,
}

impl HtmlRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn page<const N: usize>(
        &self,
        title: &str,
        headers: [&str; N],
        classes: Classes<N>,
        rows: impl Iterator<Item = [String; N]>,
    ) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str(&format!("    <title>{}</title>\n", escape_html(title)));
        html.push_str(&self.stylesheet());
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("    <h1>{}</h1>\n", escape_html(title)));
        html.push_str("    <table>\n        <thead>\n            <tr>\n");
        for (header, class) in headers.iter().zip(classes) {
            html.push_str(&format!(
                "                <th{}>{}</th>\n",
                class_attr(class),
                escape_html(header)
            ));
        }
        html.push_str("            </tr>\n        </thead>\n        <tbody>\n");
        for row in rows {
            html.push_str("            <tr>\n");
            for (cell, class) in row.iter().zip(classes) {
                html.push_str(&format!(
                    "                <td{}>{}</td>\n",
                    class_attr(class),
                    escape_html(cell)
                ));
            }
            html.push_str("            </tr>\n");
        }
        html.push_str("        </tbody>\n    </table>\n</body>\n</html>\n");
        html
    }

    fn stylesheet(&self) -> String {
        format!(
            "    <style>
        body {{ font-family: '{face}', sans-serif; margin: 20px; background-color: #f5f5f5; }}
        h1 {{ color: #333; }}
        table {{ border-collapse: collapse; width: 100%; background-color: white; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        th {{ background-color: {title}; color: white; padding: 12px; text-align: left; border-bottom: 2px solid #333; }}
        td {{ padding: 10px 12px; border-bottom: 1px solid #ddd; }}
        tr:hover {{ background-color: #f9f9f9; }}
        .device-name, .network {{ font-weight: bold; color: #333; }}
        .port-number {{ background-color: #f0f0f0; text-align: center; width: 60px; }}
        .mac-address, .ip-address, .metric {{ font-family: monospace; }}
        .metric {{ text-align: right; }}
        .total {{ font-weight: bold; }}
    </style>\n",
            face = escape_html(&self.config.font_face),
            title = escape_html(&self.config.title_color),
        )
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

fn class_attr(class: Option<&str>) -> String {
    class.map_or_else(String::new, |c| format!(" class=\"{c}\""))
}

impl Renderer<[InventoryRecord]> for HtmlRenderer {
    fn render(&self, records: &[InventoryRecord]) -> Result<String, RackError> {
        let rows = records.iter().map(|r| {
            let mut cells = inventory_cells(r);
            if r.port_index.is_none() {
                for cell in &mut cells[2..] {
                    *cell = "-".to_string();
                }
            }
            cells
        });
        Ok(self.page("Computer Info", INVENTORY_HEADERS, INVENTORY_CLASSES, rows))
    }
}

impl Renderer<CableTable> for HtmlRenderer {
    fn render(&self, table: &CableTable) -> Result<String, RackError> {
        Ok(self.page(
            "Cable Length Calculations",
            CABLE_HEADERS,
            CABLE_CLASSES,
            table.runs.iter().map(cable_cells),
        ))
    }
}
