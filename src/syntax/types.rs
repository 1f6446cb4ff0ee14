//! Raw configuration schema, exactly as written in the YAML document.
//!
//! Nothing here is expanded or validated beyond what serde checks: cluster
//! templates still carry their `{N}` tokens and `start`/`end` ranges.
//! See `expand` for the concrete forms.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

// ─── Defaults ────────────────────────────────────────────────────────────────

pub const DEFAULT_RACK_ID: &str = "rack";
pub const DEFAULT_EXTERNAL_GROUP: &str = "External Devices";

fn default_rack_id() -> String {
    DEFAULT_RACK_ID.to_string()
}
fn default_table_width() -> u32 {
    240
}
fn default_device_width() -> u32 {
    200
}
fn default_u_col_width() -> u32 {
    28
}
fn default_device_font_size() -> f64 {
    13.5
}
fn default_unit_font_size() -> f64 {
    15.0
}
fn default_title_font_size() -> f64 {
    16.0
}
fn default_true() -> bool {
    true
}
fn default_cable_slack() -> f64 {
    0.2
}
fn default_u_height() -> f64 {
    0.045
}
fn default_front_to_back() -> f64 {
    0.5
}
fn default_inter_rack() -> f64 {
    2.5
}
fn default_external_group() -> String {
    DEFAULT_EXTERNAL_GROUP.to_string()
}

// ─── SystemConfig (top-level document) ───────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub type_colors: BTreeMap<String, String>,
    #[serde(default)]
    pub racks: Vec<RackEntry>,
    #[serde(default)]
    pub external_devices: Vec<ExternalEntry>,
    #[serde(default)]
    pub wiring_layers: Vec<WiringLayerEntry>,
    #[serde(default)]
    pub wiring_defaults: StyleEntry,
    #[serde(default)]
    pub computer_info: Vec<InventoryEntryRaw>,

    #[serde(default = "default_cable_slack")]
    pub cable_slack_length: f64,
    #[serde(default = "default_u_height")]
    pub standard_u_height: f64,
    #[serde(default = "default_front_to_back")]
    pub front_to_back_length: f64,
    #[serde(default = "default_inter_rack")]
    pub inter_rack_distance: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            type_colors: BTreeMap::new(),
            racks: Vec::new(),
            external_devices: Vec::new(),
            wiring_layers: Vec::new(),
            wiring_defaults: StyleEntry::default(),
            computer_info: Vec::new(),
            cable_slack_length: default_cable_slack(),
            standard_u_height: default_u_height(),
            front_to_back_length: default_front_to_back(),
            inter_rack_distance: default_inter_rack(),
        }
    }
}

// ─── Racks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RackEntry {
    pub rack: RackHeader,
    #[serde(default)]
    pub front: Option<Vec<DeviceEntry>>,
    #[serde(default)]
    pub rear: Option<Vec<DeviceEntry>>,
}

/// Rack identity, height and layout tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct RackHeader {
    #[serde(default = "default_rack_id")]
    pub id: String,
    /// Display name; falls back to `id`.
    pub name: Option<String>,
    pub total_u: i64,
    #[serde(default = "default_table_width")]
    pub table_width: u32,
    #[serde(default = "default_device_width")]
    pub device_width: u32,
    #[serde(default = "default_u_col_width")]
    pub u_col_width: u32,
    #[serde(default = "default_device_font_size")]
    pub device_font_size: f64,
    #[serde(default = "default_unit_font_size")]
    pub unit_font_size: f64,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_true")]
    pub auto_scale_font: bool,
}

/// A device, or a cluster template when `start`/`end` are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub start_u: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub units: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub end: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub spacing: Option<i64>,
}

// ─── External devices ────────────────────────────────────────────────────────

/// Either a named group of devices or a single flat device entry.
///
/// An entry with a `devices` key is a group; anything else is a device.
#[derive(Debug, Clone)]
pub enum ExternalEntry {
    Group(ExternalGroupEntry),
    Device(ExternalDeviceEntry),
}

impl<'de> Deserialize<'de> for ExternalEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_yaml::Value::deserialize(deserializer)?;
        let name = value
            .get("name")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or(DEFAULT_EXTERNAL_GROUP)
            .to_string();
        if value.get("devices").is_some() {
            ExternalGroupEntry::deserialize(value)
                .map(Self::Group)
                .map_err(|e| D::Error::custom(format!("external group '{name}': {e}")))
        } else {
            ExternalDeviceEntry::deserialize(value)
                .map(Self::Device)
                .map_err(|e| D::Error::custom(format!("external device '{name}': {e}")))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalGroupEntry {
    #[serde(default = "default_external_group")]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub distance_from_racks: Option<f64>,
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalDeviceEntry {
    #[serde(flatten)]
    pub device: DeviceEntry,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub distance_from_racks: Option<f64>,
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Edge styling knobs shared by the global, layer and connection levels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StyleEntry {
    #[serde(alias = "edge_color")]
    pub color: Option<String>,
    #[serde(alias = "edge_style")]
    pub style: Option<String>,
    #[serde(default, alias = "edge_width", deserialize_with = "de_opt_f64")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub font_size: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WiringLayerEntry {
    pub name: String,
    pub edge_color: Option<String>,
    pub edge_style: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub edge_width: Option<f64>,
    /// Node font size; edge labels default to three points less.
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub font_size: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub edge_font_size: Option<f64>,
    pub cable_type: Option<String>,
    #[serde(default = "default_true")]
    pub show_rack_labels: bool,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

/// One `to` name or a fan-out list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    One(String),
    Many(Vec<String>),
}

impl Targets {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Targets::One(name) => std::slice::from_ref(name),
            Targets::Many(names) => names,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEntry {
    pub from: String,
    pub to: Targets,
    pub label: Option<String>,
    pub edge_color: Option<String>,
    pub color: Option<String>,
    pub style: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub font_size: Option<f64>,
    pub cable_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub end: Option<i64>,
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryEntryRaw {
    pub device_name: String,
    #[serde(default)]
    pub arena_part_number: String,
    #[serde(default)]
    pub ethernet_ports: Vec<PortEntry>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PortEntry {
    #[serde(default)]
    pub adapter: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub mac: String,
}

// ─── Lenient scalars ─────────────────────────────────────────────────────────

/// Numbers that may also be written as quoted strings (`"2.0"`, `"8"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(v)) => Ok(Some(v)),
        Some(Scalar::Float(v)) if v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(Scalar::Float(v)) => Err(serde::de::Error::custom(format!(
            "expected an integer, found {v}"
        ))),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, found '{s}'"))),
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(v)) => Ok(Some(v as f64)),
        Some(Scalar::Float(v)) => Ok(Some(v)),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, found '{s}'"))),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
