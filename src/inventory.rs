//! Inventory table — expanded `computer_info` entries joined with the registry.

use log::debug;

use crate::error::RackError;
use crate::expand::InventoryEntry;
use crate::registry::NameRegistry;

/// One export row: a device and one of its ports.
///
/// A device without ports yields a single row with `port_index == None`
/// and empty port fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub device_name: String,
    pub part_number: String,
    /// 1-based port number.
    pub port_index: Option<usize>,
    pub adapter: String,
    pub ip: String,
    pub mac: String,
}

/// Flatten `entries` into rows, in entry order then port order.
///
/// Every `device_name` must name a declared device.
pub fn build_inventory(
    entries: &[InventoryEntry],
    registry: &NameRegistry,
) -> Result<Vec<InventoryRecord>, RackError> {
    let mut records = Vec::new();
    for entry in entries {
        if !registry.contains(&entry.device_name) {
            return Err(RackError::Mismatch {
                device: entry.device_name.clone(),
            });
        }
        if entry.ports.is_empty() {
            records.push(InventoryRecord {
                device_name: entry.device_name.clone(),
                part_number: entry.part_number.clone(),
                port_index: None,
                adapter: String::new(),
                ip: String::new(),
                mac: String::new(),
            });
            continue;
        }
        for (i, port) in entry.ports.iter().enumerate() {
            records.push(InventoryRecord {
                device_name: entry.device_name.clone(),
                part_number: entry.part_number.clone(),
                port_index: Some(i + 1),
                adapter: port.adapter.clone(),
                ip: port.ip.clone(),
                mac: port.mac.clone(),
            });
        }
    }
    debug!(
        "inventory: {} entries, {} rows",
        entries.len(),
        records.len()
    );
    Ok(records)
}
