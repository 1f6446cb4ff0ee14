//! rackforge — rack elevations, wiring diagrams and inventory tables from
//! one YAML system description.
//!
//! Public API: `generate()` / `generate_from_config()`.
//!
//! Pipeline: parse → expand clusters → name registry →
//! {rack elevations, wiring topologies, inventory, cable runs} → renderers.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod inventory;
pub mod layout;
pub mod parsers;
pub mod registry;
pub mod renderers;
pub mod syntax;

use log::{error, info};

use crate::config::{GenerateConfig, RunPolicy};
use crate::diagnostics::Diagnostics;
use crate::expand::expand_system;
use crate::inventory::build_inventory;
use crate::layout::cable::build_cable_table;
use crate::layout::elevation::build_elevations;
use crate::layout::topology::{TopologyContext, WiringTopology, build_topology};
use crate::layout::types::{EdgeStyle, TypeColors};
use crate::registry::NameRegistry;
use crate::renderers::{
    Artifact, CABLE_CSV_FILE, CABLE_HTML_FILE, CsvRenderer, DotRenderer, HtmlRenderer,
    INVENTORY_CSV_FILE, INVENTORY_HTML_FILE, RACK_LAYOUT_FILE, Renderer, layer_file_name,
};
use crate::syntax::types::SystemConfig;

pub use crate::error::RackError;

/// An artifact dropped under `RunPolicy::Lenient`.
#[derive(Debug)]
pub struct ArtifactFailure {
    /// What was being generated (file name or model).
    pub artifact: String,
    pub error: RackError,
}

/// Result of one generation run.
#[derive(Debug, Default)]
pub struct Generation {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<ArtifactFailure>,
    pub diagnostics: Diagnostics,
}

impl Generation {
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Artifact bookkeeping under a run policy.
struct Run {
    policy: RunPolicy,
    out: Generation,
}

impl Run {
    /// Run one artifact step. Under `Lenient` a failure is recorded and
    /// `None` returned; under `Strict` it is returned as the run's error.
    fn attempt<T>(
        &mut self,
        what: &str,
        step: impl FnOnce() -> Result<T, RackError>,
    ) -> Result<Option<T>, RackError> {
        match step() {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.policy {
                RunPolicy::Strict => Err(err),
                RunPolicy::Lenient => {
                    error!("skipping {what}: {err}");
                    self.out.failures.push(ArtifactFailure {
                        artifact: what.to_string(),
                        error: err,
                    });
                    Ok(None)
                }
            },
        }
    }

    fn emit(&mut self, name: impl Into<String>, contents: String) {
        let artifact = Artifact::new(name, contents);
        info!("generated {}", artifact.name);
        self.out.artifacts.push(artifact);
    }
}

/// Parse a YAML system description and generate every artifact.
pub fn generate(src: &str, config: &GenerateConfig) -> Result<Generation, RackError> {
    let cfg = parsers::parse(src)?;
    generate_from_config(&cfg, config)
}

/// Generate every artifact from an already parsed configuration.
///
/// Expansion and registry errors always fail the run. Per-artifact
/// failures follow `config.policy`.
pub fn generate_from_config(
    cfg: &SystemConfig,
    config: &GenerateConfig,
) -> Result<Generation, RackError> {
    let mut diags = Diagnostics::new();
    let sys = expand_system(cfg)?.unpack_into(&mut diags);
    let registry = NameRegistry::build(sys.devices.iter().cloned())?;
    let colors = TypeColors::with_overrides(&sys.type_colors);
    let global_style = EdgeStyle::global(&sys.wiring_defaults, &mut diags);

    let dot = DotRenderer::new(config.render.clone());
    let html = HtmlRenderer::new(config.render.clone());
    let mut run = Run {
        policy: config.policy,
        out: Generation::default(),
    };

    // Rack layout
    if !sys.racks.is_empty() {
        let rendered = run.attempt(RACK_LAYOUT_FILE, || {
            let elevations = build_elevations(&sys.racks, &registry, &colors)?.unpack_into(&mut diags);
            dot.render(elevations.as_slice())
        })?;
        if let Some(text) = rendered {
            run.emit(RACK_LAYOUT_FILE, text);
        }
    }

    // Wiring layers
    let ctx = TopologyContext {
        registry: &registry,
        colors: &colors,
        racks: &sys.racks,
        external_groups: &sys.external_groups,
        global_style: &global_style,
    };
    let mut topologies: Vec<WiringTopology> = Vec::with_capacity(sys.layers.len());
    for layer in &sys.layers {
        let name = layer_file_name(&layer.name);
        let built = run.attempt(&name, || {
            let topo = build_topology(layer, &ctx)?.unpack_into(&mut diags);
            let text = dot.render(&topo)?;
            Ok((topo, text))
        })?;
        if let Some((topo, text)) = built {
            run.emit(name, text);
            topologies.push(topo);
        }
    }

    // Cable lengths, over the layers that built
    if !sys.layers.is_empty() {
        let layers: Vec<&WiringTopology> = topologies.iter().collect();
        let tables = run.attempt(CABLE_CSV_FILE, || {
            let table = build_cable_table(&layers, &registry, &sys.racks, &sys.cable)?;
            Ok((CsvRenderer.render(&table)?, html.render(&table)?))
        })?;
        if let Some((csv, page)) = tables {
            run.emit(CABLE_CSV_FILE, csv);
            run.emit(CABLE_HTML_FILE, page);
        }
    }

    // Inventory
    if !sys.inventory.is_empty() {
        let tables = run.attempt(INVENTORY_CSV_FILE, || {
            let records = build_inventory(&sys.inventory, &registry)?;
            Ok((
                CsvRenderer.render(records.as_slice())?,
                html.render(records.as_slice())?,
            ))
        })?;
        if let Some((csv, page)) = tables {
            run.emit(INVENTORY_CSV_FILE, csv);
            run.emit(INVENTORY_HTML_FILE, page);
        }
    }

    diags.log_all();
    let mut out = run.out;
    out.diagnostics = diags;
    info!(
        "{} artifacts generated, {} dropped, {} warnings",
        out.artifacts.len(),
        out.failures.len(),
        out.diagnostics.len()
    );
    Ok(out)
}
