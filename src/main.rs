//! rackforge CLI entry point.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use clap::Parser;
use log::{error, info, warn};

use rackforge::config::{GenerateConfig, RunPolicy};
use rackforge::renderers::Artifact;
use rackforge::{RackError, generate_from_config, parsers};

const PNG_DIR: &str = "pngs";

/// Rack layouts, wiring diagrams and inventory tables from a YAML system description.
#[derive(Parser, Debug)]
#[command(name = "rackforge", version = env!("RACKFORGE_VERSION"))]
struct Cli {
    /// System description file
    #[arg(default_value = "system.yaml")]
    config: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long = "output", default_value = "output")]
    output: PathBuf,

    /// Abort on the first failing artifact instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Also render every .dot file to PNG with Graphviz `dot`
    #[arg(long)]
    png: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RackError {
    let path = path.to_path_buf();
    move |source| RackError::Io { path, source }
}

fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<(), RackError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    for artifact in artifacts {
        let path = dir.join(&artifact.name);
        fs::write(&path, &artifact.contents).map_err(io_error(&path))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

/// Run `dot -Tpng` on every DOT artifact. Failures are logged only.
fn render_pngs(dir: &Path, artifacts: &[Artifact]) {
    let png_dir = dir.join(PNG_DIR);
    if let Err(e) = fs::create_dir_all(&png_dir) {
        error!("cannot create '{}': {e}", png_dir.display());
        return;
    }
    for artifact in artifacts.iter().filter(|a| a.is_dot()) {
        let input = dir.join(&artifact.name);
        let output = png_dir.join(Path::new(&artifact.name).with_extension("png"));
        let status = Command::new("dot")
            .args(["-Tpng:cairo", "-Gdpi=300"])
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .status();
        match status {
            Ok(s) if s.success() => info!("rendered {}", output.display()),
            Ok(s) => warn!("dot failed on {} ({s})", input.display()),
            Err(e) => {
                warn!("cannot run Graphviz dot: {e}");
                return;
            }
        }
    }
}

fn run(cli: &Cli) -> Result<(), RackError> {
    let cfg = parsers::load(&cli.config)?;
    let config = GenerateConfig {
        policy: if cli.strict {
            RunPolicy::Strict
        } else {
            RunPolicy::Lenient
        },
        ..GenerateConfig::default()
    };
    let generation = generate_from_config(&cfg, &config)?;
    write_artifacts(&cli.output, &generation.artifacts)?;
    if cli.png {
        render_pngs(&cli.output, &generation.artifacts);
    }
    if !generation.is_complete() {
        warn!(
            "{} artifact(s) skipped; rerun with --strict to fail instead",
            generation.failures.len()
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
