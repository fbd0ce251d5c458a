//! uvsculpt - replay scripted UV sculpt strokes against a mesh
//!
//! Reads a mesh description (or builds a demo grid), replays a stroke script
//! through the brush tool and writes the resulting mesh as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use uvmesh::{MeshDescription, UvMesh, primitives};

mod config;
mod script;

use script::StrokeScript;

/// Size of the demo grid used when no mesh is given
const DEMO_GRID_CELLS: u32 = 8;

#[derive(Parser)]
#[command(name = "uvsculpt")]
#[command(about = "Replay UV sculpt strokes against a mesh")]
#[command(version)]
struct Cli {
    /// Mesh description JSON (defaults to a demo grid)
    #[arg(short, long)]
    mesh: Option<PathBuf>,

    /// Stroke script JSON
    #[arg(short, long)]
    script: PathBuf,

    /// Settings JSON (brush, overlay, timer interval)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let script: StrokeScript = read_json(&cli.script).context("Failed to load stroke script")?;
    let settings = config::resolve_settings(cli.settings.as_deref(), script.settings.as_ref())?;

    let mut mesh = match &cli.mesh {
        Some(path) => {
            let desc: MeshDescription = read_json(path).context("Failed to load mesh")?;
            UvMesh::from_description(&desc)
                .with_context(|| format!("Invalid mesh in {}", path.display()))?
        }
        None => {
            info!("No mesh given, using a {0}x{0} demo grid", DEMO_GRID_CELLS);
            primitives::grid(DEMO_GRID_CELLS, DEMO_GRID_CELLS, 1.0)
        }
    };
    info!(
        "Mesh: {} vertices, {} faces, UV layers {:?}",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.uv_layer_names()
    );

    let summary = script.replay(&mut mesh, &settings);
    info!(
        "Replayed {} event(s): {} UV update(s), {} warning(s)",
        summary.events, summary.mesh_changes, summary.warnings
    );

    let json = serde_json::to_string_pretty(&mesh.to_description())?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
