//! Settings resolution for the CLI
//!
//! Later sources win: built-in defaults, then `--settings`, then the script's
//! own `settings` block, then `UVSCULPT_*` environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use uvsculpt_config::SculptSettings;

pub fn resolve_settings(
    settings_path: Option<&Path>,
    script_override: Option<&SculptSettings>,
) -> Result<SculptSettings> {
    let mut settings = match settings_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {}", path.display()))?;
            SculptSettings::from_json_str(&json)
                .with_context(|| format!("Invalid settings in {}", path.display()))?
        }
        None => SculptSettings::default(),
    };

    if let Some(script_settings) = script_override {
        settings = script_settings.clone();
    }
    settings.apply_env_overrides();
    settings.validate().context("Invalid settings")?;

    info!(
        "Brush: {:?} radius={} strength={} relax={:?} invert={}",
        settings.brush.tool,
        settings.brush.radius,
        settings.brush.strength,
        settings.brush.relax_method,
        settings.brush.pinch_invert
    );
    Ok(settings)
}
