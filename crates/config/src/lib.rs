//! Shared configuration for the UV sculpt tool
//!
//! This crate is the single source of truth for brush settings, the brush
//! outline overlay and the timer interval that keeps Pinch/Relax animating
//! while the pointer is held still. Everything here is read-only for the
//! duration of a stroke.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default brush radius in region pixels
pub const DEFAULT_BRUSH_RADIUS: f32 = 30.0;

/// Default brush strength factor
pub const DEFAULT_BRUSH_STRENGTH: f32 = 0.03;

/// Default timer interval in milliseconds
pub const DEFAULT_TIMER_INTERVAL_MS: u64 = 100;

/// Default number of segments in the brush outline
pub const DEFAULT_OUTLINE_SEGMENTS: u32 = 180;

/// Default brush outline color (RGBA)
pub const DEFAULT_BRUSH_COLOR: [f32; 4] = [1.0, 0.4, 0.4, 1.0];

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Brush radius must be a positive finite number (got {0})")]
    InvalidRadius(f32),

    #[error("Brush strength must be finite (got {0})")]
    InvalidStrength(f32),

    #[error("Outline needs at least 3 segments (got {0})")]
    InvalidSegments(u32),

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which deformation the brush applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ToolKind {
    /// Translate influenced UVs with the cursor
    #[default]
    Grab,
    /// Pull UVs toward the UV point under the cursor
    Pinch,
    /// Smooth UVs toward their neighbors
    Relax,
}

impl FromStr for ToolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GRAB" => Ok(Self::Grab),
            "PINCH" => Ok(Self::Pinch),
            "RELAX" => Ok(Self::Relax),
            _ => Err(ConfigError::UnknownValue {
                kind: "tool",
                value: s.to_string(),
            }),
        }
    }
}

/// Smoothing method used by the Relax tool
///
/// Any unrecognized method name deserializes to `Unsupported`, which the
/// Relax operator treats as a no-op instead of failing the whole settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelaxMethod {
    /// HC smoothing (Laplacian with a bias correction term)
    #[default]
    #[serde(rename = "HC")]
    Hc,
    /// Plain Laplacian smoothing
    #[serde(rename = "LAPLACIAN")]
    Laplacian,
    #[serde(rename = "UNSUPPORTED")]
    #[serde(other)]
    Unsupported,
}

impl FromStr for RelaxMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HC" => Ok(Self::Hc),
            "LAPLACIAN" => Ok(Self::Laplacian),
            _ => Err(ConfigError::UnknownValue {
                kind: "relax method",
                value: s.to_string(),
            }),
        }
    }
}

/// Brush settings passed into every stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Brush radius in region pixels
    pub radius: f32,
    /// Strength factor (typically 0-1)
    pub strength: f32,
    /// Active deformation
    pub tool: ToolKind,
    /// Push UVs away from the cursor instead of pulling (Pinch only)
    pub pinch_invert: bool,
    /// Smoothing method (Relax only)
    pub relax_method: RelaxMethod,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BRUSH_RADIUS,
            strength: DEFAULT_BRUSH_STRENGTH,
            tool: ToolKind::default(),
            pinch_invert: false,
            relax_method: RelaxMethod::default(),
        }
    }
}

impl BrushConfig {
    /// Create a config for the given tool with default radius and strength
    pub fn for_tool(tool: ToolKind) -> Self {
        Self {
            tool,
            ..Default::default()
        }
    }

    /// Check radius and strength are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if !self.strength.is_finite() {
            return Err(ConfigError::InvalidStrength(self.strength));
        }
        Ok(())
    }
}

/// Brush outline overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Outline color (RGBA)
    pub color: [f32; 4],
    /// Number of line segments in the outline
    pub segments: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_COLOR,
            segments: DEFAULT_OUTLINE_SEGMENTS,
        }
    }
}

/// Complete settings for the sculpt tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptSettings {
    pub brush: BrushConfig,
    pub overlay: OverlayConfig,
    /// Interval between timer ticks while the tool is enabled
    pub timer_interval_ms: u64,
}

impl Default for SculptSettings {
    fn default() -> Self {
        Self {
            brush: BrushConfig::default(),
            overlay: OverlayConfig::default(),
            timer_interval_ms: DEFAULT_TIMER_INTERVAL_MS,
        }
    }
}

impl SculptSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(json)?;
        if settings.timer_interval_ms == 0 {
            settings.timer_interval_ms = DEFAULT_TIMER_INTERVAL_MS;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.brush.validate()?;
        if self.overlay.segments < 3 {
            return Err(ConfigError::InvalidSegments(self.overlay.segments));
        }
        Ok(())
    }

    /// Apply overrides from `UVSCULPT_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("UVSCULPT_RADIUS") {
            match value.parse::<f32>() {
                Ok(radius) if radius.is_finite() && radius > 0.0 => self.brush.radius = radius,
                _ => warn!("Ignoring invalid UVSCULPT_RADIUS={}", value),
            }
        }
        if let Some(value) = lookup("UVSCULPT_STRENGTH") {
            match value.parse::<f32>() {
                Ok(strength) if strength.is_finite() => self.brush.strength = strength,
                _ => warn!("Ignoring invalid UVSCULPT_STRENGTH={}", value),
            }
        }
        if let Some(value) = lookup("UVSCULPT_TOOL") {
            match value.parse::<ToolKind>() {
                Ok(tool) => self.brush.tool = tool,
                Err(e) => warn!("Ignoring UVSCULPT_TOOL: {}", e),
            }
        }
        if let Some(value) = lookup("UVSCULPT_RELAX_METHOD") {
            match value.parse::<RelaxMethod>() {
                Ok(method) => self.brush.relax_method = method,
                Err(e) => warn!("Ignoring UVSCULPT_RELAX_METHOD: {}", e),
            }
        }
        if let Some(value) = lookup("UVSCULPT_PINCH_INVERT") {
            match value.as_str() {
                "1" | "true" | "TRUE" => self.brush.pinch_invert = true,
                "0" | "false" | "FALSE" => self.brush.pinch_invert = false,
                _ => warn!("Ignoring invalid UVSCULPT_PINCH_INVERT={}", value),
            }
        }
    }
}
