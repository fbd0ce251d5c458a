//! Brush outline for the host to draw over the viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uvsculpt_config::OverlayConfig;

/// One point of the outline line strip, laid out for direct GPU upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct OverlayVertex {
    /// Region position in pixels
    pub position: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
}

/// Circle of `radius` around `center` as a closed line strip.
///
/// The point is rotated incrementally (tangent step, then radial
/// correction) instead of evaluating sin/cos per point. Emits
/// `segments + 1` points; the last one returns to the start.
pub fn brush_outline(center: Vec2, radius: f32, config: &OverlayConfig) -> Vec<OverlayVertex> {
    let segments = config.segments.max(3);
    let theta = std::f32::consts::TAU / segments as f32;
    let tangential = theta.tan();
    let radial = theta.cos();

    let mut x = radius;
    let mut y = 0.0f32;
    let mut points = Vec::with_capacity(segments as usize + 1);
    for _ in 0..=segments {
        points.push(OverlayVertex {
            position: [x + center.x, y + center.y],
            color: config.color,
        });
        let tx = -y;
        let ty = x;
        x += tx * tangential;
        y += ty * tangential;
        x *= radial;
        y *= radial;
    }
    points
}
