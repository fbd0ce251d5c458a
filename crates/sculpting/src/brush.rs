//! Brush falloff.

/// Linear radial falloff.
///
/// Full `factor` at the center, zero at the rim and beyond. Negative
/// distances count as the center.
pub fn falloff_strength(distance: f32, radius: f32, factor: f32) -> f32 {
    if distance > radius {
        return 0.0;
    }
    if distance < 0.0 {
        return factor;
    }
    (radius - distance) * factor / radius
}
