//! Die-related components and faces
//!
//! Marker components for the scene plus the face helpers shared by both
//! animator variants.

use bevy::prelude::*;

pub const FACE_COUNT: u32 = 6;
pub const DEFAULT_FACE: u32 = 1;

/// Clamp an arbitrary face request into 1..=6.
pub fn clamp_face(face: u32) -> u32 {
    face.clamp(1, FACE_COUNT)
}

/// Component attached to each die entity. `index` is the die's position in
/// the row and defines result order.
#[derive(Component, Debug, Clone, Copy)]
pub struct Die {
    pub index: usize,
}

/// The scene camera. Its facing constrains the volumetric spin axes.
#[derive(Component)]
pub struct MainCamera;

/// Marker for the stage status text.
#[derive(Component)]
pub struct StatusText;

/// Marker for the full-screen results overlay background.
#[derive(Component)]
pub struct ResultsOverlay;

/// Marker for the text inside the results overlay.
#[derive(Component)]
pub struct ResultsText;

/// Horizontal position of a die so the row is centred on the origin.
pub fn row_position(index: usize, count: usize, spacing: f32) -> Vec3 {
    let total_width = count.saturating_sub(1) as f32 * spacing;
    let start_x = -total_width / 2.0;
    Vec3::new(start_x + index as f32 * spacing, 0.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_face() {
        assert_eq!(clamp_face(0), 1);
        assert_eq!(clamp_face(4), 4);
        assert_eq!(clamp_face(9), 6);
    }

    #[test]
    fn test_row_is_centred() {
        let first = row_position(0, 6, 1.4);
        let last = row_position(5, 6, 1.4);
        assert!((first.x + last.x).abs() < 1e-5);
        assert!((last.x - first.x - 7.0).abs() < 1e-4);
        assert_eq!(row_position(0, 1, 1.4), Vec3::ZERO);
    }
}
