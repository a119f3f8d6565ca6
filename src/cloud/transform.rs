//! Survey coordinates → local world grid

use serde::{Deserialize, Serialize};

use super::class;

/// Affine transform from LAS coordinates (easting, northing, elevation) into
/// the world grid (x, height, z).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldTransform {
    /// Subtracted from (easting, northing, elevation) before rotating
    pub offset: [f64; 3],
    /// Rotation of the grid relative to north, about the vertical axis
    pub rotation_degrees: f64,
    /// Negate the northing axis (world z grows southward)
    pub flip_z: bool,
    /// Floor coordinates to whole cells
    pub snap_to_grid: bool,
    /// Classes whose repeated points in one snapped cell are dropped
    pub deduplicate_classes: Vec<u8>,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            rotation_degrees: 0.0,
            flip_z: true,
            snap_to_grid: true,
            deduplicate_classes: vec![class::HIGH_VEGETATION],
        }
    }
}

impl WorldTransform {
    /// Whether repeated points of `classification` collapse to one per cell
    pub fn deduplicates(&self, classification: u8) -> bool {
        self.snap_to_grid && self.deduplicate_classes.contains(&classification)
    }

    /// Returns `(x, height, z)` in world units.
    pub fn apply(&self, easting: f64, northing: f64, elevation: f64) -> (f32, f32, f32) {
        let dx = easting - self.offset[0];
        let dy = northing - self.offset[1];
        let dz = elevation - self.offset[2];

        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();
        let rx = cos * dx + sin * dy;
        let ry = -sin * dx + cos * dy;
        let rz = if self.flip_z { -ry } else { ry };

        if self.snap_to_grid {
            (rx.floor() as f32, dz.floor() as f32, rz.floor() as f32)
        } else {
            (rx as f32, dz as f32, rz as f32)
        }
    }
}
