//! Point types flowing through the pipeline

use glam::Vec3;

/// A classified sample as delivered by a point source, already in world-grid units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPoint {
    pub x: f32,
    pub z: f32,
    /// Absolute height
    pub height: f32,
    pub classification: u8,
    pub color: Option<[u8; 3]>,
}

impl RawPoint {
    pub fn new(x: f32, z: f32, height: f32, classification: u8) -> Self {
        Self {
            x,
            z,
            height,
            classification,
            color: None,
        }
    }

    /// Integer column containing this point
    pub fn column(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.z.floor() as i32)
    }
}

/// A point with its height expressed relative to the local ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub z: f32,
    pub height_above_ground: f32,
    pub absolute_height: f32,
    pub color: Option<[u8; 3]>,
}

impl Point {
    /// Integer column containing this point
    pub fn column(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.z.floor() as i32)
    }

    /// `(x, height_above_ground, z)`
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.height_above_ground, self.z)
    }

    /// `(x, 0, z)`, the horizontal projection
    pub fn horizontal(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_floors_negative() {
        let p = RawPoint::new(-0.5, 3.9, 10.0, 5);
        assert_eq!(p.column(), (-1, 3));
    }

    #[test]
    fn test_projections() {
        let p = Point {
            x: 1.0,
            z: 2.0,
            height_above_ground: 5.0,
            absolute_height: 70.0,
            color: None,
        };
        assert_eq!(p.position(), Vec3::new(1.0, 5.0, 2.0));
        assert_eq!(p.horizontal(), Vec3::new(1.0, 0.0, 2.0));
    }
}
