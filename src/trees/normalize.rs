//! Ground normalization and low-point filtering

use crate::cloud::{Point, RawPoint};
use crate::ground::GroundHeightField;

/// Points with heights relative to the ground below them.
#[derive(Clone, Debug, Default)]
pub struct Normalized {
    pub points: Vec<Point>,
    /// Points whose column had no ground height (0 used instead)
    pub unresolved: usize,
}

/// Converts absolute heights to heights above ground.
pub struct GroundNormalizer;

impl GroundNormalizer {
    pub fn normalize(points: &[RawPoint], ground: &impl GroundHeightField) -> Normalized {
        let mut unresolved = 0;
        let points = points
            .iter()
            .map(|p| {
                let (x, z) = p.column();
                let reference = ground.height_at(x, z).unwrap_or_else(|| {
                    unresolved += 1;
                    0
                });
                Point {
                    x: p.x,
                    z: p.z,
                    height_above_ground: p.height - reference as f32,
                    absolute_height: p.height,
                    color: p.color,
                }
            })
            .collect();
        Normalized { points, unresolved }
    }
}

/// Drops points too close to the ground to belong to a tree.
pub struct OutlierFilter {
    min_height_above_ground: f32,
}

impl OutlierFilter {
    pub fn new(min_height_above_ground: f32) -> Self {
        Self {
            min_height_above_ground,
        }
    }

    pub fn filter(&self, mut points: Vec<Point>) -> Vec<Point> {
        points.retain(|p| p.height_above_ground > self.min_height_above_ground);
        points
    }
}
