//! One leaf voxel per surviving point

use crate::cloud::Point;
use crate::core::Result;
use crate::ground::GroundHeightField;
use crate::voxel::{Material, VoxelStore};

/// Writes a `Leaves` voxel at every point, never overwriting occupied cells.
pub struct LeafPlacer;

impl LeafPlacer {
    /// Cell holding `point` once it is put back on the ground
    pub fn cell(point: &Point, ground: &impl GroundHeightField) -> (i32, i32, i32) {
        let (x, z) = point.column();
        let base = ground.height_at(x, z).unwrap_or(0);
        let y = (base as f32 + point.height_above_ground).floor() as i32;
        (x, y, z)
    }

    /// Returns the number of voxels written
    pub fn place(points: &[Point], ground: &impl GroundHeightField, store: &mut impl VoxelStore) -> Result<usize> {
        let mut written = 0;
        for point in points {
            let (x, y, z) = Self::cell(point, ground);
            if !store.contains_height(y) {
                continue;
            }
            if store.material(x, y, z)?.is_empty() {
                store.set_material(x, y, z, Material::Leaves)?;
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::TileGround;
    use crate::voxel::{ChunkCoord, VoxelWorld, WorldBounds};

    fn point(x: f32, z: f32, hag: f32) -> Point {
        Point {
            x,
            z,
            height_above_ground: hag,
            absolute_height: hag,
            color: None,
        }
    }

    #[test]
    fn test_places_above_ground() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), Some(10));
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        let points = vec![point(1.2, 3.7, 5.5), point(2.0, 2.0, 3.0)];

        let written = LeafPlacer::place(&points, &ground, &mut world).unwrap();
        assert_eq!(written, 2);
        assert_eq!(world.material(1, 15, 3).unwrap(), Material::Leaves);
        assert_eq!(world.material(2, 13, 2).unwrap(), Material::Leaves);
    }

    #[test]
    fn test_never_overwrites() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), Some(0));
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        world.set_material(1, 5, 1, Material::Building).unwrap();
        let points = vec![point(1.5, 1.5, 5.2), point(1.9, 1.1, 5.8), point(3.0, 3.0, 6.0)];

        let written = LeafPlacer::place(&points, &ground, &mut world).unwrap();
        assert_eq!(written, 1);
        assert_eq!(world.material(1, 5, 1).unwrap(), Material::Building);
    }

    #[test]
    fn test_skips_out_of_bounds() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), Some(60));
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        let points = vec![point(0.5, 0.5, 10.0), point(0.5, 0.5, 3.0)];
        let written = LeafPlacer::place(&points, &ground, &mut world).unwrap();
        assert_eq!(written, 1);
    }
}
