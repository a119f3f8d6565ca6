//! Trunk columns under each tree

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::ground::GroundHeightField;
use crate::voxel::{Material, VoxelStore};
use super::strata::Cluster;

/// A trunk written for one tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrunkPlacement {
    pub cluster: usize,
    pub column: (i32, i32),
    pub base_height: i32,
    /// Highest leaf voxel of the column
    pub top_height: i32,
    pub voxels_written: usize,
}

pub struct TrunkPlacer;

impl TrunkPlacer {
    /// Fill the tree's centre column from the ground up to its highest leaf.
    ///
    /// Returns `None` when the column holds no leaf to take the height from.
    pub fn place(
        tree: &Cluster,
        ground: &impl GroundHeightField,
        store: &mut impl VoxelStore,
    ) -> Result<Option<TrunkPlacement>> {
        let x = tree.center.x.floor() as i32;
        let z = tree.center.y.floor() as i32;

        let Some(top) = store.column(x, z)?.top_of(Material::Leaves) else {
            return Ok(None);
        };
        let base = ground.height_at(x, z).unwrap_or(0);

        let mut written = 0;
        for y in base..=top {
            if !store.contains_height(y) {
                continue;
            }
            if store.material(x, y, z)?.is_empty() {
                store.set_material(x, y, z, Material::Trunk)?;
                written += 1;
            }
        }
        log::trace!(
            "Trunk for cluster {} at ({}, {}): {}..={} ({} voxels)",
            tree.id,
            x,
            z,
            base,
            top,
            written
        );

        Ok(Some(TrunkPlacement {
            cluster: tree.id,
            column: (x, z),
            base_height: base,
            top_height: top,
            voxels_written: written,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::TileGround;
    use crate::voxel::{ChunkCoord, VoxelWorld, WorldBounds};
    use glam::Vec2;

    fn tree_at(x: f32, z: f32) -> Cluster {
        Cluster {
            id: 4,
            members: vec![0],
            center: Vec2::new(x, z),
            vertical_length_ratio: Some(0.9),
            max_height: 10.0,
        }
    }

    #[test]
    fn test_fills_to_highest_leaf() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), Some(5));
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        world.set_material(3, 5, 4, Material::GrassBlock).unwrap();
        world.set_material(3, 12, 4, Material::Leaves).unwrap();
        world.set_material(3, 18, 4, Material::Leaves).unwrap();

        let placement = TrunkPlacer::place(&tree_at(3.7, 4.2), &ground, &mut world)
            .unwrap()
            .unwrap();
        assert_eq!(placement.column, (3, 4));
        assert_eq!(placement.base_height, 5);
        assert_eq!(placement.top_height, 18);
        // 5..=18 minus ground, and two leaves
        assert_eq!(placement.voxels_written, 11);
        assert_eq!(world.material(3, 5, 4).unwrap(), Material::GrassBlock);
        assert_eq!(world.material(3, 12, 4).unwrap(), Material::Leaves);
        assert_eq!(world.material(3, 18, 4).unwrap(), Material::Leaves);
        assert_eq!(world.material(3, 13, 4).unwrap(), Material::Trunk);
        assert_eq!(world.material(3, 19, 4).unwrap(), Material::Empty);
    }

    #[test]
    fn test_no_leaves_no_trunk() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), Some(5));
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        let placement = TrunkPlacer::place(&tree_at(1.0, 1.0), &ground, &mut world).unwrap();
        assert!(placement.is_none());
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn test_unresolved_ground_starts_at_zero() {
        let ground = TileGround::uniform(ChunkCoord::new(0, 0), None);
        let mut world = VoxelWorld::new(WorldBounds::new(0, 64));
        world.set_material(0, 3, 0, Material::Leaves).unwrap();
        let placement = TrunkPlacer::place(&tree_at(0.5, 0.5), &ground, &mut world)
            .unwrap()
            .unwrap();
        assert_eq!(placement.base_height, 0);
        assert_eq!(placement.voxels_written, 3);
    }
}
