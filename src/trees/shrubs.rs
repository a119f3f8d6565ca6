//! Low vegetation placed by point density per voxel

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cloud::RawPoint;
use crate::core::Result;
use crate::voxel::{Material, VoxelStore};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrubConfig {
    pub enabled: bool,
    /// Voxels with fewer points are ignored
    pub density_low: usize,
    /// Voxels with at least this many points become shrubs, sparser ones grass
    pub density_high: usize,
    /// Deepest shrub column grown downwards from a dense voxel
    pub max_depth: usize,
}

impl Default for ShrubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            density_low: 3,
            density_high: 20,
            max_depth: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShrubReport {
    /// Voxels that received grass or shrub material
    pub placed: usize,
    /// Voxels too sparse, or grass with nothing to grow on
    pub rejected: usize,
    pub grass_voxels: usize,
    pub shrub_voxels: usize,
}

pub struct ShrubPlacer {
    config: ShrubConfig,
}

impl ShrubPlacer {
    pub fn new(config: ShrubConfig) -> Self {
        Self { config }
    }

    pub fn place(&self, points: &[RawPoint], store: &mut impl VoxelStore) -> Result<ShrubReport> {
        let mut density: BTreeMap<(i32, i32, i32), usize> = BTreeMap::new();
        for p in points {
            let (x, z) = p.column();
            *density.entry((x, p.height.floor() as i32, z)).or_default() += 1;
        }

        let mut report = ShrubReport::default();
        for ((x, y, z), count) in density {
            if !store.contains_height(y) || !store.material(x, y, z)?.is_empty() {
                continue;
            }
            if count < self.config.density_low {
                report.rejected += 1;
            } else if count < self.config.density_high {
                let below = store.material(x, y - 1, z)?;
                if matches!(below, Material::GrassBlock | Material::Moss) {
                    store.set_material(x, y, z, Material::ShortGrass)?;
                    report.grass_voxels += 1;
                    report.placed += 1;
                } else {
                    report.rejected += 1;
                }
            } else {
                let mut grown = 0;
                let mut cy = y;
                while grown < self.config.max_depth
                    && store.contains_height(cy)
                    && store.material(x, cy, z)?.is_empty()
                {
                    store.set_material(x, cy, z, Material::ShrubLeaves)?;
                    grown += 1;
                    cy -= 1;
                }
                report.shrub_voxels += grown;
                report.placed += 1;
            }
        }

        log::info!(
            "Shrubs: {} voxels placed ({} grass, {} shrub), {} rejected",
            report.placed,
            report.grass_voxels,
            report.shrub_voxels,
            report.rejected
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::class;
    use crate::voxel::{VoxelWorld, WorldBounds};

    fn cluster(x: f32, z: f32, h: f32, n: usize) -> Vec<RawPoint> {
        (0..n)
            .map(|i| RawPoint::new(x + (i % 4) as f32 * 0.2, z, h + (i / 4) as f32 * 0.01, class::LOW_VEGETATION))
            .collect()
    }

    fn world_with_ground() -> VoxelWorld {
        let mut world = VoxelWorld::new(WorldBounds::new(0, 32));
        for x in 0..8 {
            for z in 0..8 {
                world.set_material(x, 4, z, Material::GrassBlock).unwrap();
            }
        }
        world
    }

    #[test]
    fn test_sparse_voxels_rejected() {
        let mut world = world_with_ground();
        let report = ShrubPlacer::new(ShrubConfig::default())
            .place(&cluster(1.0, 1.0, 5.0, 2), &mut world)
            .unwrap();
        assert_eq!(report.rejected, 1);
        assert_eq!(report.placed, 0);
        assert_eq!(world.material(1, 5, 1).unwrap(), Material::Empty);
    }

    #[test]
    fn test_grass_needs_grass_below() {
        let mut world = world_with_ground();
        let mut points = cluster(1.0, 1.0, 5.0, 5);
        points.extend(cluster(2.0, 2.0, 7.0, 5));
        let report = ShrubPlacer::new(ShrubConfig::default()).place(&points, &mut world).unwrap();
        assert_eq!(report.grass_voxels, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(world.material(1, 5, 1).unwrap(), Material::ShortGrass);
        assert_eq!(world.material(2, 7, 2).unwrap(), Material::Empty);
    }

    #[test]
    fn test_dense_voxel_grows_down() {
        let mut world = world_with_ground();
        let report = ShrubPlacer::new(ShrubConfig::default())
            .place(&cluster(3.0, 3.0, 10.0, 24), &mut world)
            .unwrap();
        assert_eq!(report.placed, 1);
        assert_eq!(report.shrub_voxels, 4);
        for y in 7..=10 {
            assert_eq!(world.material(3, y, 3).unwrap(), Material::ShrubLeaves);
        }
        assert_eq!(world.material(3, 6, 3).unwrap(), Material::Empty);

        // Stops at the ground
        let report = ShrubPlacer::new(ShrubConfig::default())
            .place(&cluster(5.0, 5.0, 6.0, 24), &mut world)
            .unwrap();
        assert_eq!(report.shrub_voxels, 2);
        assert_eq!(world.material(5, 4, 5).unwrap(), Material::GrassBlock);
    }

    #[test]
    fn test_occupied_voxels_untouched() {
        let mut world = world_with_ground();
        world.set_material(1, 5, 1, Material::Leaves).unwrap();
        let report = ShrubPlacer::new(ShrubConfig::default())
            .place(&cluster(1.0, 1.0, 5.0, 30), &mut world)
            .unwrap();
        assert_eq!(report, ShrubReport::default());
        assert_eq!(world.material(1, 5, 1).unwrap(), Material::Leaves);
    }
}
