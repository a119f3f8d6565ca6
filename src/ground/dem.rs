//! Terrain rasterised from ground-classified points

use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use serde::{Deserialize, Serialize};

use crate::cloud::RawPoint;
use crate::core::Result;
use crate::voxel::{Material, VoxelStore};
use super::field::GroundHeightField;

/// Parameters for turning ground points into terrain columns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemConfig {
    pub enabled: bool,
    /// Ground points averaged per column
    pub neighbours: usize,
    /// Search radius in columns from the column centre; columns with fewer
    /// points in reach stay unresolved
    pub max_search_radius: i32,
    /// Material on top of each terrain column
    pub surface: Material,
    /// Dirt cells below the surface
    pub soil_depth: i32,
}

impl Default for DemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            neighbours: 3,
            max_search_radius: 32,
            surface: Material::GrassBlock,
            soil_depth: 3,
        }
    }
}

/// Rectangular grid of terrain heights covering the ground points' extent.
#[derive(Clone, Debug)]
pub struct DemGrid {
    min_x: i32,
    min_z: i32,
    width: i32,
    depth: i32,
    heights: Vec<Option<i32>>,
}

impl DemGrid {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Resolved columns as `(x, z, height)`
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.heights.iter().enumerate().filter_map(move |(i, h)| {
            let i = i as i32;
            h.map(|h| (self.min_x + i / self.depth, self.min_z + i % self.depth, h))
        })
    }

    pub fn resolved_count(&self) -> usize {
        self.heights.iter().filter(|h| h.is_some()).count()
    }
}

impl GroundHeightField for DemGrid {
    fn height_at(&self, x: i32, z: i32) -> Option<i32> {
        let dx = x - self.min_x;
        let dz = z - self.min_z;
        if dx < 0 || dz < 0 || dx >= self.width || dz >= self.depth {
            return None;
        }
        self.heights[(dx * self.depth + dz) as usize]
    }
}

/// Builds a [`DemGrid`] from ground points and writes it into a store.
pub struct DemRasterizer {
    config: DemConfig,
}

impl DemRasterizer {
    pub fn new(config: DemConfig) -> Self {
        Self { config }
    }

    /// Height per column is the mean height of the nearest ground points,
    /// measured horizontally from the column centre.
    pub fn build(&self, points: &[RawPoint]) -> Option<DemGrid> {
        let k = self.config.neighbours.max(1);
        let mut tree: KdTree<f32, f32, [f32; 2]> = KdTree::with_capacity(2, 64);
        let (mut min_x, mut min_z) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_z) = (i32::MIN, i32::MIN);
        let mut indexed = 0;
        for p in points {
            if let Err(err) = tree.add([p.x, p.z], p.height) {
                log::warn!("Ground point ({}, {}) skipped: {:?}", p.x, p.z, err);
                continue;
            }
            let (cx, cz) = p.column();
            min_x = min_x.min(cx);
            min_z = min_z.min(cz);
            max_x = max_x.max(cx);
            max_z = max_z.max(cz);
            indexed += 1;
        }
        if indexed == 0 {
            return None;
        }

        let width = max_x - min_x + 1;
        let depth = max_z - min_z + 1;
        let reach = self.config.max_search_radius as f32;
        let mut heights = Vec::with_capacity((width * depth) as usize);
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                let centre = [x as f32 + 0.5, z as f32 + 0.5];
                let height = tree
                    .nearest(&centre, k, &squared_euclidean)
                    .ok()
                    .filter(|found| found.len() == k && found[k - 1].0 <= reach * reach)
                    .map(|found| {
                        let mean = found.iter().map(|&(_, &h)| h).sum::<f32>() / k as f32;
                        mean.floor() as i32
                    });
                heights.push(height);
            }
        }

        let grid = DemGrid {
            min_x,
            min_z,
            width,
            depth,
            heights,
        };
        log::debug!(
            "DEM {}x{} from {} ground points, {} columns resolved",
            width,
            depth,
            indexed,
            grid.resolved_count()
        );
        Some(grid)
    }

    /// Write terrain columns into empty cells, returns the number of voxels written.
    pub fn rasterize(&self, grid: &DemGrid, store: &mut impl VoxelStore) -> Result<usize> {
        let mut written = 0;
        for (x, z, top) in grid.iter() {
            if place_if_empty(store, x, top, z, self.config.surface)? {
                written += 1;
            }
            for y in (top - self.config.soil_depth..top).rev() {
                if place_if_empty(store, x, y, z, Material::Dirt)? {
                    written += 1;
                }
            }
        }
        log::info!("DEM wrote {} voxels over {} columns", written, grid.resolved_count());
        Ok(written)
    }
}

fn place_if_empty(store: &mut impl VoxelStore, x: i32, y: i32, z: i32, material: Material) -> Result<bool> {
    if !store.contains_height(y) || !store.material(x, y, z)?.is_empty() {
        return Ok(false);
    }
    store.set_material(x, y, z, material)?;
    Ok(true)
}
