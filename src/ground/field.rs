//! Ground height fields

use crate::voxel::{ChunkCoord, Material, VoxelStore, CHUNK_SIZE};

/// Height of the ground surface per integer column.
pub trait GroundHeightField {
    /// Top ground cell of column `(x, z)`, or `None` when nothing solid is there
    fn height_at(&self, x: i32, z: i32) -> Option<i32>;
}

/// Reads ground heights from the topmost solid voxel of each store column.
pub struct SurfaceHeightField<'a, S: VoxelStore> {
    store: &'a S,
    ignored: Vec<Material>,
}

impl<'a, S: VoxelStore> SurfaceHeightField<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            ignored: Vec::new(),
        }
    }

    /// Skip these materials when looking for the surface
    pub fn with_ignored(mut self, ignored: &[Material]) -> Self {
        self.ignored = ignored.to_vec();
        self
    }
}

impl<S: VoxelStore> GroundHeightField for SurfaceHeightField<'_, S> {
    fn height_at(&self, x: i32, z: i32) -> Option<i32> {
        match self.store.column(x, z) {
            Ok(column) => column.top_solid(&self.ignored),
            Err(err) => {
                log::warn!("Ground lookup failed at ({}, {}): {}", x, z, err);
                None
            }
        }
    }
}

/// Ground heights of one tile, captured before the tile's voxels are written.
#[derive(Clone, Debug)]
pub struct TileGround {
    coord: ChunkCoord,
    heights: Vec<Option<i32>>,
}

impl TileGround {
    /// Snapshot every column of the tile from `field`
    pub fn capture(coord: ChunkCoord, field: &impl GroundHeightField) -> Self {
        let (ox, oz) = coord.block_origin();
        let mut heights = Vec::with_capacity((CHUNK_SIZE * CHUNK_SIZE) as usize);
        for dx in 0..CHUNK_SIZE {
            for dz in 0..CHUNK_SIZE {
                heights.push(field.height_at(ox + dx, oz + dz));
            }
        }
        Self { coord, heights }
    }

    /// Same ground height everywhere in the tile
    pub fn uniform(coord: ChunkCoord, height: Option<i32>) -> Self {
        Self {
            coord,
            heights: vec![height; (CHUNK_SIZE * CHUNK_SIZE) as usize],
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Number of columns with a known ground height
    pub fn resolved_count(&self) -> usize {
        self.heights.iter().filter(|h| h.is_some()).count()
    }
}

impl GroundHeightField for TileGround {
    fn height_at(&self, x: i32, z: i32) -> Option<i32> {
        if ChunkCoord::from_block(x, z) != self.coord {
            return None;
        }
        let lx = x.rem_euclid(CHUNK_SIZE);
        let lz = z.rem_euclid(CHUNK_SIZE);
        self.heights[(lx * CHUNK_SIZE + lz) as usize]
    }
}
