//! Column chunks: 16×16 vertical columns spanning the world height

use serde::{Deserialize, Serialize};

use super::material::Material;

/// Number of columns per chunk side; also the tile size of the tree pipeline
pub const CHUNK_SIZE: i32 = 16;

/// Vertical extent of a world, half-open `[min_y, max_y)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_y: i32,
    pub max_y: i32,
}

impl WorldBounds {
    pub fn new(min_y: i32, max_y: i32) -> Self {
        Self { min_y, max_y }
    }

    /// Number of cells in one column
    pub fn height(&self) -> usize {
        (self.max_y - self.min_y).max(0) as usize
    }

    pub fn contains(&self, y: i32) -> bool {
        y >= self.min_y && y < self.max_y
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self { min_y: -64, max_y: 320 }
    }
}

/// Integer coordinate identifying a chunk in the horizontal world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the block column `(x, z)`
    pub fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Block coordinates of the minimum corner of this chunk
    pub fn block_origin(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE, self.z * CHUNK_SIZE)
    }
}

/// A single chunk holding `CHUNK_SIZE²` columns of materials
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Coordinate of this chunk in the world grid
    pub coord: ChunkCoord,
    /// Vertical extent shared by all columns
    pub bounds: WorldBounds,
    /// Column-major storage: `(local_x * CHUNK_SIZE + local_z) * height + (y - min_y)`
    materials: Vec<Material>,
    /// Whether this chunk has been modified since last save
    pub modified: bool,
}

impl Chunk {
    /// Create a new empty chunk at the given coordinate
    pub fn new(coord: ChunkCoord, bounds: WorldBounds) -> Self {
        let len = (CHUNK_SIZE * CHUNK_SIZE) as usize * bounds.height();
        Self {
            coord,
            bounds,
            materials: vec![Material::Empty; len],
            modified: false,
        }
    }

    /// Create a chunk from previously stored materials
    pub fn from_materials(coord: ChunkCoord, bounds: WorldBounds, materials: Vec<Material>) -> Option<Self> {
        if materials.len() != (CHUNK_SIZE * CHUNK_SIZE) as usize * bounds.height() {
            return None;
        }
        Some(Self {
            coord,
            bounds,
            materials,
            modified: false,
        })
    }

    fn column_start(&self, local_x: i32, local_z: i32) -> usize {
        debug_assert!((0..CHUNK_SIZE).contains(&local_x) && (0..CHUNK_SIZE).contains(&local_z));
        (local_x * CHUNK_SIZE + local_z) as usize * self.bounds.height()
    }

    /// Materials of one column, bottom to top
    pub fn column(&self, local_x: i32, local_z: i32) -> &[Material] {
        let start = self.column_start(local_x, local_z);
        &self.materials[start..start + self.bounds.height()]
    }

    /// Material at local column `(local_x, local_z)` and absolute height `y`
    pub fn get(&self, local_x: i32, y: i32, local_z: i32) -> Option<Material> {
        if !self.bounds.contains(y) {
            return None;
        }
        let start = self.column_start(local_x, local_z);
        Some(self.materials[start + (y - self.bounds.min_y) as usize])
    }

    /// Set material; returns false if `y` is out of bounds
    pub fn set(&mut self, local_x: i32, y: i32, local_z: i32, material: Material) -> bool {
        if !self.bounds.contains(y) {
            return false;
        }
        let start = self.column_start(local_x, local_z);
        self.materials[start + (y - self.bounds.min_y) as usize] = material;
        self.modified = true;
        true
    }

    /// Raw material storage
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Number of non-empty voxels
    pub fn solid_count(&self) -> usize {
        self.materials.iter().filter(|m| !m.is_empty()).count()
    }
}
