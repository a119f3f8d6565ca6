//! In-memory voxel world made of column chunks

use std::collections::HashMap;

use crate::core::{Error, Result};
use super::chunk::{Chunk, ChunkCoord, WorldBounds, CHUNK_SIZE};
use super::material::Material;
use super::store::{Column, VoxelStore};

/// Container for managing a world composed of multiple chunks
pub struct VoxelWorld {
    /// Vertical extent shared by every chunk
    bounds: WorldBounds,
    /// Map from chunk coordinates to loaded chunks
    chunks: HashMap<ChunkCoord, Chunk>,
    /// List of chunk coordinates that have been modified and need saving
    modified_chunks: Vec<ChunkCoord>,
}

impl VoxelWorld {
    /// Create a new empty world
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            chunks: HashMap::new(),
            modified_chunks: Vec::new(),
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Get immutable reference to a chunk by coordinate
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Insert a chunk into the world
    /// If a chunk already exists at this coordinate, it will be replaced
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Result<()> {
        if chunk.bounds != self.bounds {
            return Err(Error::Voxel(format!(
                "chunk {:?} has bounds {:?}, world expects {:?}",
                chunk.coord, chunk.bounds, self.bounds
            )));
        }
        let coord = chunk.coord;
        let modified = chunk.modified;
        self.chunks.insert(coord, chunk);
        if modified {
            self.mark_modified(coord);
        }
        Ok(())
    }

    /// Get the number of loaded chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get an iterator over all loaded chunk coordinates
    pub fn loaded_coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Mark a chunk as modified (needs to be saved)
    pub fn mark_modified(&mut self, coord: ChunkCoord) {
        // Only add if not already in the list
        if !self.modified_chunks.contains(&coord) {
            self.modified_chunks.push(coord);
        }

        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.modified = true;
        }
    }

    /// Take the list of modified chunks and clear the internal list
    /// Returns the coordinates of chunks that need to be saved
    pub fn take_modified(&mut self) -> Vec<ChunkCoord> {
        for coord in &self.modified_chunks {
            if let Some(chunk) = self.chunks.get_mut(coord) {
                chunk.modified = false;
            }
        }
        std::mem::take(&mut self.modified_chunks)
    }

    fn local(x: i32, z: i32) -> (ChunkCoord, i32, i32) {
        (
            ChunkCoord::from_block(x, z),
            x.rem_euclid(CHUNK_SIZE),
            z.rem_euclid(CHUNK_SIZE),
        )
    }
}

impl Default for VoxelWorld {
    fn default() -> Self {
        Self::new(WorldBounds::default())
    }
}

impl VoxelStore for VoxelWorld {
    fn height_bounds(&self) -> (i32, i32) {
        (self.bounds.min_y, self.bounds.max_y)
    }

    fn column(&self, x: i32, z: i32) -> Result<Column> {
        let (coord, lx, lz) = Self::local(x, z);
        let materials = match self.chunks.get(&coord) {
            Some(chunk) => chunk.column(lx, lz).to_vec(),
            None => vec![Material::Empty; self.bounds.height()],
        };
        Ok(Column::new(self.bounds.min_y, materials))
    }

    fn material(&self, x: i32, y: i32, z: i32) -> Result<Material> {
        if !self.bounds.contains(y) {
            return Ok(Material::Empty);
        }
        let (coord, lx, lz) = Self::local(x, z);
        Ok(self
            .chunks
            .get(&coord)
            .and_then(|chunk| chunk.get(lx, y, lz))
            .unwrap_or_default())
    }

    fn set_material(&mut self, x: i32, y: i32, z: i32, material: Material) -> Result<()> {
        if !self.bounds.contains(y) {
            return Err(Error::OutOfBounds { x, y, z });
        }
        let (coord, lx, lz) = Self::local(x, z);
        let bounds = self.bounds;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord, bounds));
        // A clean chunk is never in the modified list
        let was_clean = !chunk.modified;
        chunk.set(lx, y, lz, material);
        if was_clean {
            self.modified_chunks.push(coord);
        }
        Ok(())
    }
}
