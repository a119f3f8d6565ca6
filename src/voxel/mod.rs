//! Voxel data structures and the store capability used by the tree pipeline

pub mod material;
pub mod store;
pub mod chunk;
pub mod world;
pub mod disk_io;

pub use chunk::{Chunk, ChunkCoord, WorldBounds, CHUNK_SIZE};
pub use material::Material;
pub use store::{Column, VoxelStore};
pub use world::VoxelWorld;
