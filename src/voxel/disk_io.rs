//! Chunk serialization and disk I/O

use std::fs;
use std::path::{Path, PathBuf};

use rkyv::{Archive, Deserialize, Serialize};

use crate::core::{Error, Result};
use super::chunk::{Chunk, ChunkCoord, WorldBounds};
use super::material::Material;
use super::world::VoxelWorld;

const HEADER_VERSION: u32 = 1;
const HEADER_FILENAME: &str = "world.json";
const CHUNK_DIR: &str = "chunks";
const CHUNK_EXTENSION: &str = "tvc";

/// World header (serialized as JSON for easy inspection)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct WorldHeader {
    version: u32,
    bounds: WorldBounds,
}

/// Serializable chunk data
#[derive(Archive, Deserialize, Serialize)]
pub struct ChunkData {
    pub coord_x: i32,
    pub coord_z: i32,
    pub min_y: i32,
    pub max_y: i32,
    /// Material bytes in chunk storage order
    pub materials: Vec<u8>,
}

/// Serialize a chunk to bytes (uncompressed)
pub fn serialize_chunk(chunk: &Chunk) -> Result<Vec<u8>> {
    let data = ChunkData {
        coord_x: chunk.coord.x,
        coord_z: chunk.coord.z,
        min_y: chunk.bounds.min_y,
        max_y: chunk.bounds.max_y,
        materials: chunk.materials().iter().map(|m| m.as_u8()).collect(),
    };

    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    Ok(bytes.to_vec())
}

/// Deserialize a chunk from bytes (uncompressed)
pub fn deserialize_chunk(data: &[u8]) -> Result<Chunk> {
    // rkyv validates alignment, so copy into an aligned buffer first
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(data.len());
    aligned.extend_from_slice(data);

    let archived = rkyv::access::<ArchivedChunkData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    let chunk_data: ChunkData = rkyv::deserialize::<ChunkData, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    let materials = chunk_data
        .materials
        .iter()
        .map(|&b| Material::from_u8(b).ok_or_else(|| Error::Serialization(format!("unknown material id {}", b))))
        .collect::<Result<Vec<_>>>()?;

    let coord = ChunkCoord::new(chunk_data.coord_x, chunk_data.coord_z);
    let bounds = WorldBounds::new(chunk_data.min_y, chunk_data.max_y);
    Chunk::from_materials(coord, bounds, materials)
        .ok_or_else(|| Error::Serialization(format!("chunk {:?} has a truncated material array", coord)))
}

/// Compress a serialized chunk using LZ4
pub fn compress_chunk(chunk: &Chunk) -> Result<Vec<u8>> {
    let serialized = serialize_chunk(chunk)?;
    Ok(lz4_flex::compress_prepend_size(&serialized))
}

/// Decompress and deserialize a chunk
pub fn decompress_chunk(data: &[u8]) -> Result<Chunk> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Serialization(format!("LZ4 decompression failed: {}", e)))?;
    deserialize_chunk(&decompressed)
}

/// Get the file path for a chunk
pub fn chunk_path(base_dir: &Path, coord: ChunkCoord) -> PathBuf {
    base_dir
        .join(CHUNK_DIR)
        .join(format!("chunk_{}_{}.{}", coord.x, coord.z, CHUNK_EXTENSION))
}

/// Whether `base_dir` holds a saved world
pub fn world_exists(base_dir: &Path) -> bool {
    base_dir.join(HEADER_FILENAME).is_file()
}

/// Save every modified chunk (compressed) plus the world header.
/// Returns the number of chunks written.
pub fn save_world(base_dir: &Path, world: &mut VoxelWorld) -> Result<usize> {
    fs::create_dir_all(base_dir.join(CHUNK_DIR))?;

    let header = WorldHeader {
        version: HEADER_VERSION,
        bounds: world.bounds(),
    };
    fs::write(base_dir.join(HEADER_FILENAME), serde_json::to_string_pretty(&header)?)?;

    let mut written = 0;
    for coord in world.take_modified() {
        let Some(chunk) = world.get_chunk(coord) else {
            continue;
        };
        fs::write(chunk_path(base_dir, coord), compress_chunk(chunk)?)?;
        written += 1;
    }

    log::debug!("Saved {} chunks to {}", written, base_dir.display());
    Ok(written)
}

/// Load a world saved with [`save_world`]
pub fn load_world(base_dir: &Path) -> Result<VoxelWorld> {
    let header: WorldHeader = serde_json::from_str(&fs::read_to_string(base_dir.join(HEADER_FILENAME))?)?;
    if header.version != HEADER_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported world version {} (expected {})",
            header.version, HEADER_VERSION
        )));
    }

    let mut world = VoxelWorld::new(header.bounds);
    let chunk_dir = base_dir.join(CHUNK_DIR);
    if chunk_dir.is_dir() {
        for entry in fs::read_dir(&chunk_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CHUNK_EXTENSION) {
                continue;
            }
            let chunk = decompress_chunk(&fs::read(&path)?)?;
            world.insert_chunk(chunk)?;
        }
    }

    log::info!("Loaded {} chunks from {}", world.chunk_count(), base_dir.display());
    Ok(world)
}
