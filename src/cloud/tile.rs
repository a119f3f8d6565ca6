//! Partitioning points into chunk-aligned tiles

use std::collections::BTreeMap;

use crate::voxel::ChunkCoord;
use super::point::RawPoint;

/// Points of one class falling inside one chunk-aligned tile.
#[derive(Clone, Debug)]
pub struct Tile {
    pub coord: ChunkCoord,
    pub points: Vec<RawPoint>,
}

impl Tile {
    pub fn new(coord: ChunkCoord, points: Vec<RawPoint>) -> Self {
        Self { coord, points }
    }
}

/// Group points of the given classification by tile, in ascending tile order.
pub fn partition<'a>(points: impl IntoIterator<Item = &'a RawPoint>, classification: u8) -> Vec<Tile> {
    let mut tiles: BTreeMap<ChunkCoord, Vec<RawPoint>> = BTreeMap::new();
    for point in points {
        if point.classification != classification {
            continue;
        }
        let (x, z) = point.column();
        tiles.entry(ChunkCoord::from_block(x, z)).or_default().push(*point);
    }
    tiles
        .into_iter()
        .map(|(coord, points)| Tile::new(coord, points))
        .collect()
}
