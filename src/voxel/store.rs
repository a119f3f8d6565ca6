//! Voxel store capability used by every placement stage

use crate::core::Result;
use super::material::Material;

/// One vertical column of materials, ordered bottom to top starting at `min_y`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    pub min_y: i32,
    pub materials: Vec<Material>,
}

impl Column {
    pub fn new(min_y: i32, materials: Vec<Material>) -> Self {
        Self { min_y, materials }
    }

    /// Material at absolute height `y`, `Empty` outside the column
    pub fn get(&self, y: i32) -> Material {
        let offset = y - self.min_y;
        if offset < 0 {
            return Material::Empty;
        }
        self.materials.get(offset as usize).copied().unwrap_or_default()
    }

    /// Iterate `(y, material)` bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (i32, Material)> + '_ {
        self.materials
            .iter()
            .enumerate()
            .map(move |(i, &m)| (self.min_y + i as i32, m))
    }

    /// Height of the topmost non-empty voxel not listed in `ignored`
    pub fn top_solid(&self, ignored: &[Material]) -> Option<i32> {
        self.iter()
            .rev()
            .find(|&(_, m)| !m.is_empty() && !ignored.contains(&m))
            .map(|(y, _)| y)
    }

    /// Height of the topmost voxel of the given material
    pub fn top_of(&self, material: Material) -> Option<i32> {
        self.iter().rev().find(|&(_, m)| m == material).map(|(y, _)| y)
    }

    /// Whether any voxel in the column has the given material
    pub fn contains(&self, material: Material) -> bool {
        self.materials.contains(&material)
    }
}

/// Read/write access to a voxel world.
///
/// Stores never refuse overwrites; callers check occupancy themselves.
pub trait VoxelStore {
    /// Half-open vertical range `[min, max)` the store can hold
    fn height_bounds(&self) -> (i32, i32);

    /// Full column at `(x, z)`
    fn column(&self, x: i32, z: i32) -> Result<Column>;

    /// Single cell, `Empty` where nothing was written
    fn material(&self, x: i32, y: i32, z: i32) -> Result<Material>;

    /// Write a single cell
    fn set_material(&mut self, x: i32, y: i32, z: i32, material: Material) -> Result<()>;

    /// Whether `y` lies within the store's height bounds
    fn contains_height(&self, y: i32) -> bool {
        let (min, max) = self.height_bounds();
        y >= min && y < max
    }
}
