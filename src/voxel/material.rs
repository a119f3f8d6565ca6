//! Voxel material type

use serde::{Deserialize, Serialize};

/// Material stored in a single voxel cell. `Empty` is air.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Empty = 0,
    Stone = 1,
    Dirt = 2,
    GrassBlock = 3,
    Moss = 4,
    Water = 5,
    Building = 6,
    Leaves = 7,
    Trunk = 8,
    Branch = 9,
    ShrubLeaves = 10,
    ShortGrass = 11,
}

impl Material {
    /// Every material, in discriminant order
    pub const ALL: [Material; 12] = [
        Material::Empty,
        Material::Stone,
        Material::Dirt,
        Material::GrassBlock,
        Material::Moss,
        Material::Water,
        Material::Building,
        Material::Leaves,
        Material::Trunk,
        Material::Branch,
        Material::ShrubLeaves,
        Material::ShortGrass,
    ];

    /// Decode a stored byte
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Encode as a stored byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if voxel is empty (air)
    pub fn is_empty(self) -> bool {
        self == Material::Empty
    }

    /// Materials written by the tree and shrub placers
    pub fn is_vegetation(self) -> bool {
        matches!(
            self,
            Material::Leaves
                | Material::Trunk
                | Material::Branch
                | Material::ShrubLeaves
                | Material::ShortGrass
        )
    }

    /// Base RGB888 color used by the canopy preview
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Material::Empty => (0, 0, 0),
            Material::Stone => (125, 125, 125),
            Material::Dirt => (134, 96, 67),
            Material::GrassBlock => (95, 159, 53),
            Material::Moss => (89, 109, 45),
            Material::Water => (63, 118, 228),
            Material::Building => (180, 170, 160),
            Material::Leaves => (40, 130, 30),
            Material::Trunk => (90, 60, 30),
            Material::Branch => (110, 80, 45),
            Material::ShrubLeaves => (112, 140, 46),
            Material::ShortGrass => (120, 180, 80),
        }
    }
}
