//! Ground height lookups used to normalize point heights

pub mod field;
pub mod dem;

pub use dem::{DemConfig, DemGrid, DemRasterizer};
pub use field::{GroundHeightField, SurfaceHeightField, TileGround};
