//! Point cloud input: classified samples, transforms and tiling

pub mod class;
pub mod point;
pub mod transform;
pub mod source;
pub mod tile;

pub use point::{Point, RawPoint};
pub use source::{LasPointSource, PointSource};
pub use tile::{partition, Tile};
pub use transform::WorldTransform;
