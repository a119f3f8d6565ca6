//! Output artifacts derived from a finished world

pub mod preview;

pub use preview::{render_canopy, world_extent, ColumnBounds};
