//! Mathematical utilities

pub mod line;
pub mod raster;

pub use line::summed_line_distance;
pub use raster::bresenham_3d;
