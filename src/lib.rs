//! treevox - voxel trees reconstructed from classified LiDAR point clouds
//!
//! Tall-vegetation points are processed one chunk-aligned tile at a time:
//! heights are normalized against the ground, points are clustered into
//! trees, crown fragments are folded into the nearest trunk, and leaf, trunk
//! and branch voxels are written into a [`voxel::VoxelStore`].

pub mod core;
pub mod math;
pub mod voxel;
pub mod cloud;
pub mod ground;
pub mod cluster;
pub mod trees;
pub mod config;
pub mod export;

pub use config::PipelineConfig;
pub use core::{Error, Result};
