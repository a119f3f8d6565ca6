//! Error types for treevox

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Point cloud error: {0}")]
    PointCloud(String),

    #[error("Voxel error: {0}")]
    Voxel(String),

    #[error("Voxel ({x}, {y}, {z}) is outside the world height bounds")]
    OutOfBounds { x: i32, y: i32, z: i32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<las::Error> for Error {
    fn from(err: las::Error) -> Self {
        Error::PointCloud(err.to_string())
    }
}
