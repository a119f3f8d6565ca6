//! Run configuration for the tree placement driver

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud::WorldTransform;
use crate::core::{Error, Result};
use crate::ground::DemConfig;
use crate::trees::{ShrubConfig, TreeConfig};
use crate::voxel::WorldBounds;

/// Everything a run needs besides its inputs. Missing sections take defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub tree: TreeConfig,
    pub shrubs: ShrubConfig,
    pub dem: DemConfig,
    pub transform: WorldTransform,
    pub world: WorldBounds,
}

impl PipelineConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.tree.validate()?;
        if self.world.min_y >= self.world.max_y {
            return Err(Error::Config(format!(
                "world bounds are empty: [{}, {})",
                self.world.min_y, self.world.max_y
            )));
        }
        if self.shrubs.density_low > self.shrubs.density_high {
            return Err(Error::Config(format!(
                "shrub density_low ({}) exceeds density_high ({})",
                self.shrubs.density_low, self.shrubs.density_high
            )));
        }
        if self.dem.neighbours == 0 || self.dem.soil_depth < 0 || self.dem.surface.is_empty() {
            return Err(Error::Config(
                "dem needs at least one neighbour, a non-negative soil depth and a solid surface".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterAlgorithm;
    use crate::voxel::Material;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = PipelineConfig::default();
        config.tree.reassignment_radius = Some(6.0);
        config.dem.surface = Material::Moss;
        config.transform.rotation_degrees = 28.0;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "tree": {"horizontal": {"dbscan": {"eps": 1.5, "min_samples": 5}}},
                "world": {"min_y": 0, "max_y": 256}
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.world, WorldBounds::new(0, 256));
        assert!(matches!(config.tree.horizontal, ClusterAlgorithm::Dbscan(_)));
        assert_eq!(config.shrubs, ShrubConfig::default());
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"trees": {}}"#).unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(Error::Json(_))));

        std::fs::write(&path, r#"{"world": {"min_y": 10, "max_y": 10}}"#).unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(Error::Config(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(PipelineConfig::load(&missing), Err(Error::Io(_))));
    }
}
