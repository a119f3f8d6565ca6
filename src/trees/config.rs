//! Tree reconstruction parameters

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterAlgorithm, DbscanParams};
use crate::core::{Error, Result};

/// Configuration for the per-tile tree pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Points at or below this height above ground are dropped.
    pub min_height_above_ground: f32,
    /// Clustering of the horizontal point projection into trees.
    pub horizontal: ClusterAlgorithm,
    /// Clusters with a vertical length ratio below this are crown fragments.
    pub vlr_cutoff: f32,
    /// Crown points farther than this from every trunk centre join no tree.
    pub reassignment_radius: Option<f32>,
    /// 3-D sub-clustering of a tree's points into branch targets.
    pub branch: DbscanParams,
    /// Attachment heights tried above and below the sub-cluster centroid.
    pub attachment_window: i32,
    /// Longest rasterised branch, in cells.
    pub max_branch_length: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_height_above_ground: 2.0,
            horizontal: ClusterAlgorithm::default(),
            vlr_cutoff: 0.62,
            reassignment_radius: None,
            branch: DbscanParams {
                eps: 2.0,
                min_samples: 7,
            },
            attachment_window: 2,
            max_branch_length: 7,
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.vlr_cutoff) {
            return Err(Error::Config(format!(
                "vlr_cutoff must lie in [0, 1], got {}",
                self.vlr_cutoff
            )));
        }
        if let Some(radius) = self.reassignment_radius {
            if radius <= 0.0 {
                return Err(Error::Config(format!(
                    "reassignment_radius must be positive, got {}",
                    radius
                )));
            }
        }
        if self.branch.eps <= 0.0 || self.branch.min_samples == 0 {
            return Err(Error::Config("branch clustering needs eps > 0 and min_samples > 0".into()));
        }
        if self.attachment_window < 0 {
            return Err(Error::Config("attachment_window cannot be negative".into()));
        }
        match &self.horizontal {
            ClusterAlgorithm::MeanShift(params) => {
                if params.bandwidth.is_some_and(|b| b <= 0.0) || params.min_bandwidth <= 0.0 {
                    return Err(Error::Config("mean shift bandwidth must be positive".into()));
                }
                if !(params.quantile > 0.0 && params.quantile <= 1.0) {
                    return Err(Error::Config(format!(
                        "mean shift quantile must lie in (0, 1], got {}",
                        params.quantile
                    )));
                }
            }
            ClusterAlgorithm::Dbscan(params) => {
                if params.eps <= 0.0 {
                    return Err(Error::Config("dbscan eps must be positive".into()));
                }
            }
        }
        Ok(())
    }
}
