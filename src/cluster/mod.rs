//! Density clustering of point sets
//!
//! Clusterers never force points into clusters: points without a dense
//! enough neighbourhood come back as noise (`None` label).

pub mod grid;
pub mod mean_shift;
pub mod dbscan;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dbscan::{Dbscan, DbscanParams};
pub use grid::PointGrid;
pub use mean_shift::{MeanShift, MeanShiftParams};

/// Input a clusterer cannot work with (too few points, no seeds).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("clustering infeasible: {reason}")]
pub struct ClusteringInfeasible {
    pub reason: String,
}

impl ClusteringInfeasible {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Points sharing a label.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterGroup {
    /// Indices into the clustered point slice, ascending
    pub members: Vec<usize>,
    /// Mean position of the members
    pub center: Vec3,
}

/// Result of clustering a point slice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clustering {
    /// Group index per input point, `None` for noise
    pub labels: Vec<Option<usize>>,
    pub groups: Vec<ClusterGroup>,
}

impl Clustering {
    /// Build groups from raw labels. Labels are renumbered densely in order of
    /// first appearance of the raw label value.
    pub fn from_labels(points: &[Vec3], raw: &[Option<usize>]) -> Self {
        let mut remap: Vec<Option<usize>> = Vec::new();
        let mut groups: Vec<ClusterGroup> = Vec::new();
        let mut labels = Vec::with_capacity(raw.len());

        for (i, label) in raw.iter().enumerate() {
            let Some(label) = *label else {
                labels.push(None);
                continue;
            };
            if label >= remap.len() {
                remap.resize(label + 1, None);
            }
            let group = *remap[label].get_or_insert_with(|| {
                groups.push(ClusterGroup {
                    members: Vec::new(),
                    center: Vec3::ZERO,
                });
                groups.len() - 1
            });
            groups[group].members.push(i);
            labels.push(Some(group));
        }

        for group in &mut groups {
            let sum: Vec3 = group.members.iter().map(|&i| points[i]).sum();
            group.center = sum / group.members.len() as f32;
        }

        Self { labels, groups }
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Groups nearby points.
pub trait Clusterer: Send + Sync {
    fn cluster(&self, points: &[Vec3]) -> Result<Clustering, ClusteringInfeasible>;
}

/// Clustering algorithm selection, as found in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAlgorithm {
    MeanShift(MeanShiftParams),
    Dbscan(DbscanParams),
}

impl Default for ClusterAlgorithm {
    fn default() -> Self {
        ClusterAlgorithm::MeanShift(MeanShiftParams::default())
    }
}

impl ClusterAlgorithm {
    pub fn build(&self) -> Box<dyn Clusterer> {
        match self {
            ClusterAlgorithm::MeanShift(params) => Box::new(MeanShift::new(params.clone())),
            ClusterAlgorithm::Dbscan(params) => Box::new(Dbscan::new(params.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClusterAlgorithm::MeanShift(_) => "mean_shift",
            ClusterAlgorithm::Dbscan(_) => "dbscan",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_renumbers() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(12.0, 0.0, 0.0),
        ];
        let raw = vec![Some(4), Some(1), Some(4), None, Some(1)];
        let clustering = Clustering::from_labels(&points, &raw);

        assert_eq!(clustering.labels, vec![Some(0), Some(1), Some(0), None, Some(1)]);
        assert_eq!(clustering.groups.len(), 2);
        assert_eq!(clustering.groups[0].members, vec![0, 2]);
        assert_eq!(clustering.groups[0].center, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(clustering.groups[1].center, Vec3::new(11.0, 0.0, 0.0));
        assert_eq!(clustering.noise_count(), 1);
    }

    #[test]
    fn test_algorithm_serde() {
        let json = r#"{"dbscan": {"eps": 1.5, "min_samples": 3}}"#;
        let algorithm: ClusterAlgorithm = serde_json::from_str(json).unwrap();
        assert_eq!(
            algorithm,
            ClusterAlgorithm::Dbscan(DbscanParams {
                eps: 1.5,
                min_samples: 3
            })
        );
        assert_eq!(algorithm.name(), "dbscan");

        let json = r#"{"mean_shift": {"bandwidth": 2.0}}"#;
        let algorithm: ClusterAlgorithm = serde_json::from_str(json).unwrap();
        match algorithm {
            ClusterAlgorithm::MeanShift(params) => {
                assert_eq!(params.bandwidth, Some(2.0));
                assert_eq!(params.min_bin_freq, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_default_is_mean_shift() {
        assert_eq!(ClusterAlgorithm::default().name(), "mean_shift");
    }
}
