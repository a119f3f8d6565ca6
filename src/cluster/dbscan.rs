//! DBSCAN density clustering

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{Clusterer, Clustering, ClusteringInfeasible, PointGrid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbscanParams {
    /// Neighbourhood radius, inclusive
    pub eps: f32,
    /// Neighbours (the point itself included) needed for a core point
    pub min_samples: usize,
}

impl Default for DbscanParams {
    fn default() -> Self {
        Self {
            eps: 2.0,
            min_samples: 7,
        }
    }
}

pub struct Dbscan {
    params: DbscanParams,
}

impl Dbscan {
    pub fn new(params: DbscanParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DbscanParams {
        &self.params
    }
}

impl Clusterer for Dbscan {
    fn cluster(&self, points: &[Vec3]) -> Result<Clustering, ClusteringInfeasible> {
        let DbscanParams { eps, min_samples } = self.params;
        if points.len() < min_samples.max(1) {
            return Err(ClusteringInfeasible::new(format!(
                "{} points, dbscan needs at least {}",
                points.len(),
                min_samples
            )));
        }

        let grid = PointGrid::new(points, eps);
        let neighbours: Vec<Vec<usize>> = points.iter().map(|&p| grid.within(p, eps)).collect();
        let is_core = |i: usize| neighbours[i].len() >= min_samples;

        let mut labels: Vec<Option<usize>> = vec![None; points.len()];
        let mut next_label = 0;
        let mut queue = VecDeque::new();

        for seed in 0..points.len() {
            if labels[seed].is_some() || !is_core(seed) {
                continue;
            }
            labels[seed] = Some(next_label);
            queue.push_back(seed);
            while let Some(current) = queue.pop_front() {
                if !is_core(current) {
                    continue;
                }
                for &n in &neighbours[current] {
                    if labels[n].is_none() {
                        labels[n] = Some(next_label);
                        queue.push_back(n);
                    }
                }
            }
            next_label += 1;
        }

        log::trace!(
            "dbscan: {} points -> {} clusters (eps {}, min_samples {})",
            points.len(),
            next_label,
            eps,
            min_samples
        );
        Ok(Clustering::from_labels(points, &labels))
    }
}
