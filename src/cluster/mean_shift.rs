//! Flat-kernel mean shift with bin seeding
//!
//! Seeds come from a grid of bandwidth-sized bins; each seed climbs to the
//! mean of the points around it until it settles. Converged modes are
//! de-duplicated strongest first, and every point joins its nearest mode if
//! that mode is within one bandwidth.

use std::collections::BTreeMap;

use glam::{IVec3, Vec3};
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Clusterer, Clustering, ClusteringInfeasible, PointGrid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeanShiftParams {
    /// Kernel radius; estimated from the data when unset
    pub bandwidth: Option<f32>,
    /// Fraction of the point count used as `k` for bandwidth estimation
    pub quantile: f32,
    /// Lower bound for an estimated bandwidth
    pub min_bandwidth: f32,
    /// Points a bin needs before it becomes a seed
    pub min_bin_freq: usize,
    pub max_iter: usize,
}

impl Default for MeanShiftParams {
    fn default() -> Self {
        Self {
            bandwidth: None,
            quantile: 0.3,
            min_bandwidth: 1.0,
            min_bin_freq: 4,
            max_iter: 127,
        }
    }
}

pub struct MeanShift {
    params: MeanShiftParams,
}

impl MeanShift {
    pub fn new(params: MeanShiftParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MeanShiftParams {
        &self.params
    }

    fn bandwidth(&self, points: &[Vec3]) -> Result<f32, ClusteringInfeasible> {
        if let Some(bandwidth) = self.params.bandwidth {
            return Ok(bandwidth);
        }
        let estimated = estimate_bandwidth(points, self.params.quantile).ok_or_else(|| {
            ClusteringInfeasible::new(format!(
                "{} points are too few to estimate a bandwidth",
                points.len()
            ))
        })?;
        Ok(estimated.max(self.params.min_bandwidth))
    }

    /// Seeds are the centres of bins holding at least `min_bin_freq` points, in bin order
    fn seeds(&self, points: &[Vec3], bandwidth: f32) -> Vec<Vec3> {
        let mut bins: BTreeMap<[i32; 3], usize> = BTreeMap::new();
        for &p in points {
            let bin = (p / bandwidth).round().as_ivec3();
            *bins.entry(bin.to_array()).or_default() += 1;
        }
        bins.into_iter()
            .filter(|&(_, count)| count >= self.params.min_bin_freq)
            .map(|(bin, _)| IVec3::from_array(bin).as_vec3() * bandwidth)
            .collect()
    }

    /// Climb from `seed` to a local density maximum, returning the mode and
    /// the number of points within bandwidth of it.
    fn climb(&self, grid: &PointGrid<'_>, seed: Vec3, bandwidth: f32) -> Option<(Vec3, usize)> {
        let stop = 1e-3 * bandwidth;
        let mut mean = seed;
        let mut iterations = 0;
        loop {
            let (sum, count) = grid.sum_within(mean, bandwidth);
            if count == 0 {
                return None;
            }
            let previous = mean;
            mean = sum / count as f32;
            if mean.distance(previous) <= stop || iterations >= self.params.max_iter {
                return Some((mean, count));
            }
            iterations += 1;
        }
    }
}

impl Clusterer for MeanShift {
    fn cluster(&self, points: &[Vec3]) -> Result<Clustering, ClusteringInfeasible> {
        let bandwidth = self.bandwidth(points)?;
        let seeds = self.seeds(points, bandwidth);
        if seeds.is_empty() {
            return Err(ClusteringInfeasible::new(format!(
                "no bin of width {:.2} holds {} points",
                bandwidth, self.params.min_bin_freq
            )));
        }

        let grid = PointGrid::new(points, bandwidth);
        let mut modes: Vec<(Vec3, usize)> = seeds
            .par_iter()
            .filter_map(|&seed| self.climb(&grid, seed, bandwidth))
            .collect();

        // Strongest first, ties by position
        modes.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then(a.0.x.total_cmp(&b.0.x))
                .then(a.0.y.total_cmp(&b.0.y))
                .then(a.0.z.total_cmp(&b.0.z))
        });

        let mut centers: Vec<Vec3> = Vec::new();
        for (mode, _) in modes {
            if centers.iter().all(|c| c.distance(mode) > bandwidth) {
                centers.push(mode);
            }
        }
        if centers.is_empty() {
            return Err(ClusteringInfeasible::new("no mode converged"));
        }

        let labels: Vec<Option<usize>> = points
            .iter()
            .map(|&p| {
                centers
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i, c.distance(p)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .filter(|&(_, d)| d <= bandwidth)
                    .map(|(i, _)| i)
            })
            .collect();

        log::trace!(
            "mean shift: {} points, bandwidth {:.2}, {} seeds -> {} modes",
            points.len(),
            bandwidth,
            seeds.len(),
            centers.len()
        );
        Ok(Clustering::from_labels(points, &labels))
    }
}

/// Mean over all points of the distance to their `k`-th nearest neighbour,
/// `k = floor(n * quantile)`, with each point its own first neighbour.
///
/// Returns `None` when `k` is zero.
pub fn estimate_bandwidth(points: &[Vec3], quantile: f32) -> Option<f32> {
    let k = (points.len() as f32 * quantile).floor() as usize;
    if k == 0 {
        return None;
    }
    let k = k.min(points.len());
    let mut tree: KdTree<f32, usize, [f32; 3]> = KdTree::with_capacity(3, 64);
    for (i, p) in points.iter().enumerate() {
        tree.add(p.to_array(), i).ok()?;
    }
    let total: f32 = points
        .par_iter()
        .map(|p| {
            tree.nearest(&p.to_array(), k, &squared_euclidean)
                .ok()
                .and_then(|found| found.last().map(|&(d, _)| d.sqrt()))
                .unwrap_or(0.0)
        })
        .sum();
    Some(total / points.len() as f32)
}
