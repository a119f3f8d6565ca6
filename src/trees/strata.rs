//! Trunk/crown classification of horizontal clusters
//!
//! A cluster whose points span most of its height (high vertical length
//! ratio) reaches down towards the ground and is taken as a tree with a
//! trunk. Low-ratio clusters are crown fragments that got split off a
//! neighbouring tree; their points are handed to the nearest trunk cluster.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::cloud::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrataLabel {
    Trunk,
    Crown,
}

/// A horizontal cluster of filtered points.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub id: usize,
    /// Indices into the tile's filtered points
    pub members: Vec<usize>,
    /// Mean `(x, z)` of the members
    pub center: Vec2,
    /// `None` when the highest member is not above ground
    pub vertical_length_ratio: Option<f32>,
    /// Highest height above ground among the members
    pub max_height: f32,
}

impl Cluster {
    pub fn from_members(id: usize, members: Vec<usize>, points: &[Point]) -> Self {
        let mut center = Vec2::ZERO;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for &i in &members {
            let p = &points[i];
            center += Vec2::new(p.x, p.z);
            min_y = min_y.min(p.height_above_ground);
            max_y = max_y.max(p.height_above_ground);
        }
        if !members.is_empty() {
            center /= members.len() as f32;
        }
        Self {
            id,
            members,
            center,
            vertical_length_ratio: vertical_length_ratio(min_y, max_y),
            max_height: max_y,
        }
    }

    pub fn label(&self, cutoff: f32) -> StrataLabel {
        match self.vertical_length_ratio {
            Some(vlr) if vlr >= cutoff => StrataLabel::Trunk,
            _ => StrataLabel::Crown,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// `(max - min) / max`, undefined for `max <= 0`
pub fn vertical_length_ratio(min_y: f32, max_y: f32) -> Option<f32> {
    if !(max_y > 0.0) {
        return None;
    }
    Some((max_y - min_y) / max_y)
}

/// Outcome of classification and reassignment.
#[derive(Clone, Debug, Default)]
pub struct Stratified {
    /// Trunk clusters with their final membership
    pub trees: Vec<Cluster>,
    pub crown_clusters: usize,
    /// Clusters whose ratio was undefined
    pub degenerate: Vec<usize>,
    /// Crown points moved into a trunk cluster
    pub reassigned: usize,
    /// Crown points with no trunk cluster in reach
    pub orphaned: usize,
}

pub struct StrataClassifier {
    cutoff: f32,
    radius: Option<f32>,
}

impl StrataClassifier {
    pub fn new(cutoff: f32, radius: Option<f32>) -> Self {
        Self { cutoff, radius }
    }

    /// Label clusters and fold crown points into the nearest trunk cluster.
    ///
    /// Distances use the trunk centres from before any reassignment; the
    /// returned trees have centres and ratios recomputed from the final members.
    pub fn classify(&self, clusters: Vec<Cluster>, points: &[Point]) -> Stratified {
        let mut result = Stratified::default();
        let mut trunks: Vec<Cluster> = Vec::new();
        let mut crowns: Vec<Cluster> = Vec::new();

        for cluster in clusters {
            if cluster.vertical_length_ratio.is_none() {
                result.degenerate.push(cluster.id);
            }
            match cluster.label(self.cutoff) {
                StrataLabel::Trunk => trunks.push(cluster),
                StrataLabel::Crown => crowns.push(cluster),
            }
        }
        result.crown_clusters = crowns.len();

        let orphan_all = trunks.is_empty();
        let centers: Vec<Vec2> = trunks.iter().map(|t| t.center).collect();
        let mut extra: Vec<Vec<usize>> = vec![Vec::new(); trunks.len()];

        for crown in &crowns {
            for &i in &crown.members {
                if orphan_all {
                    result.orphaned += 1;
                    continue;
                }
                let position = Vec2::new(points[i].x, points[i].z);
                let nearest = centers
                    .iter()
                    .enumerate()
                    .map(|(t, c)| (t, c.distance(position)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                match nearest {
                    Some((t, d)) if self.radius.is_none_or(|r| d <= r) => {
                        extra[t].push(i);
                        result.reassigned += 1;
                    }
                    _ => result.orphaned += 1,
                }
            }
        }

        result.trees = trunks
            .into_iter()
            .zip(extra)
            .map(|(trunk, extra)| {
                if extra.is_empty() {
                    return trunk;
                }
                let mut members = trunk.members;
                members.extend(extra);
                members.sort_unstable();
                Cluster::from_members(trunk.id, members, points)
            })
            .collect();

        log::debug!(
            "Strata: {} trunk, {} crown clusters, {} points reassigned, {} orphaned",
            result.trees.len(),
            result.crown_clusters,
            result.reassigned,
            result.orphaned
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, z: f32, hag: f32) -> Point {
        Point {
            x,
            z,
            height_above_ground: hag,
            absolute_height: hag,
            color: None,
        }
    }

    /// 50 points around (10.5, 10.5) spanning 3..=15 plus a 6 point crown
    /// fragment near (14, 10.5) spanning 13..=15.
    fn scenario() -> (Vec<Point>, Vec<Cluster>) {
        let mut points = Vec::new();
        for h in 3..=15 {
            points.push(point(10.5, 10.5, h as f32));
        }
        let others = [(9, 9), (9, 10), (9, 11), (10, 9), (10, 11), (11, 9), (11, 10), (11, 11)];
        for (i, &(x, z)) in others.iter().enumerate() {
            let heights = if i < 5 { 8..=12 } else { 9..=12 };
            for h in heights {
                points.push(point(x as f32 + 0.5, z as f32 + 0.5, h as f32));
            }
        }
        assert_eq!(points.len(), 50);
        let crown = [
            (13.5, 9.5, 13.0),
            (13.5, 10.5, 14.0),
            (13.5, 11.5, 15.0),
            (14.5, 9.5, 15.0),
            (14.5, 10.5, 14.0),
            (14.5, 11.5, 13.0),
        ];
        for (x, z, h) in crown {
            points.push(point(x, z, h));
        }
        let clusters = vec![
            Cluster::from_members(0, (0..50).collect(), &points),
            Cluster::from_members(1, (50..56).collect(), &points),
        ];
        (points, clusters)
    }

    #[test]
    fn test_vlr_bounds() {
        assert_eq!(vertical_length_ratio(3.0, 15.0), Some(0.8));
        assert_eq!(vertical_length_ratio(5.0, 5.0), Some(0.0));
        assert_eq!(vertical_length_ratio(0.0, 0.0), None);
        assert_eq!(vertical_length_ratio(-3.0, -1.0), None);
        for (min, max) in [(0.1, 0.2), (2.5, 40.0), (0.0, 1.0)] {
            let vlr = vertical_length_ratio(min, max).unwrap();
            assert!((0.0..=1.0).contains(&vlr));
        }
    }

    #[test]
    fn test_labels() {
        let (_, clusters) = scenario();
        assert_eq!(clusters[0].label(0.62), StrataLabel::Trunk);
        assert_eq!(clusters[1].label(0.62), StrataLabel::Crown);
        assert_eq!(clusters[0].max_height, 15.0);
    }

    #[test]
    fn test_crown_fragment_reassigned() {
        let (points, clusters) = scenario();
        let result = StrataClassifier::new(0.62, None).classify(clusters, &points);

        assert_eq!(result.trees.len(), 1);
        assert_eq!(result.crown_clusters, 1);
        assert_eq!(result.reassigned, 6);
        assert_eq!(result.orphaned, 0);

        let tree = &result.trees[0];
        assert_eq!(tree.len(), 56);
        assert_eq!(tree.center.x.floor() as i32, 10);
        assert_eq!(tree.center.y.floor() as i32, 10);
        assert!(tree.members.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_nearest_trunk_wins() {
        let points = vec![
            point(0.0, 0.0, 3.0),
            point(0.0, 0.0, 12.0),
            point(20.0, 0.0, 3.0),
            point(20.0, 0.0, 12.0),
            point(14.0, 0.0, 11.0),
            point(6.0, 0.0, 11.0),
        ];
        let clusters = vec![
            Cluster::from_members(0, vec![0, 1], &points),
            Cluster::from_members(1, vec![2, 3], &points),
            Cluster::from_members(2, vec![4, 5], &points),
        ];
        let result = StrataClassifier::new(0.62, None).classify(clusters, &points);
        assert_eq!(result.trees.len(), 2);
        assert_eq!(result.trees[0].members, vec![0, 1, 5]);
        assert_eq!(result.trees[1].members, vec![2, 3, 4]);
    }

    #[test]
    fn test_reassignment_conserves_points() {
        let (points, clusters) = scenario();
        let before: usize = clusters.iter().map(Cluster::len).sum();
        let result = StrataClassifier::new(0.62, None).classify(clusters, &points);
        let after: usize = result.trees.iter().map(Cluster::len).sum();
        assert_eq!(before, after);
    }

    #[test]
    fn test_radius_orphans_far_points() {
        let (points, clusters) = scenario();
        let result = StrataClassifier::new(0.62, Some(3.5)).classify(clusters, &points);
        // Fragment columns at x = 13.5 are within 3.5 of the centre, x = 14.5 are not
        assert_eq!(result.reassigned, 3);
        assert_eq!(result.orphaned, 3);
        assert_eq!(result.trees[0].len(), 53);
    }

    #[test]
    fn test_no_trunk_orphans_everything() {
        let (points, clusters) = scenario();
        let crown_only = vec![clusters[1].clone()];
        let result = StrataClassifier::new(0.62, None).classify(crown_only, &points);
        assert!(result.trees.is_empty());
        assert_eq!(result.orphaned, 6);
    }

    #[test]
    fn test_degenerate_cluster_is_crown() {
        let points = vec![point(0.0, 0.0, 0.0), point(1.0, 0.0, -1.0)];
        let cluster = Cluster::from_members(3, vec![0, 1], &points);
        assert_eq!(cluster.vertical_length_ratio, None);
        let result = StrataClassifier::new(0.62, None).classify(vec![cluster], &points);
        assert_eq!(result.degenerate, vec![3]);
        assert_eq!(result.crown_clusters, 1);
    }
}
