//! Branch skeletons from trunk to foliage sub-clusters
//!
//! A tree's points are split into 3-D sub-clusters. Each sub-cluster gets one
//! straight branch from the trunk to its centroid, attached at the trunk
//! height whose line best fits the sub-cluster's points.

use glam::{IVec3, Vec3};

use crate::cloud::Point;
use crate::cluster::{Clusterer, Dbscan, DbscanParams};
use crate::core::Result;
use crate::math::{bresenham_3d, summed_line_distance};
use crate::voxel::{Material, VoxelStore};
use super::strata::Cluster;
use super::trunk::TrunkPlacement;

/// Foliage points of one tree that share a branch.
#[derive(Clone, Debug)]
pub struct SubCluster {
    pub tree: usize,
    pub members: Vec<usize>,
    /// Mean of `(x, height_above_ground, z)` over the members
    pub centroid: Vec3,
}

/// A rasterised branch.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchSegment {
    pub attachment: IVec3,
    pub centroid: IVec3,
    pub cells: Vec<IVec3>,
}

/// Branch stage result for one tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchOutcome {
    pub sub_clusters: usize,
    pub segments_written: usize,
    pub voxels_written: usize,
    /// Cell counts of discarded branches
    pub oversized: Vec<usize>,
}

/// Attachment height, within `window` of the centroid's rounded height, that
/// minimises the summed distance of `points` to the line from the trunk to
/// `centroid`. Ties go to the lower height.
///
/// `trunk` is the horizontal trunk position as `(x, z)`.
pub fn best_attachment_height(points: &[Vec3], trunk: (f32, f32), centroid: Vec3, window: i32) -> Option<i32> {
    let middle = centroid.y.round() as i32;
    let mut best: Option<(i32, f32)> = None;
    for h in (middle - window)..=(middle + window) {
        let anchor = Vec3::new(trunk.0, h as f32, trunk.1);
        let Some(cost) = summed_line_distance(points, anchor, centroid) else {
            continue;
        };
        if best.is_none_or(|(_, c)| cost < c) {
            best = Some((h, cost));
        }
    }
    best.map(|(h, _)| h)
}

pub struct BranchBuilder {
    clusterer: Dbscan,
    window: i32,
    max_length: usize,
}

impl BranchBuilder {
    pub fn new(params: DbscanParams, window: i32, max_length: usize) -> Self {
        Self {
            clusterer: Dbscan::new(params),
            window,
            max_length,
        }
    }

    /// Split a tree into sub-clusters, empty when the tree is too small
    pub fn sub_clusters(&self, tree: &Cluster, points: &[Point]) -> Vec<SubCluster> {
        if tree.len() <= self.clusterer.params().min_samples {
            return Vec::new();
        }
        let positions: Vec<Vec3> = tree.members.iter().map(|&i| points[i].position()).collect();
        let Ok(clustering) = self.clusterer.cluster(&positions) else {
            return Vec::new();
        };
        clustering
            .groups
            .into_iter()
            .map(|group| SubCluster {
                tree: tree.id,
                members: group.members.iter().map(|&m| tree.members[m]).collect(),
                centroid: group.center,
            })
            .collect()
    }

    /// Line from the trunk to the sub-cluster, or `None` when no attachment fits
    pub fn segment(&self, sub: &SubCluster, points: &[Point], tree: &Cluster, trunk: &TrunkPlacement) -> Option<BranchSegment> {
        let positions: Vec<Vec3> = sub.members.iter().map(|&i| points[i].position()).collect();
        let h = best_attachment_height(&positions, (tree.center.x, tree.center.y), sub.centroid, self.window)?;

        let base = trunk.base_height as f32;
        let attachment = IVec3::new(trunk.column.0, trunk.base_height + h, trunk.column.1);
        let centroid = IVec3::new(
            sub.centroid.x.floor() as i32,
            (base + sub.centroid.y).floor() as i32,
            sub.centroid.z.floor() as i32,
        );
        Some(BranchSegment {
            attachment,
            centroid,
            cells: bresenham_3d(attachment, centroid),
        })
    }

    /// Build and write every branch of a tree with a placed trunk.
    pub fn build(
        &self,
        tree: &Cluster,
        trunk: &TrunkPlacement,
        points: &[Point],
        store: &mut impl VoxelStore,
    ) -> Result<BranchOutcome> {
        let subs = self.sub_clusters(tree, points);
        let mut outcome = BranchOutcome {
            sub_clusters: subs.len(),
            ..Default::default()
        };

        for sub in &subs {
            let Some(segment) = self.segment(sub, points, tree, trunk) else {
                continue;
            };
            if segment.cells.len() > self.max_length {
                log::trace!(
                    "Cluster {}: branch of {} cells to {:?} discarded",
                    tree.id,
                    segment.cells.len(),
                    segment.centroid
                );
                outcome.oversized.push(segment.cells.len());
                continue;
            }
            let written = write_branch(&segment, store)?;
            outcome.segments_written += 1;
            outcome.voxels_written += written;
        }
        Ok(outcome)
    }
}

/// Write branch cells that sit under canopy and hold nothing but air or leaves.
fn write_branch(segment: &BranchSegment, store: &mut impl VoxelStore) -> Result<usize> {
    let mut written = 0;
    for cell in &segment.cells {
        if !store.contains_height(cell.y) {
            continue;
        }
        let current = store.material(cell.x, cell.y, cell.z)?;
        if !matches!(current, Material::Empty | Material::Leaves) {
            continue;
        }
        if !store.column(cell.x, cell.z)?.contains(Material::Leaves) {
            continue;
        }
        store.set_material(cell.x, cell.y, cell.z, Material::Branch)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{VoxelWorld, WorldBounds};
    use glam::Vec2;

    fn point(x: f32, z: f32, hag: f32) -> Point {
        Point {
            x,
            z,
            height_above_ground: hag,
            absolute_height: hag,
            color: None,
        }
    }

    #[test]
    fn test_symmetric_cluster_attaches_at_centroid_height() {
        let mut points: Vec<Vec3> = (2..=6).map(|dx| Vec3::new(dx as f32, 14.0, 0.0)).collect();
        points.push(Vec3::new(4.0, 13.0, 0.0));
        points.push(Vec3::new(4.0, 15.0, 0.0));
        let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        assert_eq!(centroid, Vec3::new(4.0, 14.0, 0.0));

        assert_eq!(best_attachment_height(&points, (0.0, 0.0), centroid, 2), Some(14));
    }

    #[test]
    fn test_ties_pick_lower_height() {
        // One point on the centroid: every candidate line passes through it
        let points = vec![Vec3::new(3.0, 10.0, 0.0)];
        let h = best_attachment_height(&points, (0.0, 0.0), Vec3::new(3.0, 10.0, 0.0), 2);
        assert_eq!(h, Some(8));
    }

    #[test]
    fn test_degenerate_candidate_skipped() {
        // Centroid on the trunk axis: only candidates off the centroid height count
        let points = vec![Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 10.0, 0.0)];
        let h = best_attachment_height(&points, (0.0, 0.0), Vec3::new(0.0, 10.0, 0.0), 0);
        assert_eq!(h, None);
        let h = best_attachment_height(&points, (0.0, 0.0), Vec3::new(0.0, 10.0, 0.0), 1);
        assert_eq!(h, Some(9));
    }

    #[test]
    fn test_small_tree_has_no_branches() {
        let points: Vec<Point> = (0..7).map(|i| point(i as f32 * 0.1, 0.0, 5.0)).collect();
        let tree = Cluster::from_members(0, (0..7).collect(), &points);
        let builder = BranchBuilder::new(DbscanParams::default(), 2, 7);
        assert!(builder.sub_clusters(&tree, &points).is_empty());
    }

    #[test]
    fn test_builds_branch_under_canopy() {
        // Trunk at column (0, 0); a foliage clump around (3.5, 10, 0.5)
        let mut points = Vec::new();
        for dx in 0..3 {
            for dy in 0..3 {
                points.push(point(3.0 + dx as f32 * 0.5, 9.0 + dy as f32, 0.5));
            }
        }
        let tree = Cluster {
            id: 0,
            members: (0..points.len()).collect(),
            center: Vec2::new(0.5, 0.5),
            vertical_length_ratio: Some(0.8),
            max_height: 11.0,
        };
        let trunk = TrunkPlacement {
            cluster: 0,
            column: (0, 0),
            base_height: 0,
            top_height: 11,
            voxels_written: 11,
        };

        let mut world = VoxelWorld::new(WorldBounds::new(0, 32));
        for p in &points {
            let (x, z) = p.column();
            world.set_material(x, p.height_above_ground as i32, z, Material::Leaves).unwrap();
        }
        for y in 0..=11 {
            world.set_material(0, y, 0, Material::Trunk).unwrap();
        }
        world.set_material(0, 12, 0, Material::Leaves).unwrap();

        let builder = BranchBuilder::new(DbscanParams::default(), 2, 7);
        let outcome = builder.build(&tree, &trunk, &points, &mut world).unwrap();
        assert_eq!(outcome.sub_clusters, 1);
        assert_eq!(outcome.segments_written, 1);
        assert!(outcome.oversized.is_empty());

        // Trunk untouched, branch cells only in columns with leaves
        for y in 0..=11 {
            assert_eq!(world.material(0, y, 0).unwrap(), Material::Trunk);
        }
        assert_eq!(world.material(3, 10, 0).unwrap(), Material::Branch);
        assert_eq!(world.material(1, 10, 0).unwrap(), Material::Empty);
        assert_eq!(outcome.voxels_written, 1);
    }

    #[test]
    fn test_long_branch_discarded() {
        let mut points = Vec::new();
        for i in 0..9 {
            points.push(point(20.0 + (i % 3) as f32 * 0.5, 10.0 + (i / 3) as f32 * 0.5, 0.5));
        }
        let tree = Cluster {
            id: 2,
            members: (0..points.len()).collect(),
            center: Vec2::new(0.5, 0.5),
            vertical_length_ratio: Some(0.8),
            max_height: 11.0,
        };
        let trunk = TrunkPlacement {
            cluster: 2,
            column: (0, 0),
            base_height: 0,
            top_height: 11,
            voxels_written: 11,
        };
        let mut world = VoxelWorld::new(WorldBounds::new(0, 32));
        let builder = BranchBuilder::new(DbscanParams::default(), 2, 7);
        let outcome = builder.build(&tree, &trunk, &points, &mut world).unwrap();
        assert_eq!(outcome.segments_written, 0);
        assert_eq!(outcome.oversized.len(), 1);
        assert!(outcome.oversized[0] > 7);
        assert_eq!(world.chunk_count(), 0);
    }
}
