//! Per-tile tree reconstruction
//!
//! Stages run in a fixed order and each one may end the tile early:
//!
//! ```text
//! Raw -> Normalized -> Filtered -> Clustered -> Stratified
//!     -> LeavesPlaced -> TrunksPlaced -> BranchesPlaced
//! ```
//!
//! Anything short of a store error is recorded in the [`TileReport`] instead
//! of failing the tile.

use serde::{Deserialize, Serialize};

use crate::cloud::{Point, Tile};
use crate::cluster::Clusterer;
use crate::core::Result;
use crate::ground::TileGround;
use crate::voxel::{ChunkCoord, VoxelStore};
use super::branch::BranchBuilder;
use super::config::TreeConfig;
use super::leaves::LeafPlacer;
use super::normalize::{GroundNormalizer, OutlierFilter};
use super::strata::{Cluster, StrataClassifier};
use super::trunk::{TrunkPlacement, TrunkPlacer};

/// Last stage a tile reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStage {
    Raw,
    Normalized,
    Filtered,
    Clustered,
    Stratified,
    LeavesPlaced,
    TrunksPlaced,
    BranchesPlaced,
}

/// Non-fatal conditions met while processing a tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileCondition {
    /// Nothing left after filtering
    EmptyInput,
    /// No column of the tile has a ground height
    UnresolvedGround,
    /// Horizontal clustering was not possible, only leaves are placed
    ClusteringInfeasible { reason: String },
    /// Cluster whose highest point is not above ground
    DegenerateCluster { cluster: usize },
    /// Trunk column without a leaf voxel to take its height from
    MissingHeightEvidence { cluster: usize },
    /// Branch longer than the configured maximum
    OversizedBranch { cluster: usize, length: usize },
}

/// Summary of one processed tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileReport {
    pub coord: ChunkCoord,
    pub stage: TileStage,
    pub input_points: usize,
    pub unresolved_points: usize,
    pub filtered_points: usize,
    pub clusters: usize,
    pub noise_points: usize,
    pub trunk_clusters: usize,
    pub crown_clusters: usize,
    pub reassigned_points: usize,
    pub orphaned_points: usize,
    pub leaves_placed: usize,
    pub trunks: Vec<TrunkPlacement>,
    pub branch_segments: usize,
    pub branch_voxels: usize,
    pub conditions: Vec<TileCondition>,
}

impl TileReport {
    pub fn new(coord: ChunkCoord, input_points: usize) -> Self {
        Self {
            coord,
            stage: TileStage::Raw,
            input_points,
            unresolved_points: 0,
            filtered_points: 0,
            clusters: 0,
            noise_points: 0,
            trunk_clusters: 0,
            crown_clusters: 0,
            reassigned_points: 0,
            orphaned_points: 0,
            leaves_placed: 0,
            trunks: Vec::new(),
            branch_segments: 0,
            branch_voxels: 0,
            conditions: Vec::new(),
        }
    }

    pub fn has_condition(&self, matches: impl Fn(&TileCondition) -> bool) -> bool {
        self.conditions.iter().any(matches)
    }
}

/// Runs every stage on one tile against a voxel store.
pub struct TilePipeline {
    config: TreeConfig,
    clusterer: Box<dyn Clusterer>,
    filter: OutlierFilter,
    strata: StrataClassifier,
    branches: BranchBuilder,
}

impl TilePipeline {
    pub fn new(config: TreeConfig) -> Self {
        let clusterer = config.horizontal.build();
        let filter = OutlierFilter::new(config.min_height_above_ground);
        let strata = StrataClassifier::new(config.vlr_cutoff, config.reassignment_radius);
        let branches = BranchBuilder::new(
            config.branch.clone(),
            config.attachment_window,
            config.max_branch_length,
        );
        Self {
            config,
            clusterer,
            filter,
            strata,
            branches,
        }
    }

    /// Process one tile. `ground` must be captured before any of the tile's
    /// voxels are written.
    pub fn run(&self, tile: &Tile, ground: &TileGround, store: &mut impl VoxelStore) -> Result<TileReport> {
        let mut report = TileReport::new(tile.coord, tile.points.len());

        if ground.resolved_count() == 0 {
            log::warn!("Tile {:?}: no ground height in any column, skipped", tile.coord);
            report.conditions.push(TileCondition::UnresolvedGround);
            return Ok(report);
        }
        let normalized = GroundNormalizer::normalize(&tile.points, ground);
        report.unresolved_points = normalized.unresolved;
        report.stage = TileStage::Normalized;

        let points = self.filter.filter(normalized.points);
        report.filtered_points = points.len();
        report.stage = TileStage::Filtered;
        log::debug!(
            "Tile {:?}: {} points, {} above {} m",
            tile.coord,
            report.input_points,
            points.len(),
            self.config.min_height_above_ground
        );
        if points.is_empty() {
            report.conditions.push(TileCondition::EmptyInput);
            return Ok(report);
        }

        let clusters = match self.cluster(&points, &mut report) {
            Some(clusters) => clusters,
            None => {
                report.leaves_placed = LeafPlacer::place(&points, ground, store)?;
                report.stage = TileStage::LeavesPlaced;
                return Ok(report);
            }
        };

        let stratified = self.strata.classify(clusters, &points);
        report.trunk_clusters = stratified.trees.len();
        report.crown_clusters = stratified.crown_clusters;
        report.reassigned_points = stratified.reassigned;
        report.orphaned_points = stratified.orphaned;
        report.conditions.extend(
            stratified
                .degenerate
                .iter()
                .map(|&cluster| TileCondition::DegenerateCluster { cluster }),
        );
        report.stage = TileStage::Stratified;

        report.leaves_placed = LeafPlacer::place(&points, ground, store)?;
        report.stage = TileStage::LeavesPlaced;
        if stratified.trees.is_empty() {
            return Ok(report);
        }

        let mut placed = Vec::new();
        for tree in &stratified.trees {
            match TrunkPlacer::place(tree, ground, store)? {
                Some(trunk) => placed.push((tree, trunk)),
                None => report
                    .conditions
                    .push(TileCondition::MissingHeightEvidence { cluster: tree.id }),
            }
        }
        report.trunks = placed.iter().map(|(_, trunk)| trunk.clone()).collect();
        report.stage = TileStage::TrunksPlaced;

        for (tree, trunk) in &placed {
            let outcome = self.branches.build(tree, trunk, &points, store)?;
            report.branch_segments += outcome.segments_written;
            report.branch_voxels += outcome.voxels_written;
            report.conditions.extend(
                outcome
                    .oversized
                    .into_iter()
                    .map(|length| TileCondition::OversizedBranch {
                        cluster: tree.id,
                        length,
                    }),
            );
        }
        report.stage = TileStage::BranchesPlaced;

        log::debug!(
            "Tile {:?}: {} trees, {} leaves, {} branch voxels",
            tile.coord,
            report.trunks.len(),
            report.leaves_placed,
            report.branch_voxels
        );
        Ok(report)
    }

    /// Horizontal clustering into candidate trees, `None` when infeasible
    fn cluster(&self, points: &[Point], report: &mut TileReport) -> Option<Vec<Cluster>> {
        let projected: Vec<_> = points.iter().map(Point::horizontal).collect();
        let clustering = match self.clusterer.cluster(&projected) {
            Ok(clustering) => clustering,
            Err(infeasible) => {
                log::debug!("Tile {:?}: {}", report.coord, infeasible);
                report.conditions.push(TileCondition::ClusteringInfeasible {
                    reason: infeasible.reason,
                });
                return None;
            }
        };
        report.noise_points = clustering.noise_count();
        report.clusters = clustering.groups.len();
        report.stage = TileStage::Clustered;

        Some(
            clustering
                .groups
                .into_iter()
                .enumerate()
                .map(|(id, group)| Cluster::from_members(id, group.members, points))
                .collect(),
        )
    }
}
