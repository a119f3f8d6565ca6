//! Tree reconstruction from classified vegetation points
//!
//! [`TilePipeline`] runs the per-tile stages: ground normalization, outlier
//! filtering, horizontal clustering, trunk/crown classification, and the leaf,
//! trunk and branch writers. [`ShrubPlacer`] handles low vegetation separately.

pub mod config;
pub mod normalize;
pub mod strata;
pub mod leaves;
pub mod trunk;
pub mod branch;
pub mod shrubs;
pub mod pipeline;

pub use branch::{best_attachment_height, BranchBuilder, BranchSegment, SubCluster};
pub use config::TreeConfig;
pub use leaves::LeafPlacer;
pub use normalize::{GroundNormalizer, Normalized, OutlierFilter};
pub use pipeline::{TileCondition, TilePipeline, TileReport, TileStage};
pub use shrubs::{ShrubConfig, ShrubPlacer, ShrubReport};
pub use strata::{vertical_length_ratio, Cluster, StrataClassifier, StrataLabel, Stratified};
pub use trunk::{TrunkPlacement, TrunkPlacer};
