//! Per-play geometry: segmentation, zones, and formation features

pub mod cluster;
pub mod formation;
pub mod hull;
pub mod motion;
pub mod segment;
pub mod zones;

// Re-export commonly used types
pub use cluster::{ordered_clusters, relabel_by_centroid, ClusterSummary};
pub use formation::{extract_formation, FormationFeatures};
pub use hull::{convex_hull, ConvexHull};
pub use motion::{motion_delta, path_length_to_snap, MotionDelta};
pub use segment::{
    anchor_key_frames, key_event_frames, locate_first_down_marker, locate_line_of_scrimmage,
    restrict_to_post_line_set, AlignedRow, FormationSnapshot, KeyFrames, ParsedPlay,
};
pub use zones::{Zone, ZoneGrid};
