//! Data loading, normalization, and play indexing modules

pub mod index;
pub mod loader;
pub mod normalize;
pub mod plays;

// Re-export commonly used types
pub use index::{PlayData, PlayIndex};
pub use loader::RawTables;
pub use normalize::{normalize_tracking, validate_play_direction, FIELD_LENGTH, FIELD_WIDTH};
