//! Persistence layer: JSON-file stores for charts and scores.

/// Shared JSON-file load and atomic-replace helpers.
pub mod json_file;
/// Leaderboard store.
pub mod leaderboard;
/// Gesture chart store.
pub mod patterns;

pub use self::json_file::{StoreError, StoreResult};
pub use self::leaderboard::{LEADERBOARD_CAPACITY, LeaderboardStore, ScoreEntry};
pub use self::patterns::{PatternMap, PatternStore};
