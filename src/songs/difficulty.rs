use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Difficulty tier of a song, graded from its tempo and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Difficulty {
    /// Slow or short songs.
    Easy,
    /// The default middle ground.
    Medium,
    /// Fast or long songs.
    Hard,
    /// Fast and long songs.
    Expert,
}

impl Difficulty {
    /// Beat-density multiplier applied when generating a chart.
    pub fn multiplier(self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.2,
            Difficulty::Hard => 1.5,
            Difficulty::Expert => 2.0,
        }
    }
}

/// Grade a song from its tempo and duration.
///
/// The score is `bpm / 100 + duration / 300`, so 100 BPM contributes a full
/// point and five minutes contributes another. Tier boundaries are
/// half-open: a score of exactly 1.5 is already Medium.
pub fn classify(bpm: f32, duration: f32) -> Difficulty {
    let score = bpm / 100.0 + duration / 300.0;
    if score < 1.5 {
        Difficulty::Easy
    } else if score < 2.0 {
        Difficulty::Medium
    } else if score < 2.5 {
        Difficulty::Hard
    } else {
        Difficulty::Expert
    }
}
