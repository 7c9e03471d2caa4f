use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

/// A finished game's score submission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SaveScoreRequest {
    /// Player name.
    #[validate(length(min = 1, message = "Player name must not be empty"))]
    pub player: String,
    /// Final score.
    pub score: i64,
    /// Song the score was achieved on.
    #[validate(length(min = 1, message = "Song name must not be empty"))]
    pub song: String,
}

/// Acknowledgement of a stored score.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveScoreResponse {
    /// Whether the score was recorded.
    pub success: bool,
}
