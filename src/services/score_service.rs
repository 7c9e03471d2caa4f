use crate::dao::ScoreEntry;
use crate::dto::scores::SaveScoreRequest;
use crate::error::ServiceError;
use crate::state::SharedState;

/// Record a finished game's score on the leaderboard.
pub async fn record(state: &SharedState, request: SaveScoreRequest) -> Result<(), ServiceError> {
    let entry = ScoreEntry::now(request.player, request.score, request.song);
    state.leaderboard().record(entry).await?;
    Ok(())
}

/// The leaderboard, best score first.
pub async fn top(state: &SharedState) -> Vec<ScoreEntry> {
    state.leaderboard().top().await
}
