use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::ScoreEntry,
    dto::scores::{SaveScoreRequest, SaveScoreResponse},
    error::AppError,
    services::score_service,
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/save_score",
    request_body = SaveScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = SaveScoreResponse),
        (status = 400, description = "Missing player or song name")
    )
)]
/// Record a finished game's score on the leaderboard.
pub async fn save_score(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SaveScoreRequest>>,
) -> Result<Json<SaveScoreResponse>, AppError> {
    score_service::record(&state, payload).await?;
    Ok(Json(SaveScoreResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/get_leaderboard",
    responses((status = 200, description = "Top scores, best first", body = [ScoreEntry]))
)]
/// Return the current leaderboard.
pub async fn get_leaderboard(State(state): State<SharedState>) -> Json<Vec<ScoreEntry>> {
    let entries = score_service::top(&state).await;
    Json(entries)
}

/// Configure the score routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/save_score", post(save_score))
        .route("/get_leaderboard", get(get_leaderboard))
}
