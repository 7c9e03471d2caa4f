use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::info;

use crate::{
    dto::gesture::{GestureResponse, RestartResponse},
    error::AppError,
    services::gesture_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/get_gesture/{player}",
    tag = "capture",
    params(("player" = u32, Path, description = "Player number of the feed")),
    responses(
        (status = 200, description = "Most recent gesture for the player", body = GestureResponse),
        (status = 404, description = "No feed configured for this player")
    )
)]
/// Return the most recently classified gesture for one player.
pub async fn get_gesture(
    State(state): State<SharedState>,
    Path(player): Path<u32>,
) -> Result<Json<GestureResponse>, AppError> {
    let gesture = gesture_service::current_gesture(&state, player)?;
    Ok(Json(GestureResponse { gesture }))
}

#[utoipa::path(
    post,
    path = "/restart_webcam/{player}",
    tag = "capture",
    params(("player" = u32, Path, description = "Player number of the feed")),
    responses(
        (status = 200, description = "Feed was restarted", body = RestartResponse),
        (status = 404, description = "No feed configured for this player"),
        (status = 503, description = "Camera could not be reopened")
    )
)]
/// Tear down and respawn the capture worker for one player.
pub async fn restart_webcam(
    State(state): State<SharedState>,
    Path(player): Path<u32>,
) -> Result<Json<RestartResponse>, AppError> {
    info!(player, "webcam restart requested");
    gesture_service::restart_feed(&state, player).await?;
    Ok(Json(RestartResponse {
        restarted: true,
        player,
    }))
}

/// Configure the gesture routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/get_gesture/{player}", get(get_gesture))
        .route("/restart_webcam/{player}", post(restart_webcam))
}
