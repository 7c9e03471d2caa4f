use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::debug::{ClientLogRequest, DebugInfo, PatternDetail, PatternSummariesResponse},
    error::AppError,
    services::debug_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/debug/info",
    responses((status = 200, description = "Server internals snapshot", body = DebugInfo))
)]
/// Dump server internals for the debug overlay.
pub async fn debug_info(State(state): State<SharedState>) -> Json<DebugInfo> {
    Json(debug_service::info(&state).await)
}

#[utoipa::path(
    get,
    path = "/debug/patterns",
    responses((status = 200, description = "Summaries of every stored chart", body = PatternSummariesResponse))
)]
/// Summarize every stored chart.
pub async fn debug_patterns(State(state): State<SharedState>) -> Json<PatternSummariesResponse> {
    Json(debug_service::pattern_summaries(&state).await)
}

#[utoipa::path(
    get,
    path = "/debug/pattern/{song}",
    params(("song" = String, Path, description = "Song key of the chart")),
    responses(
        (status = 200, description = "Full chart for the song", body = PatternDetail),
        (status = 404, description = "No chart stored for the song")
    )
)]
/// Return the full chart for one song.
pub async fn debug_pattern(
    State(state): State<SharedState>,
    Path(song): Path<String>,
) -> Result<Json<PatternDetail>, AppError> {
    let detail = debug_service::pattern_detail(&state, &song).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/debug/log",
    request_body = ClientLogRequest,
    responses(
        (status = 204, description = "Log line recorded"),
        (status = 400, description = "Empty log message")
    )
)]
/// Write a frontend log line into the server log.
pub async fn client_log(Valid(Json(payload)): Valid<Json<ClientLogRequest>>) -> StatusCode {
    debug_service::client_log(&payload);
    StatusCode::NO_CONTENT
}

/// Configure the debug routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/debug/info", get(debug_info))
        .route("/debug/patterns", get(debug_patterns))
        .route("/debug/pattern/{song}", get(debug_pattern))
        .route("/debug/log", post(client_log))
}
