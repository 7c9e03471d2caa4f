use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::songs::{SearchRequest, SearchResponse, SelectSongRequest, SongAssetDto},
    error::AppError,
    services::song_service,
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/search_song",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Candidate tracks for the query", body = SearchResponse),
        (status = 400, description = "Empty search query")
    )
)]
/// Search the track provider for candidate songs.
pub async fn search_song(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SearchRequest>>,
) -> Json<SearchResponse> {
    let results = song_service::search(&state, payload).await;
    Json(results)
}

#[utoipa::path(
    post,
    path = "/select_song",
    request_body = SelectSongRequest,
    responses(
        (status = 200, description = "Song downloaded, analyzed and charted", body = SongAssetDto),
        (status = 400, description = "Unusable song name or video id"),
        (status = 502, description = "Download or analysis failed")
    )
)]
/// Download and analyze the chosen track, generating its chart.
pub async fn select_song(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SelectSongRequest>>,
) -> Result<Json<SongAssetDto>, AppError> {
    let asset = song_service::select(&state, payload).await?;
    Ok(Json(asset))
}

/// Configure the song routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/search_song", post(search_song))
        .route("/select_song", post(select_song))
}
