use std::convert::Infallible;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
    routing::get,
};
use futures::StreamExt;
use tracing::info;

use crate::{error::AppError, services::gesture_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/video_feed/{player}",
    tag = "capture",
    params(("player" = u32, Path, description = "Player number of the feed")),
    responses(
        (status = 200, description = "MJPEG stream of the player's webcam", content_type = "multipart/x-mixed-replace"),
        (status = 404, description = "No feed configured for this player")
    )
)]
/// Stream the player's webcam as a multipart MJPEG response.
pub async fn video_feed(
    State(state): State<SharedState>,
    Path(player): Path<u32>,
) -> Result<Response, AppError> {
    let frames = gesture_service::subscribe_frames(&state, player)?;
    info!(player, "new MJPEG viewer");
    let stream = gesture_service::frame_stream(frames).map(Ok::<_, Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            "multipart/x-mixed-replace; boundary=frame",
        )
        .body(Body::from_stream(stream))
        .map_err(|err| AppError::Internal(format!("failed to build MJPEG response: {err}")))
}

/// Configure the video streaming routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/video_feed/{player}", get(video_feed))
}
