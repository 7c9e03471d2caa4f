use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/gestures",
    responses((status = 200, description = "Gesture change stream", content_type = "text/event-stream", body = String))
)]
/// Stream gesture changes for every feed to connected frontends.
pub async fn gesture_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    let snapshot = sse_service::snapshot(&state);
    info!("new gesture SSE connection");
    sse_service::to_sse_stream(receiver, snapshot)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/gestures", get(gesture_stream))
}
