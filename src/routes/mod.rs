use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;

pub mod debug;
pub mod docs;
pub mod gesture;
pub mod health;
pub mod scores;
pub mod songs;
pub mod sse;
pub mod video;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let media_dir = state.config().songs.media_dir.clone();

    let api_router = health::router()
        .merge(video::router())
        .merge(gesture::router())
        .merge(songs::router())
        .merge(scores::router())
        .merge(sse::router())
        .merge(debug::router());

    let docs_router = docs::router(state.clone());

    api_router
        .merge(docs_router)
        .nest_service("/songs", ServeDir::new(media_dir))
        .with_state(state)
}
