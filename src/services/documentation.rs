use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Wavebeat Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::video::video_feed,
        crate::routes::gesture::get_gesture,
        crate::routes::gesture::restart_webcam,
        crate::routes::sse::gesture_stream,
        crate::routes::songs::search_song,
        crate::routes::songs::select_song,
        crate::routes::scores::save_score,
        crate::routes::scores::get_leaderboard,
        crate::routes::debug::debug_info,
        crate::routes::debug::debug_patterns,
        crate::routes::debug::debug_pattern,
        crate::routes::debug::client_log,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::FeedHealth,
            crate::dto::gesture::GestureResponse,
            crate::dto::gesture::RestartResponse,
            crate::vision::Gesture,
            crate::dto::songs::SearchRequest,
            crate::dto::songs::SearchResponse,
            crate::dto::songs::CandidateDto,
            crate::dto::songs::SelectSongRequest,
            crate::dto::songs::SongAssetDto,
            crate::songs::Difficulty,
            crate::dto::scores::SaveScoreRequest,
            crate::dto::scores::SaveScoreResponse,
            crate::dao::ScoreEntry,
            crate::dto::sse::GestureEvent,
            crate::dto::debug::DebugInfo,
            crate::dto::debug::PatternSummary,
            crate::dto::debug::PatternSummariesResponse,
            crate::dto::debug::PatternDetail,
            crate::dto::debug::ClientLogRequest,
            crate::dto::debug::ClientLogLevel,
        )
    ),
    tags(
        (name = "capture", description = "Webcam capture and gesture recognition"),
        (name = "songs", description = "Song search, download and chart generation"),
        (name = "scores", description = "Leaderboard storage"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "health", description = "Health check endpoints"),
        (name = "debug", description = "Introspection endpoints for development"),
    )
)]
pub struct ApiDoc;
