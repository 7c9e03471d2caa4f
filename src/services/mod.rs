/// Introspection helpers for the debug endpoints.
pub mod debug_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Gesture lookups, MJPEG streaming and feed restarts.
pub mod gesture_service;
/// Health check service.
pub mod health_service;
/// Leaderboard reads and writes.
pub mod score_service;
/// Song search, acquisition and chart persistence.
pub mod song_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
