use serde::Serialize;
use utoipa::ToSchema;

use crate::vision::Gesture;

/// Health summary returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when every feed is live, `"degraded"` otherwise.
    pub status: String,
    /// Per-feed liveness details.
    pub feeds: Vec<FeedHealth>,
}

/// Liveness of one player feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedHealth {
    /// Player the feed belongs to.
    pub player: u32,
    /// Whether a capture worker is running.
    pub live: bool,
    /// Most recently classified gesture.
    pub gesture: Gesture,
}
