use serde::Serialize;
use utoipa::ToSchema;

use crate::vision::Gesture;

/// Current gesture of one player feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct GestureResponse {
    /// Most recently classified gesture.
    pub gesture: Gesture,
}

/// Acknowledgement of a feed restart.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestartResponse {
    /// Whether the feed was restarted.
    pub restarted: bool,
    /// Player whose feed was restarted.
    pub player: u32,
}
