use serde::Serialize;
use utoipa::ToSchema;

use crate::state::GestureChange;
use crate::vision::Gesture;

/// Wire form of a gesture change pushed over the SSE stream.
#[derive(Debug, Serialize, ToSchema)]
pub struct GestureEvent {
    /// Player whose feed changed.
    pub player: u32,
    /// Newly classified gesture.
    pub gesture: Gesture,
}

impl From<GestureChange> for GestureEvent {
    fn from(change: GestureChange) -> Self {
        Self {
            player: change.player,
            gesture: change.gesture,
        }
    }
}
