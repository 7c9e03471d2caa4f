use crate::{
    dto::health::{FeedHealth, HealthResponse},
    state::SharedState,
};

/// Report liveness of every capture feed.
///
/// The service is "ok" only when every configured feed has a running
/// capture worker; otherwise it is "degraded" so an operator can see at a
/// glance which camera went away.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let mut feeds = Vec::new();
    let mut all_live = true;

    for feed in state.feeds().iter() {
        let live = feed.is_live().await;
        all_live &= live;
        feeds.push(FeedHealth {
            player: feed.player(),
            live,
            gesture: feed.current_gesture(),
        });
    }

    let status = if all_live { "ok" } else { "degraded" };
    HealthResponse {
        status: status.to_owned(),
        feeds,
    }
}
