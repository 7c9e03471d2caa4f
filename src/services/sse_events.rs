use axum::response::sse::Event;
use tracing::warn;

use crate::dto::sse::GestureEvent;
use crate::state::GestureChange;

/// Event name gesture changes are published under.
pub const EVENT_GESTURE: &str = "gesture";

/// Build the wire event for a gesture change.
///
/// A payload that fails to serialize is logged and dropped; one bad event
/// must not tear down the stream.
pub fn gesture_event(change: GestureChange) -> Option<Event> {
    match serde_json::to_string(&GestureEvent::from(change)) {
        Ok(data) => Some(Event::default().event(EVENT_GESTURE).data(data)),
        Err(err) => {
            warn!(error = %err, "failed to serialize gesture event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::Gesture;

    #[test]
    fn gesture_change_serializes_to_snake_case_payload() {
        let change = GestureChange {
            player: 2,
            gesture: Gesture::OpenHand,
        };
        assert!(gesture_event(change).is_some());

        let json = serde_json::to_string(&GestureEvent::from(change)).unwrap();
        assert_eq!(json, r#"{"player":2,"gesture":"open_hand"}"#);
    }
}
