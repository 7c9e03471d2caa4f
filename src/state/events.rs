use tokio::sync::broadcast;

use crate::vision::Gesture;

/// A feed's classified gesture changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureChange {
    /// Player whose feed changed.
    pub player: u32,
    /// Newly classified gesture.
    pub gesture: Gesture,
}

/// Broadcast hub fanning gesture transitions out to SSE subscribers.
pub struct GestureHub {
    sender: broadcast::Sender<GestureChange>,
}

impl GestureHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<GestureChange> {
        self.sender.subscribe()
    }

    /// Sender handle for capture workers to publish through.
    pub fn sender(&self) -> broadcast::Sender<GestureChange> {
        self.sender.clone()
    }
}
