use async_stream::stream;
use bytes::{BufMut, Bytes, BytesMut};
use futures::Stream;
use tokio::sync::watch;

use crate::error::ServiceError;
use crate::state::SharedState;
use crate::vision::Gesture;

/// Boundary string separating MJPEG parts.
pub const MJPEG_BOUNDARY: &str = "frame";

/// Current classified gesture of a player feed.
pub fn current_gesture(state: &SharedState, player: u32) -> Result<Gesture, ServiceError> {
    Ok(state.feeds().feed(player)?.current_gesture())
}

/// Restart a player's capture feed, reopening its camera.
pub async fn restart_feed(state: &SharedState, player: u32) -> Result<(), ServiceError> {
    state.feeds().restart(player).await
}

/// Subscribe to a feed's encoded frames.
pub fn subscribe_frames(
    state: &SharedState,
    player: u32,
) -> Result<watch::Receiver<Option<Bytes>>, ServiceError> {
    Ok(state.feeds().feed(player)?.frames())
}

/// Convert a frame subscription into an MJPEG part stream.
///
/// Latest frame wins: a slow consumer observes fewer, fresher frames rather
/// than a growing backlog. The stream follows the feed through restarts and
/// only ends when the feed itself is torn down.
pub fn frame_stream(
    mut frames: watch::Receiver<Option<Bytes>>,
) -> impl Stream<Item = Bytes> + Send {
    stream! {
        loop {
            let jpeg = frames.borrow_and_update().clone();
            if let Some(jpeg) = jpeg {
                yield mjpeg_part(&jpeg);
            }
            if frames.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Wrap one JPEG into a multipart part with the shared boundary.
fn mjpeg_part(jpeg: &Bytes) -> Bytes {
    let header = format!("--{MJPEG_BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n");
    let mut part = BytesMut::with_capacity(header.len() + jpeg.len() + 2);
    part.put(header.as_bytes());
    part.put(jpeg.clone());
    part.put(&b"\r\n"[..]);
    part.freeze()
}
