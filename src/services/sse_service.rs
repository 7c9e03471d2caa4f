use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::state::{GestureChange, SharedState};

use super::sse_events;

/// Subscribe to the shared gesture event stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<GestureChange> {
    state.feeds().hub().subscribe()
}

/// Current gesture of every feed, used to prime a new subscriber.
pub fn snapshot(state: &SharedState) -> Vec<GestureChange> {
    state
        .feeds()
        .iter()
        .map(|feed| GestureChange {
            player: feed.player(),
            gesture: feed.current_gesture(),
        })
        .collect()
}

/// Convert a broadcast receiver into an SSE response.
///
/// The snapshot goes out first so a fresh client immediately knows every
/// feed's gesture. A client that cannot keep up has the oldest events
/// dropped by the broadcast channel and the stream carries on; the producer
/// is never blocked.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<GestureChange>,
    snapshot: Vec<GestureChange>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        for change in snapshot {
            let Some(event) = sse_events::gesture_event(change) else {
                continue;
            };
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(change) => {
                            let Some(event) = sse_events::gesture_event(change) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Skip lagged messages but keep the stream alive.
                            tracing::debug!(skipped, "gesture stream lagged");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("gesture SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
