//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE framing for Fridgenator services. Every message is written as
//! `data: <json>` followed by a blank line.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Turn the receiving half of a single-producer channel into an SSE response
///
/// Each value is serialized to JSON and yielded as soon as it is received, so
/// the client sees events as the producer emits them. The stream ends when
/// every sender has been dropped. Keep-alive comments are sent when the
/// producer stays quiet for `keep_alive`.
///
/// # Example
/// ```rust,ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(32);
/// tokio::spawn(async move { produce(tx).await });
/// fridge_common::sse::channel_sse_stream(rx, Duration::from_secs(15))
/// ```
pub fn channel_sse_stream<T>(
    mut rx: mpsc::Receiver<T>,
    keep_alive: Duration,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Send + 'static,
{
    let stream = async_stream::stream! {
        debug!("SSE: channel stream started");

        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => yield Ok(Event::default().data(json)),
                Err(e) => warn!("SSE: Failed to serialize event: {}", e),
            }
        }

        debug!("SSE: producer finished, closing stream");
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(keep_alive).text("heartbeat"))
}
