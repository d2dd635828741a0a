// 🟡 YELLOW Phase: Minimal WebSocket transport implementation
// Abstract transport seam plus the tokio-tungstenite binding

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::error::{RealtimeError, RealtimeResult};

/// Lifecycle events an open link delivers to the connection manager.
///
/// A successful `open` stands in for the "open" callback; everything after
/// that arrives through `next_event`. A `Failed` event is always followed
/// by `Closed`, mirroring how browser sockets report errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound text frame
    Frame(String),
    /// The link failed; a Closed event follows
    Failed(String),
    /// The link is gone, orderly or not
    Closed,
}

/// Factory for transport links, one per connect attempt
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, url: &str) -> RealtimeResult<Box<dyn TransportLink>>;
}

/// A single live connection to the backend
#[async_trait]
pub trait TransportLink: Send {
    /// Transmit one text frame
    async fn transmit(&mut self, frame: String) -> RealtimeResult<()>;

    /// Wait for the next lifecycle event. After `Closed` has been
    /// returned, every further call returns `Closed` again.
    async fn next_event(&mut self) -> TransportEvent;

    /// Request an orderly close; the link still emits `Closed` afterwards
    async fn close(&mut self);
}

/// WebSocket transport over tokio-tungstenite
pub struct WebSocketTransport {
    connect_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, url: &str) -> RealtimeResult<Box<dyn TransportLink>> {
        debug!("Connecting to WebSocket: {}", url);

        let attempt = connect_async(url);
        let (stream, _response) = timeout(self.connect_timeout, attempt)
            .await
            .map_err(|_| RealtimeError::timeout(format!("Connect to {} timed out", url)))?
            .map_err(|e| {
                RealtimeError::connection_failed(format!("WebSocket connection failed: {}", e))
            })?;

        info!("WebSocket connected to {}", url);
        Ok(Box::new(WebSocketLink {
            stream,
            closed: false,
        }))
    }
}

/// One live WebSocket connection
pub struct WebSocketLink {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

#[async_trait]
impl TransportLink for WebSocketLink {
    async fn transmit(&mut self, frame: String) -> RealtimeResult<()> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| RealtimeError::connection_failed(format!("Failed to send frame: {}", e)))
    }

    async fn next_event(&mut self) -> TransportEvent {
        if self.closed {
            return TransportEvent::Closed;
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Frame(text),
                Some(Ok(Message::Close(_))) => {
                    debug!("WebSocket closed by peer");
                    self.closed = true;
                    return TransportEvent::Closed;
                }
                // tungstenite answers pings internally on the next poll
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Binary(data))) => {
                    warn!("Ignoring binary frame ({} bytes)", data.len());
                    continue;
                }
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    self.closed = true;
                    return TransportEvent::Failed(e.to_string());
                }
                None => {
                    self.closed = true;
                    return TransportEvent::Closed;
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
