use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;

use crate::protocol::OutboundMessage;

/// Outbound side of a media connection.
///
/// The pipeline only ever needs to push acks and replies; abstracting that
/// behind a trait keeps the dispatch logic testable without a socket.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, message: OutboundMessage) -> Result<()>;
}

/// `Transport` over the write half of an axum WebSocket.
pub struct WebSocketTransport {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketTransport {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: OutboundMessage) -> Result<()> {
        let json = serde_json::to_string(&message).context("Failed to serialize reply")?;
        self.sink
            .send(Message::Text(json))
            .await
            .context("Failed to send reply over WebSocket")
    }
}
