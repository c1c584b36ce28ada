use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::pipeline::MediaPipeline;
use super::transport::{Transport, WebSocketTransport};
use crate::error::IngestError;
use crate::protocol::OutboundMessage;

/// Drive one WebSocket connection until the client disconnects.
///
/// Control and binary messages interleave arbitrarily on the socket; each is
/// routed through the pipeline and the reply (if any) sent back. No error is
/// fatal to the connection except transport failure itself. On disconnect
/// the session's registry and buffer state stay intact so a reconnect with
/// the same id can resume.
pub async fn run_connection(socket: WebSocket, pipeline: Arc<MediaPipeline>) {
    let (sink, mut receiver) = socket.split();
    let mut transport = WebSocketTransport::new(sink);
    let mut session_id: Option<String> = None;

    while let Some(message) = receiver.next().await {
        let result = match message {
            Ok(Message::Text(text)) => pipeline.handle_text(&text).await,
            Ok(Message::Binary(bytes)) => pipeline.handle_binary(&bytes).await,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                debug!("Client sent close");
                break;
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        match result {
            Ok(Some(reply)) => {
                if let OutboundMessage::SessionInitAck { session_id: sid, .. } = &reply {
                    session_id = Some(sid.clone());
                }
                if let Err(e) = transport.send(reply).await {
                    debug!("Client went away mid-reply: {}", e);
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log_dropped(&e),
        }
    }

    if let Some(sid) = session_id {
        pipeline.registry().set_connected(&sid, false).await;
        info!("Client disconnected from session {}", sid);
    } else {
        debug!("Connection closed before session init");
    }
}

/// Every ingest error is drop-and-log: the offending unit is discarded, the
/// connection stays open, and only persistence trouble is operator-grade.
fn log_dropped(e: &IngestError) {
    match e {
        IngestError::PersistenceFailure { .. } | IngestError::SessionSetup(_) => {
            error!("{}", e);
        }
        IngestError::MalformedFrame(_)
        | IngestError::BadControlMessage(_)
        | IngestError::UnknownSession(_)
        | IngestError::SessionClosed(_)
        | IngestError::DuplicateCommit { .. }
        | IngestError::PayloadTooLarge { .. } => {
            warn!("Dropped message: {}", e);
        }
    }
}
