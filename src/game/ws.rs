use super::core::Identity;
use super::core::messages::{ClientMessage, ServerMessage, decode_server_frame, encode_client_message};
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
pub enum TransportEvent {
    Message(ServerMessage),
    /// Always the last event of a channel, and sent exactly once
    Closed(CloseReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The server closed the connection
    PeerClosed,
    /// The handle was dropped on this side
    Local,
    Failed(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => f.write_str("connection closed by server"),
            CloseReason::Local => f.write_str("connection closed locally"),
            CloseReason::Failed(err) => write!(f, "connection failed: {err}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

/// Endpoint with the participant's identity attached as query parameters.
pub fn endpoint_for(base: &Url, identity: &Identity) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("id", &identity.id)
        .append_pair("name", &identity.name);
    url
}

/// Handle to one open WebSocket channel. Dropping it closes the channel.
#[derive(Debug)]
pub struct Transport {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    open: Arc<AtomicBool>,
}

impl Transport {
    pub async fn open(
        endpoint: &Url,
        identity: &Identity,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), TransportError> {
        let url = endpoint_for(endpoint, identity);
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::Connect {
                url: endpoint.to_string(),
                source,
            })?;
        info!(endpoint = %endpoint, id = %identity.id, "Channel open");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(true));
        tokio::spawn(run_channel(stream, outbound_rx, events_tx, open.clone()));

        Ok((Self { outbound, open }, events))
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Queue a message. On a closed channel the message is dropped with a warning.
    pub fn send(&self, msg: ClientMessage) {
        if !self.is_open() {
            warn!(?msg, "Dropping message, channel is not open");
            return;
        }
        if let Err(err) = self.outbound.send(msg) {
            warn!(msg = ?err.0, "Dropping message, channel task has exited");
        }
    }
}

async fn run_channel(
    stream: WsStream,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    events: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<AtomicBool>,
) {
    let (mut sink, mut source) = stream.split();

    let reason = loop {
        tokio::select! {
            msg = outbound.recv() => {
                let Some(msg) = msg else {
                    let _ = sink.send(Message::Close(None)).await;
                    break CloseReason::Local;
                };
                let json = match encode_client_message(&msg) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!(error = %err, "Failed to encode client message");
                        continue;
                    }
                };
                debug!(raw = %json, "Sending message");
                if let Err(err) = sink.send(Message::Text(json.into())).await {
                    break CloseReason::Failed(err.to_string());
                }
            }
            frame = source.next() => match frame {
                None => break CloseReason::PeerClosed,
                Some(Err(err)) => break CloseReason::Failed(err.to_string()),
                Some(Ok(Message::Close(_))) => break CloseReason::PeerClosed,
                Some(Ok(Message::Text(text))) => {
                    debug!(raw = %text.as_str(), "Received message");
                    match decode_server_frame(text.as_str()) {
                        Ok(msg) => {
                            let _ = events.send(TransportEvent::Message(msg));
                        }
                        Err(err) => warn!(raw = %text.as_str(), error = %err, "Discarding server frame"),
                    }
                }
                Some(Ok(_)) => debug!("Received non-text frame, ignoring"),
            }
        }
    };

    open.store(false, Ordering::Release);
    info!(%reason, "Channel closed");
    let _ = events.send(TransportEvent::Closed(reason));
}
