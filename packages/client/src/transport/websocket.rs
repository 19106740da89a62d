//! WebSocket を使った Transport 実装
//!
//! ## 責務
//!
//! - バックグラウンドタスクでサーバーへの接続を確立・維持する
//! - 切断時は `ReconnectPolicy` に従って再接続する
//! - 送信イベントをキューに積み、接続中に順番に書き込む
//! - 受信したテキストフレームを `TransportEvent::Frame` として通知する
//!
//! Frames emitted while disconnected stay queued and are written after the
//! next successful connection, right behind the handshake events. A frame
//! that fails mid-write is lost.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use hiroba_shared::protocol::{self, ClientEvent};

use super::{Connection, Connector, Handshake, Transport, TransportError, TransportEvent};
use crate::domain::ReconnectPolicy;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector that opens WebSocket connections with tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    fn connect(
        &self,
        url: &str,
        reconnect: ReconnectPolicy,
        handshake: Handshake,
    ) -> Connection {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_transport(
            url.to_string(),
            reconnect,
            handshake,
            outbound_rx,
            events_tx,
        ));

        Connection {
            transport: Arc::new(WebSocketTransport {
                outbound: outbound_tx,
            }),
            events: events_rx,
        }
    }
}

/// Outbound handle queueing encoded frames for the background task
struct WebSocketTransport {
    outbound: mpsc::UnboundedSender<String>,
}

impl Transport for WebSocketTransport {
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError> {
        let frame = protocol::encode(event)?;
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }
}

/// Why a connected socket stopped being pumped
enum PumpOutcome {
    /// The session dropped its handles; stop for good
    Shutdown,
    /// The socket failed or was closed by the server
    Lost(String),
}

/// Connection loop with reconnection support
async fn run_transport(
    url: String,
    policy: ReconnectPolicy,
    handshake: Handshake,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut failed_attempts: u32 = 0;
    let mut has_connected = false;

    loop {
        if outbound.is_closed() {
            tracing::debug!("Transport handle dropped, not connecting to {}", url);
            return;
        }

        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            failed_attempts + 1,
            policy.max_attempts + 1
        );

        let reason = match connect_async(url.as_str()).await {
            Ok((socket, _response)) => {
                failed_attempts = 0;
                tracing::info!("Connected to chat server at {}", url);
                let greeting = if has_connected {
                    encode_handshake(&handshake)
                } else {
                    Vec::new()
                };
                has_connected = true;
                if events.send(TransportEvent::Connected).is_err() {
                    return;
                }

                match pump(socket, greeting, &mut outbound, &events).await {
                    PumpOutcome::Shutdown => {
                        tracing::debug!("Transport for {} shut down", url);
                        return;
                    }
                    PumpOutcome::Lost(reason) => reason,
                }
            }
            Err(e) => {
                failed_attempts += 1;
                e.to_string()
            }
        };

        let will_retry = policy.should_attempt_reconnect(failed_attempts);
        tracing::warn!("Connection lost: {}", reason);
        if events
            .send(TransportEvent::Disconnected { reason, will_retry })
            .is_err()
        {
            return;
        }

        if !will_retry {
            tracing::error!(
                "Failed to reconnect after {} attempts. Giving up.",
                failed_attempts
            );
            return;
        }

        tracing::info!(
            "Reconnecting in {} seconds...",
            policy.interval.as_secs_f32()
        );
        tokio::time::sleep(policy.interval).await;
    }
}

fn encode_handshake(handshake: &Handshake) -> Vec<String> {
    handshake()
        .iter()
        .filter_map(|event| match protocol::encode(event) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::error!("Failed to encode handshake event: {}", e);
                None
            }
        })
        .collect()
}

/// Write `greeting`, then move frames in both directions until the socket
/// or the session goes away
async fn pump(
    socket: Socket,
    greeting: Vec<String>,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> PumpOutcome {
    let (mut write, mut read) = socket.split();

    for frame in greeting {
        if let Err(e) = write.send(Message::Text(frame.into())).await {
            return PumpOutcome::Lost(e.to_string());
        }
    }

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Frame(text.to_string())).is_err() {
                        let _ = write.send(Message::Close(None)).await;
                        return PumpOutcome::Shutdown;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Ignoring {} bytes of binary data", data.len());
                }
                Some(Ok(Message::Close(_))) | None => {
                    return PumpOutcome::Lost("server closed the connection".to_string());
                }
                Some(Err(e)) => return PumpOutcome::Lost(e.to_string()),
                Some(Ok(_)) => {}
            },
            next = outbound.recv() => match next {
                Some(frame) => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        return PumpOutcome::Lost(e.to_string());
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return PumpOutcome::Shutdown;
                }
            },
        }
    }
}
