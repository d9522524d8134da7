//! Background WebSocket connection loop with auto-reconnect.

use std::sync::Arc;

use campus_common::{ClientFrame, ServerFrame};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::acks::PendingAcks;
use super::client::Shared;
use super::handler::handle_server_text;
use super::types::{ConnectionState, RealtimeCommand, RealtimeConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

/// Outcome of a single relay session.
enum SessionResult {
    /// The client was closed; stop reconnecting.
    Shutdown,
    /// The socket dropped; retry after backoff.
    Disconnected(String),
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Owns the socket for one client until it is closed.
pub(crate) async fn connection_loop(
    shared: Arc<Shared>,
    token: String,
    mut command_rx: mpsc::Receiver<RealtimeCommand>,
) {
    let mut reconnect_delay = shared.config.reconnect_delay();

    loop {
        shared.publish_state(ConnectionState::Connecting);
        info!(url = %shared.config.url, user_id = %shared.user_id, "Connecting to campus relay");

        let opened = tokio::select! {
            biased;
            _ = shared.shutdown.cancelled() => break,
            opened = open_session(&shared.config, &token) => opened,
        };

        match opened {
            Ok((sink, source)) => {
                reconnect_delay = shared.config.reconnect_delay();
                shared.publish_state(ConnectionState::Connected);
                info!(user_id = %shared.user_id, "Relay session ready");

                match run_session(&shared, sink, source, &mut command_rx).await {
                    SessionResult::Shutdown => break,
                    SessionResult::Disconnected(reason) => {
                        warn!(reason = %reason, "Relay connection lost");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to campus relay");
            }
        }

        shared.publish_state(ConnectionState::Connecting);
        let failed = shared.acks.fail_all();
        if failed > 0 {
            debug!(failed, "Failed pending requests after disconnect");
        }
        while command_rx.try_recv().is_ok() {}

        info!(delay = ?reconnect_delay, "Reconnecting to campus relay");
        tokio::select! {
            biased;
            _ = shared.shutdown.cancelled() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
        reconnect_delay = (reconnect_delay * 2).min(shared.config.max_reconnect_delay());
    }

    debug!(user_id = %shared.user_id, "Connection loop stopped");
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Open the socket, send `hello`, and wait for `session_ready`.
async fn open_session(config: &RealtimeConfig, token: &str) -> Result<(WsSink, WsSource), String> {
    let connect_timeout = config.connect_timeout();

    let (ws_stream, _) = tokio::time::timeout(
        connect_timeout,
        tokio_tungstenite::connect_async(config.url.as_str()),
    )
    .await
    .map_err(|_| format!("connection timed out after {connect_timeout:?}"))?
    .map_err(|e| format!("connection failed: {e}"))?;

    let (mut sink, mut source) = ws_stream.split();

    let hello = ClientFrame::Hello {
        token: token.to_string(),
    };
    let json = serde_json::to_string(&hello).map_err(|e| format!("serialize hello: {e}"))?;
    sink.send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| format!("send hello: {e}"))?;

    tokio::time::timeout(connect_timeout, read_session_ready(&mut source))
        .await
        .map_err(|_| format!("handshake timed out after {connect_timeout:?}"))??;

    Ok((sink, source))
}

async fn read_session_ready(source: &mut WsSource) -> Result<(), String> {
    while let Some(msg) = source.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                return match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(ServerFrame::SessionReady { user_id }) => {
                        debug!(user_id = %user_id, "Handshake accepted");
                        Ok(())
                    }
                    Ok(ServerFrame::Error { message }) => Err(format!("handshake rejected: {message}")),
                    Ok(other) => Err(format!("unexpected frame during handshake: {other:?}")),
                    Err(e) => Err(format!("invalid handshake frame: {e}")),
                };
            }
            Ok(WsMessage::Close(_)) => return Err("relay closed during handshake".into()),
            Ok(_) => continue,
            Err(e) => return Err(format!("websocket error: {e}")),
        }
    }
    Err("relay closed during handshake".into())
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

async fn run_session(
    shared: &Shared,
    mut sink: WsSink,
    mut source: WsSource,
    command_rx: &mut mpsc::Receiver<RealtimeCommand>,
) -> SessionResult {
    let heartbeat_every = shared.config.heartbeat_interval();
    let mut heartbeat =
        tokio::time::interval_at(tokio::time::Instant::now() + heartbeat_every, heartbeat_every);

    loop {
        tokio::select! {
            biased;

            _ = shared.shutdown.cancelled() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                return SessionResult::Shutdown;
            }

            Some(cmd) = command_rx.recv() => {
                let Some(frame) = outgoing_frame(&shared.acks, cmd) else {
                    continue;
                };
                if let Err(e) = send_frame(&mut sink, &frame).await {
                    return SessionResult::Disconnected(e);
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = send_frame(&mut sink, &ClientFrame::Ping).await {
                    return SessionResult::Disconnected(e);
                }
            }

            msg = source.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => handle_server_text(shared, &text),
                Some(Ok(WsMessage::Ping(data))) => {
                    let _ = sink.send(WsMessage::Pong(data)).await;
                }
                Some(Ok(WsMessage::Close(_))) => {
                    return SessionResult::Disconnected("relay closed the connection".into());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return SessionResult::Disconnected(format!("websocket error: {e}")),
                None => return SessionResult::Disconnected("stream ended".into()),
            },
        }
    }
}

/// The frame for a queued command, or `None` once its caller stopped waiting.
fn outgoing_frame(acks: &PendingAcks, cmd: RealtimeCommand) -> Option<ClientFrame> {
    match cmd {
        RealtimeCommand::Request { msg_ref, request } => {
            if !acks.contains(msg_ref) {
                debug!(msg_ref, event = request.event_name(), "Dropping abandoned request");
                return None;
            }
            debug!(msg_ref, event = request.event_name(), "Sending request");
            Some(ClientFrame::Request { msg_ref, request })
        }
    }
}

async fn send_frame(sink: &mut WsSink, frame: &ClientFrame) -> Result<(), String> {
    let json = serde_json::to_string(frame).map_err(|e| format!("serialize frame: {e}"))?;
    sink.send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| format!("send failed: {e}"))
}
