//! Per-connection handler: authenticate, register, then serve requests.

use std::net::SocketAddr;
use std::time::Duration;

use campus_common::{ClientFrame, ConnectionId, ServerFrame};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::auth::AuthenticatedUser;
use crate::error::RelayError;
use crate::service::encode;
use crate::RelayState;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Handle a single WebSocket connection.
pub async fn handle_connection(ws: WebSocketStream<TcpStream>, addr: SocketAddr, state: RelayState) {
    let (mut sink, mut stream) = ws.split();

    // 1. Read the hello and authenticate.
    let user = match authenticate(&mut stream, &state).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "Handshake rejected");
            let _ = send_frame(
                &mut sink,
                &ServerFrame::Error {
                    message: e.to_string(),
                },
            )
            .await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    // 2. Register our outbox.
    let conn_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::channel::<String>(state.session_queue.max(1));
    let sessions = state.service.sessions();
    sessions.register(&user.user_id, conn_id.clone(), tx).await;

    tracing::info!(
        peer = %addr,
        user_id = %user.user_id,
        conn = %conn_id,
        "Client registered"
    );

    // 3. Send session_ready.
    let ready = ServerFrame::SessionReady {
        user_id: user.user_id.clone(),
    };
    if send_frame(&mut sink, &ready).await.is_err() {
        sessions.unregister(&user.user_id, &conn_id).await;
        return;
    }

    // 4. Serve until either side goes away.
    serve(&mut sink, &mut stream, &mut rx, &conn_id, &user, &state, addr).await;

    // 5. Cleanup.
    let last = sessions.unregister(&user.user_id, &conn_id).await;
    tracing::info!(
        peer = %addr,
        user_id = %user.user_id,
        conn = %conn_id,
        last_connection = last,
        "Client disconnected"
    );
}

async fn serve(
    sink: &mut WsSink,
    stream: &mut WsSource,
    rx: &mut mpsc::Receiver<String>,
    conn_id: &ConnectionId,
    user: &AuthenticatedUser,
    state: &RelayState,
    addr: SocketAddr,
) {
    loop {
        tokio::select! {
            // Frames queued for this client -> its WebSocket.
            Some(frame) = rx.recv() => {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            // Frames from this client.
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Request { msg_ref, request }) => {
                                let payload = state.service.handle_request(conn_id, user, request).await;
                                if send_frame(sink, &ServerFrame::Ack { msg_ref, payload }).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ClientFrame::Ping) => {
                                if send_frame(sink, &ServerFrame::Pong).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ClientFrame::Hello { .. }) => {
                                tracing::debug!(conn = %conn_id, "Repeated hello ignored");
                            }
                            Err(e) => {
                                tracing::debug!(peer = %addr, error = %e, "Malformed frame dropped");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}

async fn authenticate(stream: &mut WsSource, state: &RelayState) -> Result<AuthenticatedUser, RelayError> {
    let token = read_hello(stream, state.hello_timeout).await?;
    state.validator.validate(&token).await
}

/// Read the first frame and return its token. Anything but a `hello`
/// within `timeout` fails the handshake.
async fn read_hello(stream: &mut WsSource, timeout: Duration) -> Result<String, RelayError> {
    let frame = tokio::time::timeout(timeout, stream.next())
        .await
        .map_err(|_| RelayError::Unauthorized(format!("no hello within {timeout:?}")))?;

    match frame {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::Hello { token }) => Ok(token),
            Ok(other) => Err(RelayError::Unauthorized(format!(
                "expected hello, got {}",
                frame_kind(&other)
            ))),
            Err(e) => Err(RelayError::Unauthorized(format!("invalid hello: {e}"))),
        },
        Some(Ok(_)) => Err(RelayError::Unauthorized("expected a text hello".into())),
        Some(Err(e)) => Err(RelayError::Unauthorized(format!("websocket error before hello: {e}"))),
        None => Err(RelayError::Unauthorized("closed before hello".into())),
    }
}

fn frame_kind(frame: &ClientFrame) -> &'static str {
    match frame {
        ClientFrame::Hello { .. } => "hello",
        ClientFrame::Request { .. } => "request",
        ClientFrame::Ping => "ping",
    }
}

/// Send a frame as a JSON text message.
async fn send_frame(sink: &mut WsSink, frame: &ServerFrame) -> Result<(), String> {
    let json = encode(frame).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}
