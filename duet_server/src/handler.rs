//! WebSocket connection handling
//!
//! Each accepted socket becomes one peer: a writer task drains the peer's
//! outbound queue into the socket while the read loop feeds parsed events
//! into the shared state. When either side stops the peer is disconnected.

use crate::config::OriginPolicy;
use crate::error::{ClientRequestError, SignalingError};
use crate::handle::{ChannelHandle, PeerHandle};
use crate::protocol::{ClientEvent, PeerId};
use crate::state::ServerState;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};

/// How long a closing connection may take to flush its close frame
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Reject browsers whose `Origin` is not allowed
fn check_origin(
    policy: &OriginPolicy,
    request: &Request,
    response: Response,
) -> Result<Response, ErrorResponse> {
    let origin = request
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok());
    if policy.permits(origin) {
        return Ok(response);
    }
    warn!(?origin, "rejecting connection from disallowed origin");
    let mut rejection = ErrorResponse::new(Some("Origin not allowed".to_string()));
    *rejection.status_mut() = StatusCode::FORBIDDEN;
    Err(rejection)
}

/// Turn a WebSocket frame into a routed event
pub fn parse_message(message: Message) -> Result<ClientEvent, ClientRequestError> {
    match message {
        Message::Text(text) => text.as_str().parse(),
        Message::Close(_) => Err(ClientRequestError::Close),
        _ => Err(ClientRequestError::UnsupportedType),
    }
}

/// Serve one client connection until it goes away
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: ServerState,
    policy: Arc<OriginPolicy>,
) -> Result<(), SignalingError> {
    let ws_stream = accept_hdr_async(stream, |request: &Request, response: Response| {
        check_origin(&policy, request, response)
    })
    .await?;

    let peer_id = PeerId::random();
    info!(peer = %peer_id, %addr, "connection opened");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle: Arc<dyn PeerHandle> = Arc::new(ChannelHandle::new(peer_id, tx));

    // Handle outgoing messages
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Message::Close(_) = message {
                // Also flushes the reply to a close the client started
                if let Err(e) = ws_sender.close().await {
                    debug!(peer = %peer_id, "error closing connection: {e}");
                }
                break;
            }
            if let Err(e) = ws_sender.send(message).await {
                debug!(peer = %peer_id, "error sending message: {e}");
                break;
            }
        }
    });

    // Handle incoming messages
    let recv_state = state.clone();
    let recv_handle = Arc::clone(&handle);
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = ws_receiver.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    debug!(peer = %peer_id, "error receiving message: {e}");
                    break;
                }
            };
            match parse_message(message) {
                Ok(event) => recv_state.dispatch(&recv_handle, event),
                Err(ClientRequestError::Close) => break,
                Err(ClientRequestError::UnsupportedType) => {}
                Err(e) => debug!(peer = %peer_id, "dropping request: {e}"),
            }
        }
    });

    // Wait for either task to complete
    let reader_done = tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            false
        }
        _ = (&mut recv_task) => true,
    };

    state.dispatch(&handle, ClientEvent::Disconnect);

    if reader_done {
        // Let the writer finish the close handshake
        handle.close();
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut send_task).await.is_err() {
            send_task.abort();
        }
    }
    info!(peer = %peer_id, %addr, "connection closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::http;

    fn request(origin: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/");
        if let Some(origin) = origin {
            builder = builder.header("origin", origin);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn origin_check_rejects_with_forbidden() {
        let policy = OriginPolicy::AllowList(vec!["https://ok.example".to_string()]);

        assert!(check_origin(&policy, &request(Some("https://ok.example")), Response::default()).is_ok());
        assert!(check_origin(&policy, &request(None), Response::default()).is_ok());

        let rejection =
            check_origin(&policy, &request(Some("https://bad.example")), Response::default())
                .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn non_text_frames_are_not_events() {
        assert!(matches!(
            parse_message(Message::Close(None)),
            Err(ClientRequestError::Close)
        ));
        assert!(matches!(
            parse_message(Message::binary(vec![1u8, 2, 3])),
            Err(ClientRequestError::UnsupportedType)
        ));
        assert_eq!(
            parse_message(Message::text(r#"{"event":"find-next"}"#)).unwrap(),
            ClientEvent::FindNext
        );
    }
}
