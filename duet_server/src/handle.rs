//! The send capability the core holds for each connected peer

use crate::error::SignalingError;
use crate::protocol::{PeerId, ServerEvent};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

/// A connected peer as seen by the matchmaking core.
///
/// `send` must not block: the core calls it while holding the state lock.
pub trait PeerHandle: fmt::Debug + Send + Sync {
    fn id(&self) -> PeerId;

    fn send(&self, event: &ServerEvent) -> Result<(), SignalingError>;

    /// Ask the transport to close the connection
    fn close(&self);
}

/// Handle backed by the outbound queue of a WebSocket writer task
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: PeerId,
    sender: UnboundedSender<Message>,
}

impl ChannelHandle {
    pub fn new(id: PeerId, sender: UnboundedSender<Message>) -> Self {
        Self { id, sender }
    }
}

impl PeerHandle for ChannelHandle {
    fn id(&self) -> PeerId {
        self.id
    }

    fn send(&self, event: &ServerEvent) -> Result<(), SignalingError> {
        self.sender
            .send(Message::text(event.to_string()))
            .map_err(|e| SignalingError::SendError(e.to_string()))
    }

    fn close(&self) {
        // Writer task may already be gone
        let _ = self.sender.send(Message::Close(None));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory handle that records everything sent to it
    #[derive(Debug)]
    pub struct RecordingHandle {
        id: PeerId,
        sent: Mutex<Vec<ServerEvent>>,
        closed: AtomicBool,
    }

    impl RecordingHandle {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                id: PeerId::random(),
                sent: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            })
        }

        /// Drain the events received so far
        pub fn take(&self) -> Vec<ServerEvent> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }

        pub fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl PeerHandle for RecordingHandle {
        fn id(&self) -> PeerId {
            self.id
        }

        fn send(&self, event: &ServerEvent) -> Result<(), SignalingError> {
            if self.is_closed() {
                return Err(SignalingError::SendError("closed".to_string()));
            }
            self.sent.lock().unwrap().push(event.clone());
            Ok(())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn channel_handle_serializes_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = ChannelHandle::new(PeerId::random(), tx);
        handle.send(&ServerEvent::PeerDisconnected {}).unwrap();
        handle.close();

        let Some(Message::Text(text)) = rx.try_recv().ok() else {
            panic!("expected a text frame");
        };
        assert_eq!(text.as_str(), r#"{"event":"peer-disconnected","data":{}}"#);
        assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
    }

    #[test]
    fn channel_handle_reports_dropped_writer() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let handle = ChannelHandle::new(PeerId::random(), tx);
        assert!(matches!(
            handle.send(&ServerEvent::PeerDisconnected {}),
            Err(SignalingError::SendError(_))
        ));
    }
}
