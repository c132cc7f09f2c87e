//! Shared server state
//!
//! Connection tasks run concurrently, but every event goes through one
//! mutex so the router sees a strictly serial stream of events. Nothing
//! inside the lock awaits: outbound sends are channel pushes.

use crate::handle::PeerHandle;
use crate::protocol::{ClientEvent, PeerId, RoomId};
use crate::router::SignalingRouter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to the single matchmaking state
#[derive(Debug, Default, Clone)]
pub struct ServerState {
    router: Arc<Mutex<SignalingRouter>>,
}

impl ServerState {
    /// Create a new, empty server state
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SignalingRouter> {
        self.router.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Process one event to completion
    pub fn dispatch(&self, origin: &Arc<dyn PeerHandle>, event: ClientEvent) {
        self.lock().handle_event(origin, event);
    }

    pub fn queued(&self) -> Vec<PeerId> {
        self.lock().queued()
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<RoomId> {
        self.lock().room_of(peer)
    }

    pub fn room_members(&self, room: &RoomId) -> Option<(PeerId, PeerId)> {
        self.lock().room_members(room)
    }

    pub fn peer_count(&self) -> usize {
        self.lock().peer_count()
    }

    pub fn room_count(&self) -> usize {
        self.lock().room_count()
    }

    /// Ask every registered connection to close
    pub fn close_all(&self) {
        self.lock().close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::testing::RecordingHandle;
    use crate::protocol::ServerEvent;

    #[test]
    fn clones_share_state() {
        let state = ServerState::new();
        let other = state.clone();
        let a = RecordingHandle::new();
        let b = RecordingHandle::new();
        let origin_a: Arc<dyn PeerHandle> = a.clone();
        let origin_b: Arc<dyn PeerHandle> = b.clone();

        state.dispatch(
            &origin_a,
            ClientEvent::Join {
                name: "a".to_string(),
            },
        );
        assert_eq!(other.queued(), vec![a.id()]);

        other.dispatch(
            &origin_b,
            ClientEvent::Join {
                name: "b".to_string(),
            },
        );
        assert_eq!(state.room_of(&b.id()), Some(RoomId::from(1)));
        assert_eq!(
            a.take(),
            vec![ServerEvent::SendOffer {
                room_id: RoomId::from(1)
            }]
        );
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let state = ServerState::new();
        let poisoner = state.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.router.lock().unwrap();
            panic!("panicked while holding the state lock");
        })
        .join();
        assert!(result.is_err());
        assert!(state.router.is_poisoned());

        let a = RecordingHandle::new();
        let b = RecordingHandle::new();
        let origin_a: Arc<dyn PeerHandle> = a.clone();
        let origin_b: Arc<dyn PeerHandle> = b.clone();
        state.dispatch(
            &origin_a,
            ClientEvent::Join {
                name: "a".to_string(),
            },
        );
        state.dispatch(
            &origin_b,
            ClientEvent::Join {
                name: "b".to_string(),
            },
        );

        assert_eq!(state.peer_count(), 2);
        assert_eq!(state.room_members(&RoomId::from(1)), Some((a.id(), b.id())));
    }

    #[test]
    fn concurrent_joins_pair_everyone() {
        let state = ServerState::new();
        let handles: Vec<_> = (0..8).map(|_| RecordingHandle::new()).collect();

        std::thread::scope(|scope| {
            for handle in &handles {
                let state = state.clone();
                let origin: Arc<dyn PeerHandle> = handle.clone();
                scope.spawn(move || {
                    state.dispatch(
                        &origin,
                        ClientEvent::Join {
                            name: "p".to_string(),
                        },
                    );
                });
            }
        });

        assert_eq!(state.peer_count(), 8);
        assert_eq!(state.room_count(), 4);
        assert!(state.queued().is_empty());
        let initiators = handles.iter().filter(|h| !h.take().is_empty()).count();
        assert_eq!(initiators, 4);
    }
}
