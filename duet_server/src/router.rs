//! Dispatch of inbound client events onto the registry, queue and rooms

use crate::handle::PeerHandle;
use crate::protocol::{ClientEvent, PeerId, RoomId, ServerEvent};
use crate::queue::PairingQueue;
use crate::registry::ConnectionRegistry;
use crate::room::RoomRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// All matchmaking state. Events must be fed in one at a time.
#[derive(Debug, Default)]
pub struct SignalingRouter {
    registry: ConnectionRegistry,
    queue: PairingQueue,
    rooms: RoomRegistry,
}

impl SignalingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event from the connection behind `origin`.
    ///
    /// The acting peer is always `origin.id()`; ids inside payloads are
    /// only used to address rooms.
    pub fn handle_event(&mut self, origin: &Arc<dyn PeerHandle>, event: ClientEvent) {
        let peer = origin.id();
        match event {
            ClientEvent::Join { name } => self.join(origin, name),
            ClientEvent::Disconnect => self.disconnect(&peer),
            event if !self.registry.contains(&peer) => {
                debug!(%peer, event = event.name(), "dropping event from unregistered peer");
            }
            ClientEvent::FindNext => self.find_next(&peer),
            ClientEvent::ChatMessage { message, room_id } => {
                self.relay(&room_id, &peer, ServerEvent::ChatMessage { message });
            }
            ClientEvent::Offer { sdp, room_id } => {
                let event = ServerEvent::Offer {
                    sdp,
                    room_id: room_id.clone(),
                };
                self.relay(&room_id, &peer, event);
            }
            ClientEvent::Answer { sdp, room_id } => {
                let event = ServerEvent::Answer {
                    sdp,
                    room_id: room_id.clone(),
                };
                self.relay(&room_id, &peer, event);
            }
            ClientEvent::AddIceCandidate {
                candidate,
                room_id,
                kind,
            } => {
                let event = ServerEvent::AddIceCandidate {
                    candidate,
                    kind,
                    room_id: room_id.clone(),
                };
                self.relay(&room_id, &peer, event);
            }
        }
    }

    fn join(&mut self, origin: &Arc<dyn PeerHandle>, name: String) {
        let peer = origin.id();
        if self.registry.contains(&peer) {
            debug!(%peer, "ignoring repeated join");
            return;
        }
        info!(%peer, %name, "peer joined");
        self.registry.add_peer(name, Arc::clone(origin));
        self.enqueue(peer);
        debug!(queued = self.queue.len(), "queue length");
    }

    fn find_next(&mut self, peer: &PeerId) {
        debug!(%peer, "find next");
        if let Some(partner) = self.rooms.remove_peer_and_teardown(peer) {
            self.enqueue(partner);
        }
        self.enqueue(*peer);
    }

    fn disconnect(&mut self, peer: &PeerId) {
        if !self.registry.contains(peer) {
            debug!(%peer, "disconnect of unregistered peer");
            return;
        }
        if let Some(partner) = self.rooms.remove_peer_and_teardown(peer) {
            self.enqueue(partner);
        }
        self.queue.remove(peer);
        self.registry.remove_peer(peer);
        info!(%peer, "peer left");
    }

    fn enqueue(&mut self, peer: PeerId) -> Option<RoomId> {
        self.queue.enqueue(peer, &self.registry, &mut self.rooms)
    }

    fn relay(&self, room_id: &RoomId, sender: &PeerId, event: ServerEvent) {
        self.rooms.relay(room_id, sender, &event);
    }

    /// Peer ids waiting for a partner, front first
    pub fn queued(&self) -> Vec<PeerId> {
        self.queue.iter().copied().collect()
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<RoomId> {
        self.rooms.room_of(peer).cloned()
    }

    pub fn room_members(&self, room: &RoomId) -> Option<(PeerId, PeerId)> {
        self.rooms
            .get_room(room)
            .map(|room| (room.peer_a.id, room.peer_b.id))
    }

    pub fn peer_count(&self) -> usize {
        self.registry.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Close every registered connection
    pub fn close_all(&self) {
        for peer in self.registry.iter() {
            peer.handle.close();
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for id in self.queue.iter() {
            assert!(seen.insert(*id), "{id} queued twice");
            assert!(self.registry.contains(id), "{id} queued but not registered");
            assert!(self.rooms.room_of(id).is_none(), "{id} both queued and in a room");
        }
        for room in self.rooms.iter() {
            assert_ne!(room.peer_a.id, room.peer_b.id);
            for member in [&room.peer_a, &room.peer_b] {
                assert!(self.registry.contains(&member.id));
                assert_eq!(self.rooms.room_of(&member.id), Some(&room.id));
            }
        }
    }
}
