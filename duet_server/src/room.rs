//! Rooms: established pairs of peers and message relay between them

use crate::protocol::{PeerId, RoomId, ServerEvent};
use crate::registry::Peer;
use std::collections::HashMap;
use tracing::{debug, info};

/// Two matched peers. `peer_a` is the negotiation initiator.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub peer_a: Peer,
    pub peer_b: Peer,
}

impl Room {
    pub fn contains(&self, id: &PeerId) -> bool {
        self.peer_a.id == *id || self.peer_b.id == *id
    }

    /// The member opposite `id`, or `None` if `id` is not in this room
    pub fn other(&self, id: &PeerId) -> Option<&Peer> {
        if self.peer_a.id == *id {
            Some(&self.peer_b)
        } else if self.peer_b.id == *id {
            Some(&self.peer_a)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    /// peer id -> the one room it belongs to
    membership: HashMap<PeerId, RoomId>,
    next_id: u64,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self {
            rooms: HashMap::new(),
            membership: HashMap::new(),
            next_id: 1,
        }
    }
}

impl RoomRegistry {
    /// Store a new room and tell `peer_a` to start negotiating
    pub fn create_room(&mut self, peer_a: Peer, peer_b: Peer) -> RoomId {
        debug_assert_ne!(peer_a.id, peer_b.id);
        debug_assert!(!self.membership.contains_key(&peer_a.id));
        debug_assert!(!self.membership.contains_key(&peer_b.id));

        let id = RoomId::from(self.next_id);
        self.next_id += 1;

        info!(room = %id, initiator = %peer_a.id, partner = %peer_b.id, "paired peers");
        peer_a.send(&ServerEvent::SendOffer {
            room_id: id.clone(),
        });

        self.membership.insert(peer_a.id, id.clone());
        self.membership.insert(peer_b.id, id.clone());
        self.rooms.insert(
            id.clone(),
            Room {
                id: id.clone(),
                peer_a,
                peer_b,
            },
        );
        id
    }

    pub fn get_room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<&RoomId> {
        self.membership.get(peer)
    }

    /// Forward `event` to the partner of `sender` in `room_id`.
    ///
    /// Returns `false` if the room is gone or `sender` is not a member.
    pub fn relay(&self, room_id: &RoomId, sender: &PeerId, event: &ServerEvent) -> bool {
        let Some(room) = self.rooms.get(room_id) else {
            debug!(room = %room_id, peer = %sender, event = event.name(), "dropping relay to unknown room");
            return false;
        };
        let Some(partner) = room.other(sender) else {
            debug!(room = %room_id, peer = %sender, event = event.name(), "dropping relay from non-member");
            return false;
        };
        debug!(room = %room_id, from = %sender, to = %partner.id, event = event.name(), "relay");
        partner.send(event);
        true
    }

    /// Tear down the room containing `peer`, notify the other member and
    /// return its id.
    pub fn remove_peer_and_teardown(&mut self, peer: &PeerId) -> Option<PeerId> {
        let room_id = self.membership.remove(peer)?;
        let room = self.rooms.remove(&room_id)?;
        let partner = room.other(peer)?;
        self.membership.remove(&partner.id);

        info!(room = %room_id, leaving = %peer, partner = %partner.id, "room closed");
        partner.send(&ServerEvent::PeerDisconnected {});
        Some(partner.id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}
