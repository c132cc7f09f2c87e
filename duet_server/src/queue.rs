//! FIFO waiting line of peers looking for a partner

use crate::protocol::{PeerId, RoomId};
use crate::registry::ConnectionRegistry;
use crate::room::RoomRegistry;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Default)]
pub struct PairingQueue {
    waiting: VecDeque<PeerId>,
}

impl PairingQueue {
    /// Append `id` unless it is already waiting, then try to form a room.
    ///
    /// Returns the room created by this call, if any.
    pub fn enqueue(
        &mut self,
        id: PeerId,
        registry: &ConnectionRegistry,
        rooms: &mut RoomRegistry,
    ) -> Option<RoomId> {
        if !self.waiting.contains(&id) {
            self.waiting.push_back(id);
        }
        self.try_pair(registry, rooms)
    }

    /// Pair the two oldest live entries.
    ///
    /// Entries whose peer is no longer registered are discarded and the
    /// next entry moves up. At most one room is created per call.
    pub fn try_pair(
        &mut self,
        registry: &ConnectionRegistry,
        rooms: &mut RoomRegistry,
    ) -> Option<RoomId> {
        while self.waiting.len() >= 2 {
            let Some(first) = registry.get(&self.waiting[0]) else {
                let stale = self.waiting.pop_front();
                debug!(peer = ?stale, "discarding stale queue entry");
                continue;
            };
            let Some(second) = registry.get(&self.waiting[1]) else {
                let stale = self.waiting.remove(1);
                debug!(peer = ?stale, "discarding stale queue entry");
                continue;
            };
            let (first, second) = (first.clone(), second.clone());
            self.waiting.drain(..2);
            return Some(rooms.create_room(first, second));
        }
        None
    }

    /// Returns whether `id` was waiting
    pub fn remove(&mut self, id: &PeerId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|queued| queued != id);
        self.waiting.len() != before
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.waiting.contains(id)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerId> {
        self.waiting.iter()
    }
}
