//! Connected peers, keyed by connection id

use crate::handle::PeerHandle;
use crate::protocol::{PeerId, ServerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// One connected participant
#[derive(Debug, Clone)]
pub struct Peer {
    pub id: PeerId,
    pub name: String,
    pub handle: Arc<dyn PeerHandle>,
}

impl Peer {
    /// Fire-and-forget delivery; a failed send only means the peer is on
    /// its way out and its disconnect will follow.
    pub fn send(&self, event: &ServerEvent) {
        if let Err(e) = self.handle.send(event) {
            warn!(peer = %self.id, event = event.name(), "dropping outbound event: {e}");
        }
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    peers: HashMap<PeerId, Peer>,
}

impl ConnectionRegistry {
    /// Register a peer under the id its handle carries
    pub fn add_peer(&mut self, name: impl Into<String>, handle: Arc<dyn PeerHandle>) -> PeerId {
        let id = handle.id();
        let peer = Peer {
            id,
            name: name.into(),
            handle,
        };
        self.peers.insert(id, peer);
        id
    }

    /// Returns the removed record; removing an absent id is a no-op
    pub fn remove_peer(&mut self, id: &PeerId) -> Option<Peer> {
        self.peers.remove(id)
    }

    pub fn get(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }
}
