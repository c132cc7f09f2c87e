//! Wire types exchanged between the signaling server and browser clients
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": {...}}`.
//! Negotiation blobs (`sdp`, `candidate`) are kept as raw JSON values and
//! are never inspected.

use crate::error::ClientRequestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Allocate a fresh random id for a newly accepted connection
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for PeerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Room identifier, the decimal form of a per-process counter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl From<u64> for RoomId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events a peer sends to the server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Join {
        name: String,
    },
    FindNext,
    ChatMessage {
        message: String,
        room_id: RoomId,
    },
    Offer {
        sdp: Value,
        room_id: RoomId,
    },
    Answer {
        sdp: Value,
        room_id: RoomId,
    },
    AddIceCandidate {
        candidate: Value,
        room_id: RoomId,
        /// Client-defined tag (`"sender"`/`"receiver"` in practice),
        /// forwarded untouched
        kind: Value,
    },
    /// Produced by the connection layer when the socket goes away, never
    /// parsed from the wire
    Disconnect,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::FindNext => "find-next",
            ClientEvent::ChatMessage { .. } => "chat-message",
            ClientEvent::Offer { .. } => "offer",
            ClientEvent::Answer { .. } => "answer",
            ClientEvent::AddIceCandidate { .. } => "add-ice-candidate",
            ClientEvent::Disconnect => "disconnect",
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct JoinPayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload {
    message: String,
    room_id: RoomId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdpPayload {
    sdp: Value,
    room_id: RoomId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePayload {
    candidate: Value,
    room_id: RoomId,
    #[serde(rename = "type")]
    kind: Value,
}

impl FromStr for ClientEvent {
    type Err = ClientRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Envelope { event, data } = serde_json::from_str(s)?;
        let event = match event.as_str() {
            "join" => {
                let JoinPayload { name } = serde_json::from_value(data)?;
                ClientEvent::Join { name }
            }
            "find-next" => ClientEvent::FindNext,
            "chat-message" => {
                let ChatPayload { message, room_id } = serde_json::from_value(data)?;
                ClientEvent::ChatMessage { message, room_id }
            }
            "offer" => {
                let SdpPayload { sdp, room_id } = serde_json::from_value(data)?;
                ClientEvent::Offer { sdp, room_id }
            }
            "answer" => {
                let SdpPayload { sdp, room_id } = serde_json::from_value(data)?;
                ClientEvent::Answer { sdp, room_id }
            }
            "add-ice-candidate" => {
                let CandidatePayload {
                    candidate,
                    room_id,
                    kind,
                } = serde_json::from_value(data)?;
                ClientEvent::AddIceCandidate {
                    candidate,
                    room_id,
                    kind,
                }
            }
            _ => return Err(ClientRequestError::UnknownEvent(event)),
        };
        Ok(event)
    }
}

/// Events the server sends to a peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// The receiver was chosen to start negotiation in a new room
    #[serde(rename_all = "camelCase")]
    SendOffer { room_id: RoomId },
    #[serde(rename_all = "camelCase")]
    Offer { sdp: Value, room_id: RoomId },
    #[serde(rename_all = "camelCase")]
    Answer { sdp: Value, room_id: RoomId },
    #[serde(rename_all = "camelCase")]
    AddIceCandidate {
        candidate: Value,
        #[serde(rename = "type")]
        kind: Value,
        room_id: RoomId,
    },
    ChatMessage { message: String },
    PeerDisconnected {},
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::SendOffer { .. } => "send-offer",
            ServerEvent::Offer { .. } => "offer",
            ServerEvent::Answer { .. } => "answer",
            ServerEvent::AddIceCandidate { .. } => "add-ice-candidate",
            ServerEvent::ChatMessage { .. } => "chat-message",
            ServerEvent::PeerDisconnected {} => "peer-disconnected",
        }
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
