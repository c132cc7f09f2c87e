//! Matchmaking and signaling server for anonymous one-on-one video chat
//!
//! Peers connect over WebSocket, join a FIFO waiting line and are paired two
//! at a time into rooms. The server then relays the WebRTC negotiation
//! messages (offer, answer, ICE candidates) and text chat between the two
//! members of a room until one of them leaves or asks for someone new.
//!
//! # Protocol
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": {...}}`.
//!
//! ## Client → server
//!
//! - `join` `{"name"}` - Register and wait for a partner
//! - `find-next` - Leave the current room (if any) and wait again
//! - `offer` / `answer` `{"sdp", "roomId"}` - Relayed to the room partner
//! - `add-ice-candidate` `{"candidate", "roomId", "type"}` - Relayed to the room partner
//! - `chat-message` `{"message", "roomId"}` - Relayed to the room partner
//!
//! Closing the socket leaves the room and the server.
//!
//! ## Server → client
//!
//! - `send-offer` `{"roomId"}` - You were paired and must create the offer
//! - `offer` / `answer` / `add-ice-candidate` - Relayed from your partner, with `roomId`
//! - `chat-message` `{"message"}` - Relayed from your partner
//! - `peer-disconnected` `{}` - Your partner left; you are back in the queue
//!
//! Events naming an unknown room, sent by a peer outside the room, or
//! missing required fields are dropped without a reply.
//!
//! # Example
//!
//! ```bash
//! # Start the server
//! duet-signaling --port 3000 --allow-any-origin
//!
//! # Join with any WebSocket client
//! websocat ws://127.0.0.1:3000
//! {"event":"join","data":{"name":"alice"}}
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod handler;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod room;
pub mod router;
pub mod server;
pub mod state;

pub use config::{OriginPolicy, ServerConfig};
pub use error::{ClientRequestError, SignalingError};
pub use handle::{ChannelHandle, PeerHandle};
pub use protocol::{ClientEvent, PeerId, RoomId, ServerEvent};
pub use server::Server;
pub use state::ServerState;
