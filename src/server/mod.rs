//! Authoritative room server
//!
//! Each room is owned by a single tokio task that holds its state and
//! processes commands from a mpsc queue; outgoing events fan out over a
//! broadcast channel and are filtered per session by recipient. One-shot
//! timers (respawn, item expiry) are spawned sleeps that send a command
//! back into the owning task and re-validate on arrival.

pub mod registry;
pub mod room;

pub use registry::{RoomHandle, RoomRegistry, RoomStats};
pub use room::{Recipient, Room, RoomCmd, RoomEvent, RoomState};
