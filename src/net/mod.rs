//! Client-side multiplayer plumbing
//!
//! `ServerConnection` is an explicitly constructed, session-owned service
//! object (no process-wide singleton); `RemoteWorld` merges authoritative
//! server deltas into the state the renderer reads each frame.

pub mod client;
pub mod subscribers;

pub use client::{RemoteItem, RemotePlayer, RemoteWorld, ServerConnection};
pub use subscribers::Subscribers;
