//! Gridshot - raycast FPS core
//!
//! Two halves live in this crate:
//! - A software DDA raycasting renderer plus the single-player game
//!   simulation it draws (`world`, `render`, `game`, `net`).
//! - An authoritative multiplayer room server (`server`, `ws`, `http`),
//!   the sole writer of remote player and item state.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod net;
pub mod render;
pub mod server;
pub mod util;
pub mod world;
pub mod ws;
