// src/lib.rs

//! Real-time broadcast chat service.
//!
//! Clients open a websocket with a nickname, receive a replay of the last ten
//! minutes of messages, and every text message they send is fanned out to all
//! connected clients (themselves included). The archive is periodically
//! snapshotted to a JSON file and restored from it at startup.

pub mod archive;
pub mod broadcast;
pub mod channel;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod state;
pub mod websocket;

pub use state::AppState;
pub use websocket::router;
