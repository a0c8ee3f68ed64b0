//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams [`crate::domain::PuzzleEvent`]s, e.g.
//! to a minting service that reacts to correct attempts. Clients narrow
//! the stream per wallet with `?wallet=` or subscribe commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
