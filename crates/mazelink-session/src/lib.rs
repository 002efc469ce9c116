//! Maze session engine for mazelink.
//!
//! This crate turns a line [`Connection`](mazelink_transport::Connection)
//! into a typed game session:
//!
//! 1. **Handshake** — `USER`, `LEVL`, optional `WAIT`, then the board
//!    dimensions ([`MazeSession::establish`], [`MazeSession::connect`])
//! 2. **Queries** — player position, single tiles, full-board snapshots
//!    ([`Board`])
//! 3. **Moves** — `MOVE` with the configured direction alphabet, soft
//!    rejections kept in [`MazeSession::last_error`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Your walker / bot (above)  ← calls move_player() in a loop
//!     ↕
//! Session Layer (this crate)  ← handshake, classification, bookkeeping
//!     ↕
//! Protocol Layer (below)  ← Command, Response, ProtocolProfile
//!     ↕
//! Transport Layer (below)  ← newline framing over TCP
//! ```

mod board;
mod config;
mod error;
mod session;

pub use board::Board;
pub use config::{SessionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::SessionError;
pub use session::{MazeSession, SessionState};
