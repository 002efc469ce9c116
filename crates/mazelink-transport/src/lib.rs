//! Transport layer for mazelink.
//!
//! Turns a byte-oriented stream into a line-oriented message channel: every
//! message is one line of UTF-8 text terminated by `\n`. The [`Connection`]
//! trait is what the session layer talks to; [`LineFramer`] is the one
//! implementation, generic over any tokio stream.
//!
//! # Feature Flags
//!
//! - `tcp` (default) — [`LineFramer::open`] over `tokio::net::TcpStream`

#![allow(async_fn_in_trait)]

mod error;
mod framer;
#[cfg(feature = "tcp")]
mod tcp;

pub use error::TransportError;
pub use framer::{CloseHandle, LineFramer};
#[cfg(feature = "tcp")]
pub use tcp::TcpFramer;

use std::fmt;

/// Opaque identifier for a connection, used to tell connections apart in
/// logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection that exchanges newline-terminated text lines.
///
/// Exactly one request may be in flight at a time: the caller sends a line
/// and then receives the reply before sending again. Both methods take
/// `&mut self`, so the borrow checker rules out interleaved use.
pub trait Connection: Send {
    /// Sends one line, appending `\n` if it is missing.
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Receives the next line with its terminator stripped.
    ///
    /// Fails with [`TransportError::ConnectionClosed`] if the peer closes
    /// before a terminator arrives.
    async fn recv_line(&mut self) -> Result<String, TransportError>;

    /// Releases the underlying stream. Safe to call more than once.
    async fn close(&mut self);

    /// Returns `true` once the connection has been released.
    fn is_closed(&self) -> bool;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
