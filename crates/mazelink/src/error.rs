//! Unified error type for mazelink.

use mazelink_protocol::ProtocolError;
use mazelink_session::SessionError;
use mazelink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Code that uses only the `mazelink` crate can propagate any layer's error
/// with `?` and match on this one type.
#[derive(Debug, thiserror::Error)]
pub enum MazelinkError {
    /// Connecting, reading or writing failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Text on the wire did not match the protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session operation failed (rejected, terminated, or one of the
    /// above surfaced through the session).
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl MazelinkError {
    /// Returns `true` if the session that produced this error is unusable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Protocol(e) => !matches!(e, ProtocolError::InvalidArgument(_)),
            Self::Session(e) => e.is_fatal(),
        }
    }

    /// The server's reason if the session was ended with `OVER`.
    pub fn termination_reason(&self) -> Option<&str> {
        match self {
            Self::Session(SessionError::Terminated { reason }) => Some(reason),
            _ => None,
        }
    }
}
