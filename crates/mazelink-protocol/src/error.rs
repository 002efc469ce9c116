//! Error types for the protocol layer.
//!
//! Each crate in mazelink defines its own error enum. A `ProtocolError`
//! always means the text on the wire did not match the protocol, never that
//! the network failed (that is a `TransportError`) or that the game said no
//! (that is a `NOPE` response, which is data, not an error).

/// Errors that can occur in the protocol layer.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// each `#[error("...")]` attribute is the message shown when the error is
/// printed or logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A received line starts with none of `DONE`, `DATA `, `NOPE `,
    /// `OVER `.
    ///
    /// After this the byte stream can no longer be trusted to be in sync
    /// with our requests, so the session that saw it must be closed.
    #[error("unrecognized response: {0:?}")]
    UnrecognizedResponse(String),

    /// The response was well formed but of the wrong kind for the command
    /// that was sent, e.g. `DONE` in answer to `GETW`.
    #[error("unexpected response to {command}: {response:?}")]
    UnexpectedResponse { command: String, response: String },

    /// A `DATA` payload had the wrong number of tokens or a token that is
    /// not an integer.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A command argument cannot be put on the wire, e.g. a username that
    /// contains a line break.
    #[error("invalid command argument: {0}")]
    InvalidArgument(String),
}
