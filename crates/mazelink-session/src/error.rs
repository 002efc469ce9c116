//! Error types for the session layer.

use mazelink_protocol::ProtocolError;
use mazelink_transport::TransportError;

/// Errors returned by [`MazeSession`](crate::MazeSession) operations.
///
/// The variants follow the protocol's failure model:
///
/// - [`Transport`](Self::Transport) and [`Protocol`](Self::Protocol) come
///   from the layers below and, apart from a rejected argument that never
///   reached the wire, close the session.
/// - [`Terminated`](Self::Terminated) means the server ended the session
///   with `OVER`, or the session was already closed when the call was made.
/// - [`Rejected`](Self::Rejected) is a `NOPE` answer to a query. The session
///   is still usable.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection failed (connect, send, receive, closed mid-line).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server's answer did not fit the protocol, or an argument could
    /// not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session is over. `reason` is the server's `OVER` text when there
    /// was one, otherwise a description of what closed it.
    #[error("session terminated: {reason}")]
    Terminated { reason: String },

    /// The server answered a query with `NOPE <reason>`.
    #[error("rejected by server: {0}")]
    Rejected(String),
}

impl SessionError {
    /// Returns `true` if the session that produced this error is closed.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Rejected(_) | Self::Protocol(ProtocolError::InvalidArgument(_))
        )
    }

    /// Returns the server-supplied reason for `OVER` and `NOPE` errors.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Terminated { reason } => Some(reason),
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_not_fatal() {
        let err = SessionError::Rejected("Tim smerem je zed.".into());
        assert!(!err.is_fatal());
        assert_eq!(err.reason(), Some("Tim smerem je zed."));
    }

    #[test]
    fn test_terminated_is_fatal() {
        let err = SessionError::Terminated {
            reason: "server shutting down".into(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("server shutting down"));
    }

    #[test]
    fn test_invalid_argument_is_not_fatal() {
        let err: SessionError =
            ProtocolError::InvalidArgument("username is empty".into()).into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_from_transport_error() {
        let err: SessionError =
            TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, SessionError::Transport(_)));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("gone"));
    }
}
