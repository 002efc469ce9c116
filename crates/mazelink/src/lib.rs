//! # Mazelink
//!
//! Client for line-based maze game servers.
//!
//! A player logs in with a username and a level code, then walks the maze one
//! `MOVE` at a time while querying its position and the board. Mazelink
//! handles the socket, the handshake and the response classification; the
//! walking strategy is yours.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mazelink::prelude::*;
//!
//! # async fn run() -> Result<(), MazelinkError> {
//! let config = SessionConfig::new("alice", "lvl1").with_wait(false);
//! let mut session = mazelink::connect(config).await?;
//!
//! let board = session.all_tiles().await?;
//! println!("{board}");
//!
//! if !session.move_player(Direction::Right).await? {
//!     println!("blocked: {:?}", session.last_error());
//! }
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::MazelinkError;

pub use mazelink_protocol as protocol;
pub use mazelink_session as session;
pub use mazelink_transport as transport;

use mazelink_session::{MazeSession, SessionConfig};
use mazelink_transport::TcpFramer;

/// A session over plain TCP, the usual way to talk to a maze server.
pub type TcpSession = MazeSession<TcpFramer>;

/// Opens a TCP connection to `config.host:config.port` and runs the
/// handshake.
///
/// Equivalent to [`MazeSession::connect`], with the error widened to
/// [`MazelinkError`].
pub async fn connect(config: SessionConfig) -> Result<TcpSession, MazelinkError> {
    tracing::debug!(addr = %config.addr(), user = %config.username, "connecting");
    Ok(MazeSession::connect(config).await?)
}

/// Everything needed to drive a session, in one import.
pub mod prelude {
    pub use crate::{connect, MazelinkError, TcpSession};

    pub use mazelink_protocol::{
        Command, Direction, DirectionAlphabet, LevelKeyword, ProtocolError,
        ProtocolProfile, Response,
    };
    pub use mazelink_session::{
        Board, MazeSession, SessionConfig, SessionError, SessionState,
        DEFAULT_HOST, DEFAULT_PORT,
    };
    pub use mazelink_transport::{
        CloseHandle, Connection, ConnectionId, LineFramer, TcpFramer,
        TransportError,
    };
}
