//! The session engine: one level-bound connection to the maze server.
//!
//! A session drives the fixed handshake, then turns each typed operation
//! into one request line and exactly one classified response.
//!
//! ```text
//!   establish() ── USER ─ LEVL ─ [WAIT] ─ GETW ─ GETH ──→ Ready
//!        │                                                  │  ⟲ GETX GETY WHAT MAZE MOVE ...
//!        ▼                                                  ▼
//!     (error: socket closed, nothing returned)           Closed  (OVER, hangup, garbage, close())
//! ```

use mazelink_protocol::{
    parse_ints, parse_single_int, Command, Direction, ProtocolError,
    ProtocolProfile, Response,
};
use mazelink_transport::{Connection, ConnectionId, TcpFramer};

use crate::{Board, SessionConfig, SessionError};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
///   Handshaking ──(handshake ok)──→ Ready ──(fatal)──→ Closed
///        │                                               ↑
///        └──────────────(handshake fails)────────────────┘
/// ```
///
/// `Closed` is terminal. Once there, every operation fails with
/// [`SessionError::Terminated`] without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `USER`/`LEVL`/`WAIT` and the dimension queries are in progress.
    Handshaking,

    /// Accepting commands.
    Ready,

    /// The socket has been released. `reason` says why.
    Closed { reason: String },
}

const CLOSED_BY_CLIENT: &str = "closed by client";

// ---------------------------------------------------------------------------
// MazeSession
// ---------------------------------------------------------------------------

/// A connected, handshaken maze session.
///
/// Generic over the [`Connection`] so that the engine runs unchanged over
/// TCP ([`MazeSession::connect`]) or any other line transport
/// ([`MazeSession::establish`]).
///
/// # One request at a time
///
/// The protocol has no request identifiers: a response can only be matched
/// to its request by order. Every operation therefore takes `&mut self`
/// and does not return until its response has been read, so two requests
/// on one session can never be in flight together.
///
/// # Errors and session lifetime
///
/// | Server says | Result | Session afterwards |
/// |---|---|---|
/// | `DONE` / `DATA` | `Ok(..)` | Ready |
/// | `NOPE` to `MOVE` | `Ok(false)`, [`last_error`](Self::last_error) set | Ready |
/// | `NOPE` to a query | `Err(Rejected)` | Ready |
/// | `OVER` | `Err(Terminated)` | Closed |
/// | wrong class / bad payload / garbage | `Err(Protocol)` | Closed |
/// | hangup / I/O error | `Err(Transport)` | Closed |
pub struct MazeSession<C: Connection> {
    conn: C,
    config: SessionConfig,
    state: SessionState,
    width: usize,
    height: usize,
    last_error: Option<String>,
}

impl MazeSession<TcpFramer> {
    /// Connects to `config.host:config.port` and runs the handshake.
    ///
    /// # Errors
    /// Fails with [`SessionError::Transport`] if the connection cannot be
    /// established, and with any handshake error from
    /// [`establish`](Self::establish).
    pub async fn connect(config: SessionConfig) -> Result<Self, SessionError> {
        let conn = TcpFramer::open(&config.host, config.port).await?;
        Self::establish(conn, config).await
    }
}

impl<C: Connection> MazeSession<C> {
    /// Runs the handshake over an already open connection.
    ///
    /// Sends `USER`, the level command, `WAIT` if `config.wait` is set, and
    /// then `GETW` and `GETH`. Any answer other than the expected one
    /// aborts the handshake; the connection is closed before the error is
    /// returned, so nothing leaks.
    ///
    /// # Errors
    /// - [`SessionError::Rejected`] — the server said `NOPE` to a
    ///   handshake step
    /// - [`SessionError::Terminated`] — the server said `OVER` (unknown
    ///   user, unknown level, ...)
    /// - [`SessionError::Protocol`] / [`SessionError::Transport`] —
    ///   malformed answer or broken connection
    pub async fn establish(
        conn: C,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            conn,
            config,
            state: SessionState::Handshaking,
            width: 0,
            height: 0,
            last_error: None,
        };

        match session.handshake().await {
            Ok(()) => {
                session.state = SessionState::Ready;
                tracing::info!(
                    id = %session.conn.id(),
                    username = %session.config.username,
                    level = %session.config.level,
                    width = session.width,
                    height = session.height,
                    "session ready"
                );
                Ok(session)
            }
            Err(e) => {
                tracing::debug!(
                    id = %session.conn.id(),
                    error = %e,
                    "handshake failed"
                );
                session.shutdown(format!("handshake failed: {e}")).await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), SessionError> {
        let user = Command::User(self.config.username.clone());
        self.expect_done(user).await?;

        let level = Command::Level {
            keyword: self.config.profile.level_keyword,
            code: self.config.level.clone(),
        };
        self.expect_done(level).await?;

        if self.config.wait {
            tracing::debug!(id = %self.conn.id(), "waiting for viewer");
            self.expect_done(Command::Wait).await?;
        }

        self.width = self.query_dimension(Command::GetWidth).await?;
        self.height = self.query_dimension(Command::GetHeight).await?;
        Ok(())
    }

    // -- Accessors --

    /// Board width, queried once during the handshake.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height, queried once during the handshake.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `NOPE` reason of the most recent move, or `None` if it
    /// succeeded (or no move has been made yet).
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` once the session has been closed for any reason.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed { .. })
    }

    /// The username this session logged in as.
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// The level code this session is bound to.
    pub fn level(&self) -> &str {
        &self.config.level
    }

    /// The protocol profile in use.
    pub fn profile(&self) -> &ProtocolProfile {
        &self.config.profile
    }

    /// Identifier of the underlying connection, as it appears in logs.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Borrow the underlying connection, e.g. to grab a close handle.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    // -- Queries --

    /// `GETX` — the player's column.
    pub async fn player_x(&mut self) -> Result<i32, SessionError> {
        self.query_int(Command::GetX).await
    }

    /// `GETY` — the player's row.
    pub async fn player_y(&mut self) -> Result<i32, SessionError> {
        self.query_int(Command::GetY).await
    }

    /// `GETX` then `GETY`.
    pub async fn position(&mut self) -> Result<(i32, i32), SessionError> {
        let x = self.player_x().await?;
        let y = self.player_y().await?;
        Ok((x, y))
    }

    /// `WHAT x y` — the value of one tile.
    ///
    /// Out-of-board coordinates are answered with `NOPE`, which comes back
    /// as [`SessionError::Rejected`].
    pub async fn tile_value(&mut self, x: i32, y: i32) -> Result<i32, SessionError> {
        self.query_int(Command::What { x, y }).await
    }

    /// `MAZE` — a fresh snapshot of the whole board.
    ///
    /// Levels that hide the board answer `NOPE`, returned as
    /// [`SessionError::Rejected`].
    pub async fn all_tiles(&mut self) -> Result<Board, SessionError> {
        let command = Command::Maze;
        match self.exchange(&command).await? {
            Response::Data(tokens) => {
                let board = parse_ints(&tokens).and_then(|values| {
                    Board::from_row_major(self.width, self.height, &values)
                });
                match board {
                    Ok(board) => Ok(board),
                    Err(e) => Err(self.violation(e).await),
                }
            }
            Response::Nope(reason) => Err(SessionError::Rejected(reason)),
            other => Err(self.unexpected(&command, &other).await),
        }
    }

    // -- Moves --

    /// `MOVE <key>` for `direction`, using the profile's alphabet.
    ///
    /// Returns `Ok(true)` on `DONE` and clears
    /// [`last_error`](Self::last_error); returns `Ok(false)` on `NOPE` and
    /// stores the reason there. A `NOPE` is an ordinary game outcome (a
    /// wall, not enough of something) and leaves the session usable.
    pub async fn move_player(
        &mut self,
        direction: Direction,
    ) -> Result<bool, SessionError> {
        let key = self.config.profile.directions.key(direction);
        self.move_key(key).await
    }

    /// `MOVE <key>` with an arbitrary key.
    ///
    /// Some levels accept keys beyond the four directions. Keys are
    /// case-significant. Same result handling as
    /// [`move_player`](Self::move_player).
    pub async fn move_key(&mut self, key: char) -> Result<bool, SessionError> {
        let command = Command::Move(key);
        let response = match self.exchange(&command).await {
            Ok(response) => response,
            Err(SessionError::Terminated { reason }) => {
                self.last_error = Some(reason.clone());
                return Err(SessionError::Terminated { reason });
            }
            Err(e) => return Err(e),
        };

        match response {
            Response::Done => {
                self.last_error = None;
                Ok(true)
            }
            Response::Nope(reason) => {
                tracing::debug!(id = %self.conn.id(), %key, %reason, "move rejected");
                self.last_error = Some(reason);
                Ok(false)
            }
            other => Err(self.unexpected(&command, &other).await),
        }
    }

    // -- Passthrough --

    /// Sends one free-form command line and returns the classified answer.
    ///
    /// `DONE`, `DATA` and `NOPE` are returned as-is. `OVER` and
    /// unrecognised lines still close the session and come back as errors.
    pub async fn command(&mut self, line: &str) -> Result<Response, SessionError> {
        self.exchange(&Command::Raw(line.to_owned())).await
    }

    // -- Lifecycle --

    /// Closes the session and releases the socket. Safe to call repeatedly.
    pub async fn close(&mut self) {
        self.shutdown(CLOSED_BY_CLIENT.to_owned()).await;
    }

    // -- Internals --

    /// Sends one command and classifies one response.
    ///
    /// Handles everything that is fatal regardless of the command: a closed
    /// session, transport failures, unrecognised lines and `OVER`.
    async fn exchange(&mut self, command: &Command) -> Result<Response, SessionError> {
        if let SessionState::Closed { reason } = &self.state {
            return Err(SessionError::Terminated {
                reason: reason.clone(),
            });
        }

        // Encoding errors happen before anything is written, so the stream
        // is still in sync and the session stays open.
        let line = command.encode()?;

        match self.round_trip(&line).await {
            Ok(Response::Over(reason)) => {
                tracing::warn!(
                    id = %self.conn.id(),
                    command = command.keyword(),
                    %reason,
                    "server ended the session"
                );
                self.shutdown(reason.clone()).await;
                Err(SessionError::Terminated { reason })
            }
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!(
                    id = %self.conn.id(),
                    command = command.keyword(),
                    error = %e,
                    "session failed"
                );
                self.shutdown(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn round_trip(&mut self, line: &str) -> Result<Response, SessionError> {
        self.conn.send_line(line).await?;
        let reply = self.conn.recv_line().await?;
        let response = Response::parse(&reply)?;
        tracing::trace!(id = %self.conn.id(), kind = response.kind(), "classified response");
        Ok(response)
    }

    /// Expects `DONE`. Used for the handshake steps.
    async fn expect_done(&mut self, command: Command) -> Result<(), SessionError> {
        match self.exchange(&command).await? {
            Response::Done => Ok(()),
            Response::Nope(reason) => Err(SessionError::Rejected(reason)),
            other => Err(self.unexpected(&command, &other).await),
        }
    }

    /// Expects `DATA` with exactly one integer.
    async fn query_int(&mut self, command: Command) -> Result<i32, SessionError> {
        match self.exchange(&command).await? {
            Response::Data(tokens) => match parse_single_int(&tokens) {
                Ok(value) => Ok(value),
                Err(e) => Err(self.violation(e).await),
            },
            Response::Nope(reason) => Err(SessionError::Rejected(reason)),
            other => Err(self.unexpected(&command, &other).await),
        }
    }

    /// Like [`query_int`](Self::query_int) but the value must be a valid
    /// board dimension.
    async fn query_dimension(&mut self, command: Command) -> Result<usize, SessionError> {
        let value = self.query_int(command).await?;
        match usize::try_from(value) {
            Ok(dimension) => Ok(dimension),
            Err(_) => Err(self
                .violation(ProtocolError::InvalidPayload(format!(
                    "negative board dimension {value}"
                )))
                .await),
        }
    }

    /// A response of the wrong class for `command`. Closes the session.
    async fn unexpected(&mut self, command: &Command, response: &Response) -> SessionError {
        self.violation(ProtocolError::UnexpectedResponse {
            command: command.keyword().to_owned(),
            response: response.to_string(),
        })
        .await
    }

    /// Closes the session over a protocol violation and returns the error.
    async fn violation(&mut self, error: ProtocolError) -> SessionError {
        tracing::warn!(id = %self.conn.id(), error = %error, "protocol violation");
        self.shutdown(error.to_string()).await;
        SessionError::Protocol(error)
    }

    /// Moves to `Closed` (keeping the first reason) and releases the
    /// connection.
    async fn shutdown(&mut self, reason: String) {
        if !self.is_closed() {
            tracing::debug!(id = %self.conn.id(), %reason, "closing session");
            self.state = SessionState::Closed { reason };
        }
        self.conn.close().await;
    }
}

impl<C: Connection> std::fmt::Debug for MazeSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MazeSession")
            .field("id", &self.conn.id())
            .field("username", &self.config.username)
            .field("level", &self.config.level)
            .field("state", &self.state)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("last_error", &self.last_error)
            .finish()
    }
}
