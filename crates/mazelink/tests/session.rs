//! End-to-end tests: a real `MazeSession` over TCP against a scripted server.

use std::time::Duration;

use mazelink::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// =========================================================================
// Fixture server
// =========================================================================

/// One step of a server script: the line the client must send and the
/// reply the server writes back (terminator included).
type Step = (&'static str, &'static str);

const HANDSHAKE: [Step; 4] = [
    ("USER alice", "DONE\n"),
    ("LEVL lvl1", "DONE\n"),
    ("GETW", "DATA 5\n"),
    ("GETH", "DATA 3\n"),
];

const MAZE: &str = "DATA 0 0 0 1 1 0 0 1 1 0 0 0 1 1 0\n";

/// Starts a one-connection server on a random port that plays `script`.
///
/// After the script the server keeps reading until the client hangs up and
/// returns whatever extra lines it received, so tests can assert that a
/// closed session sends nothing.
async fn serve(script: Vec<Step>, hang_up_after: bool) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("should accept");
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        for (expected, reply) in script {
            let line = lines.next_line().await.unwrap().expect("client hung up early");
            assert_eq!(line, expected);
            write.write_all(reply.as_bytes()).await.unwrap();
        }

        if hang_up_after {
            return Vec::new();
        }

        let mut extra = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            extra.push(line);
        }
        extra
    });

    (port, handle)
}

fn script(rest: &[Step]) -> Vec<Step> {
    HANDSHAKE.iter().chain(rest).copied().collect()
}

fn config(port: u16) -> SessionConfig {
    SessionConfig::new("alice", "lvl1")
        .with_host("127.0.0.1")
        .with_port(port)
        .with_wait(false)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_handshake_and_full_board() {
    let (port, server) = serve(script(&[("MAZE", MAZE)]), false).await;

    let mut session = mazelink::connect(config(port)).await.expect("should connect");
    assert_eq!(session.width(), 5);
    assert_eq!(session.height(), 3);
    assert_eq!(session.state(), &SessionState::Ready);

    let board = session.all_tiles().await.unwrap();
    assert_eq!(board[1][2], 0);
    assert_eq!(board[3][1], 1);
    assert_eq!(
        board.to_row_major(),
        [0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0]
    );

    session.close().await;
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wall_then_successful_move() {
    let (port, server) = serve(
        script(&[("MOVE w", "NOPE zed\n"), ("MOVE s", "DONE\n")]),
        false,
    )
    .await;

    let mut session = mazelink::connect(config(port)).await.unwrap();

    assert!(!session.move_player(Direction::Up).await.unwrap());
    assert_eq!(session.last_error(), Some("zed"));

    assert!(session.move_player(Direction::Down).await.unwrap());
    assert_eq!(session.last_error(), None);

    session.close().await;
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_over_ends_session_without_further_io() {
    let (port, server) = serve(
        script(&[("GETX", "OVER server shutting down\n")]),
        false,
    )
    .await;

    let mut session = mazelink::connect(config(port)).await.unwrap();

    let err = session.player_x().await.unwrap_err();
    assert_eq!(err.reason(), Some("server shutting down"));
    assert!(session.is_closed());

    for _ in 0..3 {
        let err = session.move_player(Direction::Left).await.unwrap_err();
        assert!(matches!(err, SessionError::Terminated { .. }));
    }
    let err = session.all_tiles().await.unwrap_err();
    assert!(matches!(err, SessionError::Terminated { .. }));

    // The client hung up right after OVER; nothing else reached the server.
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_crlf_server() {
    let (port, server) = serve(
        vec![
            ("USER alice", "DONE\r\n"),
            ("LEVL lvl1", "DONE\r\n"),
            ("GETW", "DATA 2\r\n"),
            ("GETH", "DATA 1\r\n"),
            ("WHAT 1 0", "DATA 9\r\n"),
        ],
        false,
    )
    .await;

    let mut session = mazelink::connect(config(port)).await.unwrap();
    assert_eq!(session.width(), 2);
    assert_eq!(session.tile_value(1, 0).await.unwrap(), 9);

    session.close().await;
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uppercase_profile_over_tcp() {
    let (port, server) = serve(
        vec![
            ("USER alice", "DONE\n"),
            ("LEVL lvl1", "DONE\n"),
            ("WAIT", "DONE\n"),
            ("GETW", "DATA 1\n"),
            ("GETH", "DATA 1\n"),
            ("MOVE D", "OVER You won\n"),
        ],
        false,
    )
    .await;

    let config = config(port)
        .with_wait(true)
        .with_profile(ProtocolProfile::uppercase());
    let mut session = mazelink::connect(config).await.unwrap();

    let err = session.move_player(Direction::Right).await.unwrap_err();
    assert_eq!(err.reason(), Some("You won"));
    assert_eq!(session.last_error(), Some("You won"));

    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_fails_handshake() {
    let (port, server) = serve(
        vec![("USER alice", "OVER Tento uzivatel neexistuje.\n")],
        false,
    )
    .await;

    let err = mazelink::connect(config(port)).await.unwrap_err();
    assert_eq!(err.termination_reason(), Some("Tento uzivatel neexistuje."));
    assert!(err.is_fatal());
    assert!(server.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_hangup_mid_session() {
    let (port, server) = serve(script(&[]), true).await;

    let mut session = mazelink::connect(config(port)).await.unwrap();
    server.await.unwrap();

    let err = session.player_y().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = mazelink::connect(config(port)).await.unwrap_err();
    assert!(matches!(
        err,
        MazelinkError::Session(SessionError::Transport(
            TransportError::ConnectFailed { .. }
        ))
    ));
}

#[tokio::test]
async fn test_external_timeout_on_wait() {
    // The server never answers WAIT, as when no viewer shows up.
    let (port, _server) = serve(
        vec![("USER alice", "DONE\n"), ("LEVL lvl1", "DONE\n")],
        false,
    )
    .await;

    let pending = mazelink::connect(config(port).with_wait(true));
    let result = tokio::time::timeout(Duration::from_millis(200), pending).await;
    assert!(result.is_err(), "handshake should still be waiting");
}

#[tokio::test]
async fn test_close_handle_aborts_pending_query() {
    // The server reads GETX but never answers it.
    let (port, server) = serve(script(&[]), false).await;

    let mut session = mazelink::connect(config(port)).await.unwrap();
    let handle = session.connection().close_handle();
    let closer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.close();
    });

    let err = session.player_x().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Transport(TransportError::ConnectionClosed(_))
    ));
    assert!(session.is_closed());
    closer.await.unwrap();

    let err = session.player_y().await.unwrap_err();
    assert!(matches!(err, SessionError::Terminated { .. }));

    // Only the abandoned GETX reached the server.
    assert_eq!(server.await.unwrap(), ["GETX"]);
}

#[tokio::test]
async fn test_replies_trickled_one_byte_at_a_time() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        for (expected, reply) in script(&[("MAZE", MAZE)]) {
            assert_eq!(lines.next_line().await.unwrap().unwrap(), expected);
            for byte in reply.as_bytes() {
                write.write_all(&[*byte]).await.unwrap();
                write.flush().await.unwrap();
            }
        }
        // Wait for the client to hang up.
        while let Ok(Some(_)) = lines.next_line().await {}
    });

    let mut session = mazelink::connect(config(port)).await.unwrap();
    assert_eq!((session.width(), session.height()), (5, 3));

    let board = session.all_tiles().await.unwrap();
    assert_eq!(board[1][2], 0);
    assert_eq!(
        board.to_row_major(),
        [0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0]
    );

    session.close().await;
    server.await.unwrap();
}
