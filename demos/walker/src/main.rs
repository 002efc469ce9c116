//! Interactive maze walker.
//!
//! Connects, prints the board geometry, then reads one command per line from
//! standard input:
//!
//! - `w` `a` `s` `d` (or `up` `left` `down` `right`) move one step
//! - any other single character is sent as a raw move key
//! - `back` steps the opposite way of the last successful move
//! - `map` prints the board, `pos` prints the player position
//! - `look` prints the position and the tiles next to it
//! - `quit` (or end of input) closes the session

use std::path::PathBuf;

use clap::Parser;
use mazelink::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "walker")]
#[command(about = "Walk a maze on a line-protocol maze server")]
struct Args {
    /// JSON file with a session config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Username sent with USER
    #[arg(short, long)]
    user: Option<String>,

    /// Level code
    #[arg(short, long)]
    level: Option<String>,

    /// Skip WAIT and start as soon as the level is loaded
    #[arg(long)]
    no_wait: bool,

    /// Send upper-case move keys (W S A D)
    #[arg(long)]
    uppercase: bool,

    /// Select the level with `LEVEL` instead of `LEVL`
    #[arg(long, conflicts_with = "uppercase")]
    legacy: bool,
}

impl Args {
    /// Builds the session config: file first, then flags.
    fn session_config(&self) -> Result<SessionConfig, Box<dyn std::error::Error>> {
        let mut config: SessionConfig = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => SessionConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(user) = &self.user {
            config.username = user.clone();
        }
        if let Some(level) = &self.level {
            config.level = level.clone();
        }
        if self.no_wait {
            config.wait = false;
        }
        if self.uppercase {
            config.profile = ProtocolProfile::uppercase();
        }
        if self.legacy {
            config.profile = ProtocolProfile::legacy();
        }

        if config.username.is_empty() || config.level.is_empty() {
            return Err("a username and a level are required (--user, --level)".into());
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Move(Direction),
    Key(char),
    Back,
    Map,
    Position,
    Look,
    Quit,
    Blank,
}

/// Parses one line of user input. Letter keys are read with the lower-case
/// alphabet whatever the session profile is; the profile only decides what
/// goes on the wire.
fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => return Input::Blank,
        "back" => return Input::Back,
        "map" => return Input::Map,
        "pos" => return Input::Position,
        "look" => return Input::Look,
        "quit" | "exit" => return Input::Quit,
        _ => {}
    }
    if let Ok(direction) = line.parse::<Direction>() {
        return Input::Move(direction);
    }

    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => DirectionAlphabet::LOWERCASE
            .direction(c.to_ascii_lowercase())
            .map_or(Input::Key(c), Input::Move),
        _ => Input::Blank,
    }
}

/// The tiles one step away from `(x, y)` in each direction. Off-board
/// neighbours are `None`.
fn neighbours(board: &Board, x: i32, y: i32) -> Vec<(Direction, Option<i32>)> {
    Direction::ALL
        .into_iter()
        .map(|direction| {
            let (dx, dy) = direction.delta();
            (direction, board.try_get(x + dx, y + dy))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().session_config()?;
    tracing::info!(
        addr = %config.addr(),
        user = %config.username,
        level = %config.level,
        "connecting"
    );

    let mut session = mazelink::connect(config).await?;
    println!("board is {}x{}", session.width(), session.height());
    print_board(&mut session).await?;

    // Last direction that actually moved the player, for `back`.
    let mut last_step: Option<Direction> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match parse_input(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Map => print_board(&mut session).await,
            Input::Position => session.position().await.map(|(x, y)| {
                println!("at ({x}, {y})");
            }),
            Input::Look => look(&mut session).await,
            Input::Move(direction) => walk(&mut session, direction, &mut last_step).await,
            Input::Back => match last_step {
                Some(direction) => walk(&mut session, direction.opposite(), &mut last_step).await,
                None => {
                    println!("nothing to step back from");
                    Ok(())
                }
            },
            Input::Key(key) => session.move_key(key).await.map(|moved| {
                if moved {
                    last_step = None;
                }
                report_blocked(&session, moved);
            }),
        };

        match outcome {
            Ok(()) => {}
            Err(SessionError::Terminated { reason }) => {
                println!("game over: {reason}");
                return Ok(());
            }
            Err(e) if !e.is_fatal() => println!("rejected: {e}"),
            Err(e) => return Err(e.into()),
        }
    }

    session.close().await;
    Ok(())
}

/// Moves one step and remembers the direction if the server accepted it.
async fn walk(
    session: &mut TcpSession,
    direction: Direction,
    last_step: &mut Option<Direction>,
) -> Result<(), SessionError> {
    let moved = session.move_player(direction).await?;
    if moved {
        *last_step = Some(direction);
    }
    report_blocked(session, moved);
    Ok(())
}

fn report_blocked(session: &TcpSession, moved: bool) {
    if !moved {
        println!("blocked: {}", session.last_error().unwrap_or("no reason given"));
    }
}

/// Prints the player position and the four neighbouring tiles.
async fn look(session: &mut TcpSession) -> Result<(), SessionError> {
    let (x, y) = session.position().await?;
    println!("at ({x}, {y})");
    match session.all_tiles().await {
        Ok(board) => {
            for (direction, tile) in neighbours(&board, x, y) {
                match tile {
                    Some(value) => println!("  {direction}: {value}"),
                    None => println!("  {direction}: edge"),
                }
            }
            Ok(())
        }
        Err(SessionError::Rejected(reason)) => {
            println!("board hidden: {reason}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Prints the board, or a note if this level keeps it hidden.
async fn print_board(session: &mut TcpSession) -> Result<(), SessionError> {
    match session.all_tiles().await {
        Ok(board) => {
            print!("{board}");
            Ok(())
        }
        Err(SessionError::Rejected(reason)) => {
            println!("board hidden: {reason}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
