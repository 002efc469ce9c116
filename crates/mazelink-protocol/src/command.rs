//! Outbound commands.
//!
//! Every command is one line: a four-letter (or, for `LEVEL`, five-letter)
//! upper-case word, optionally followed by a space and arguments. The
//! terminator is added by the transport, not here.

use std::fmt;

use crate::{LevelKeyword, ProtocolError};

/// A request the client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `USER <name>` — mandatory first command.
    User(String),

    /// `LEVL <code>` (or `LEVEL <code>`) — mandatory second command.
    Level { keyword: LevelKeyword, code: String },

    /// `WAIT` — blocks until a viewer attaches to the level.
    Wait,

    /// `GETW` — board width.
    GetWidth,

    /// `GETH` — board height.
    GetHeight,

    /// `GETX` — player column.
    GetX,

    /// `GETY` — player row.
    GetY,

    /// `WHAT <x> <y>` — value of one tile.
    What { x: i32, y: i32 },

    /// `MAZE` — every tile, flattened row by row.
    Maze,

    /// `MOVE <key>` — one step. The key is a single, case-significant
    /// character.
    Move(char),

    /// Any other line, sent as-is.
    Raw(String),
}

impl Command {
    /// Returns the command word, e.g. `"GETW"`. Used in logs and errors.
    pub fn keyword(&self) -> &str {
        match self {
            Self::User(_) => "USER",
            Self::Level { keyword, .. } => keyword.as_str(),
            Self::Wait => "WAIT",
            Self::GetWidth => "GETW",
            Self::GetHeight => "GETH",
            Self::GetX => "GETX",
            Self::GetY => "GETY",
            Self::What { .. } => "WHAT",
            Self::Maze => "MAZE",
            Self::Move(_) => "MOVE",
            Self::Raw(line) => line.split(' ').next().unwrap_or_default(),
        }
    }

    /// Produces the wire text for this command (without terminator).
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidArgument`] if an argument contains a
    /// line break, which would smuggle a second command onto the wire, or
    /// if a `USER`/`LEVL` argument is empty.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        match self {
            Self::User(name) => check_word("username", name)?,
            Self::Level { code, .. } => check_word("level code", code)?,
            Self::Move(key) if is_line_break(*key) => {
                return Err(ProtocolError::InvalidArgument(
                    "move key must not be a line break".into(),
                ));
            }
            Self::Raw(line) => {
                let body = line.strip_suffix('\n').unwrap_or(line);
                if body.contains(is_line_break) {
                    return Err(ProtocolError::InvalidArgument(
                        "raw command must be a single line".into(),
                    ));
                }
            }
            _ => {}
        }
        Ok(self.to_string())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) => write!(f, "USER {name}"),
            Self::Level { keyword, code } => write!(f, "{keyword} {code}"),
            Self::What { x, y } => write!(f, "WHAT {x} {y}"),
            Self::Move(key) => write!(f, "MOVE {key}"),
            Self::Raw(line) => f.write_str(line.strip_suffix('\n').unwrap_or(line)),
            other => f.write_str(other.keyword()),
        }
    }
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn check_word(what: &str, value: &str) -> Result<(), ProtocolError> {
    if value.is_empty() {
        return Err(ProtocolError::InvalidArgument(format!("{what} is empty")));
    }
    if value.contains(is_line_break) {
        return Err(ProtocolError::InvalidArgument(format!(
            "{what} contains a line break"
        )));
    }
    Ok(())
}
