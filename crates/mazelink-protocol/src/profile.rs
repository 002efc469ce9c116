//! Directions and protocol profiles.
//!
//! Two generations of the maze server are in the wild. They agree on the
//! command set but disagree on details:
//!
//! - which letters a `MOVE` takes (`w s a d` or `W S A D`), and
//! - whether the second handshake command is spelled `LEVL` or `LEVEL`.
//!
//! Neither is inferred at runtime. A [`ProtocolProfile`] states both
//! explicitly and lives in the session configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four ways a player can move.
///
/// This is the logical direction. The character that goes on the wire is
/// chosen by a [`DirectionAlphabet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in `up, down, left, right` order.
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Returns the direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the `(dx, dy)` step for this direction. `y` grows downwards,
    /// `x` grows to the right.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Parses `"up"`, `"down"`, `"left"` or `"right"` (any case).
impl FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(ProtocolError::InvalidArgument(format!(
                "unknown direction {s:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DirectionAlphabet
// ---------------------------------------------------------------------------

/// Maps logical directions to the characters sent in `MOVE`.
///
/// The mapping is case-significant: `w` and `W` are different keys to the
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionAlphabet {
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
}

impl DirectionAlphabet {
    /// `w s a d` — the default.
    pub const LOWERCASE: Self = Self {
        up: 'w',
        down: 's',
        left: 'a',
        right: 'd',
    };

    /// `W S A D`.
    pub const UPPERCASE: Self = Self {
        up: 'W',
        down: 'S',
        left: 'A',
        right: 'D',
    };

    /// Returns the wire character for `direction`.
    pub fn key(&self, direction: Direction) -> char {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Returns the direction bound to `key`, if any. Exact match only.
    pub fn direction(&self, key: char) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.key(*d) == key)
    }
}

impl Default for DirectionAlphabet {
    fn default() -> Self {
        Self::LOWERCASE
    }
}

// ---------------------------------------------------------------------------
// LevelKeyword
// ---------------------------------------------------------------------------

/// Spelling of the second handshake command.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelKeyword {
    /// `LEVL <code>` — what current servers expect.
    #[default]
    Levl,
    /// `LEVEL <code>`.
    Level,
}

impl LevelKeyword {
    /// Returns the command word as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Levl => "LEVL",
            Self::Level => "LEVEL",
        }
    }
}

impl fmt::Display for LevelKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProtocolProfile
// ---------------------------------------------------------------------------

/// The per-server-generation details of the protocol.
///
/// `#[serde(default)]` lets a config file mention only the field it wants
/// to change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(default)]
pub struct ProtocolProfile {
    /// How the level is selected during the handshake.
    pub level_keyword: LevelKeyword,
    /// Which characters `MOVE` takes.
    pub directions: DirectionAlphabet,
}

impl ProtocolProfile {
    /// `LEVL` + `w s a d`.
    pub const fn standard() -> Self {
        Self {
            level_keyword: LevelKeyword::Levl,
            directions: DirectionAlphabet::LOWERCASE,
        }
    }

    /// `LEVL` + `W S A D`.
    pub const fn uppercase() -> Self {
        Self {
            level_keyword: LevelKeyword::Levl,
            directions: DirectionAlphabet::UPPERCASE,
        }
    }

    /// `LEVEL` + `w s a d`, the older spelling of the level command.
    pub const fn legacy() -> Self {
        Self {
            level_keyword: LevelKeyword::Level,
            directions: DirectionAlphabet::LOWERCASE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_keys() {
        let lower = DirectionAlphabet::LOWERCASE;
        assert_eq!(lower.key(Direction::Up), 'w');
        assert_eq!(lower.key(Direction::Right), 'd');
        let upper = DirectionAlphabet::UPPERCASE;
        assert_eq!(upper.key(Direction::Down), 'S');
        assert_eq!(upper.key(Direction::Left), 'A');
    }

    #[test]
    fn test_alphabet_lookup_is_case_significant() {
        let lower = DirectionAlphabet::LOWERCASE;
        assert_eq!(lower.direction('w'), Some(Direction::Up));
        assert_eq!(lower.direction('W'), None);
        assert_eq!(DirectionAlphabet::UPPERCASE.direction('W'), Some(Direction::Up));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_opposite_and_delta() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            let (ox, oy) = d.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0), "{d}");
        }
    }

    #[test]
    fn test_default_profile_is_standard() {
        assert_eq!(ProtocolProfile::default(), ProtocolProfile::standard());
        assert_eq!(ProtocolProfile::standard().level_keyword.as_str(), "LEVL");
    }

    #[test]
    fn test_legacy_profile_spells_out_level() {
        let legacy = ProtocolProfile::legacy();
        assert_eq!(legacy.level_keyword.as_str(), "LEVEL");
        assert_eq!(legacy.directions, DirectionAlphabet::LOWERCASE);
        assert_ne!(legacy, ProtocolProfile::standard());
    }

    #[test]
    fn test_level_keyword_json_format() {
        let json = serde_json::to_value(LevelKeyword::Level).unwrap();
        assert_eq!(json, serde_json::json!("LEVEL"));
    }

    #[test]
    fn test_profile_partial_json_uses_defaults() {
        // Only the alphabet is given; the keyword falls back to LEVL.
        let json = r#"{ "directions": { "up": "W", "down": "S", "left": "A", "right": "D" } }"#;
        let profile: ProtocolProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile, ProtocolProfile::uppercase());
    }
}
