//! Wire protocol for mazelink.
//!
//! This crate defines the "language" that the client and the maze server
//! speak, independent of any socket:
//!
//! - **Commands** ([`Command`]) — the request lines the client sends.
//! - **Responses** ([`Response`]) — the four classes every reply line
//!   falls into (`DONE`, `DATA`, `NOPE`, `OVER`).
//! - **Profiles** ([`ProtocolProfile`], [`DirectionAlphabet`],
//!   [`LevelKeyword`]) — the details that differ between server
//!   generations.
//! - **Errors** ([`ProtocolError`]) — what can go wrong when text does not
//!   match the protocol.
//!
//! # Architecture
//!
//! ```text
//! Transport (lines) → Protocol (Command / Response) → Session (typed operations)
//! ```

mod command;
mod error;
mod profile;
mod response;

pub use command::Command;
pub use error::ProtocolError;
pub use profile::{Direction, DirectionAlphabet, LevelKeyword, ProtocolProfile};
pub use response::{parse_int, parse_ints, parse_single_int, Response};
