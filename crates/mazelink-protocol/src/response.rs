//! Classification of the lines the server sends back.
//!
//! Every request gets exactly one response line, and every response line
//! falls into one of four classes:
//!
//! ```text
//! DONE            → Response::Done              success, no payload
//! DATA <tok...>   → Response::Data(tokens)      success with payload
//! NOPE <reason>   → Response::Nope(reason)      soft rejection, keep going
//! OVER <reason>   → Response::Over(reason)      fatal, the session is over
//! anything else   → ProtocolError::UnrecognizedResponse
//! ```

use std::fmt;

use crate::ProtocolError;

const DONE: &str = "DONE";
const DATA_PREFIX: &str = "DATA ";
const NOPE_PREFIX: &str = "NOPE ";
const OVER_PREFIX: &str = "OVER ";

/// One classified server response.
///
/// Responses are never stored; the operation that sent the request
/// consumes the response immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `DONE` — the command succeeded and carries no payload.
    Done,

    /// `DATA <tok> <tok> ...` — the command succeeded; the payload is the
    /// rest of the line split on single spaces.
    Data(Vec<String>),

    /// `NOPE <reason>` — the server refused this one command, but the
    /// session continues. Walking into a wall is a `NOPE`.
    Nope(String),

    /// `OVER <reason>` — the session has ended (won, lost, timed out, or
    /// kicked for a protocol error). The server closes the socket after
    /// sending this.
    Over(String),
}

impl Response {
    /// Classifies one received line (without its terminator).
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnrecognizedResponse`] if the line matches
    /// none of the four classes.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        if line == DONE {
            return Ok(Self::Done);
        }
        if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            let tokens = rest.split(' ').map(str::to_owned).collect();
            return Ok(Self::Data(tokens));
        }
        if let Some(rest) = line.strip_prefix(NOPE_PREFIX) {
            return Ok(Self::Nope(rest.to_owned()));
        }
        if let Some(rest) = line.strip_prefix(OVER_PREFIX) {
            return Ok(Self::Over(rest.to_owned()));
        }
        Err(ProtocolError::UnrecognizedResponse(line.to_owned()))
    }

    /// Returns the four-letter class name, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Done => "DONE",
            Self::Data(_) => "DATA",
            Self::Nope(_) => "NOPE",
            Self::Over(_) => "OVER",
        }
    }
}

/// Formats the response back into its wire form (without terminator).
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str(DONE),
            Self::Data(tokens) => write!(f, "{DATA_PREFIX}{}", tokens.join(" ")),
            Self::Nope(reason) => write!(f, "{NOPE_PREFIX}{reason}"),
            Self::Over(reason) => write!(f, "{OVER_PREFIX}{reason}"),
        }
    }
}

/// Parses a single `DATA` token as an integer.
///
/// The server formats every value with C's `%d`, so `i32` holds all of
/// them.
pub fn parse_int(token: &str) -> Result<i32, ProtocolError> {
    token
        .parse()
        .map_err(|_| ProtocolError::InvalidPayload(format!("{token:?} is not an integer")))
}

/// Parses every token of a `DATA` payload as an integer.
pub fn parse_ints(tokens: &[String]) -> Result<Vec<i32>, ProtocolError> {
    tokens.iter().map(|t| parse_int(t)).collect()
}

/// Parses a payload that must consist of exactly one integer.
pub fn parse_single_int(tokens: &[String]) -> Result<i32, ProtocolError> {
    match tokens {
        [token] => parse_int(token),
        _ => Err(ProtocolError::InvalidPayload(format!(
            "expected 1 token, got {}",
            tokens.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Classification
    // =====================================================================

    #[test]
    fn test_parse_done() {
        assert_eq!(Response::parse("DONE").unwrap(), Response::Done);
    }

    #[test]
    fn test_parse_data_splits_on_single_spaces() {
        let r = Response::parse("DATA 0 1 12").unwrap();
        assert_eq!(r, Response::Data(vec!["0".into(), "1".into(), "12".into()]));
    }

    #[test]
    fn test_parse_nope_keeps_reason_verbatim() {
        let r = Response::parse("NOPE Tim smerem je zed.").unwrap();
        assert_eq!(r, Response::Nope("Tim smerem je zed.".into()));
    }

    #[test]
    fn test_parse_over() {
        let r = Response::parse("OVER server shutting down").unwrap();
        assert_eq!(r, Response::Over("server shutting down".into()));
        assert_eq!(r.kind(), "OVER");
    }

    #[test]
    fn test_done_must_match_exactly() {
        // Only the bare literal is DONE; anything longer is garbage.
        assert!(Response::parse("DONE ").is_err());
        assert!(Response::parse("DONEX").is_err());
        assert!(Response::parse("done").is_err());
    }

    #[test]
    fn test_prefix_without_space_is_unrecognized() {
        // "DATA" with no space is neither DATA nor DONE.
        let err = Response::parse("DATA").unwrap_err();
        assert_eq!(err, ProtocolError::UnrecognizedResponse("DATA".into()));
        assert!(Response::parse("NOPEwall").is_err());
        assert!(Response::parse("OVER").is_err());
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        assert!(matches!(
            Response::parse("HELLO there"),
            Err(ProtocolError::UnrecognizedResponse(_))
        ));
        assert!(Response::parse("").is_err());
    }

    #[test]
    fn test_display_reproduces_wire_form() {
        for line in ["DONE", "DATA 3 4", "NOPE wall", "OVER you won"] {
            assert_eq!(Response::parse(line).unwrap().to_string(), line);
        }
    }

    #[test]
    fn test_kind() {
        assert_eq!(Response::Done.kind(), "DONE");
        assert_eq!(Response::Data(vec![]).kind(), "DATA");
        assert_eq!(Response::Nope(String::new()).kind(), "NOPE");
        assert_eq!(Response::Over(String::new()).kind(), "OVER");
    }

    // =====================================================================
    // Payload parsing
    // =====================================================================

    #[test]
    fn test_parse_single_int() {
        assert_eq!(parse_single_int(&["5".into()]).unwrap(), 5);
        assert_eq!(parse_single_int(&["-1".into()]).unwrap(), -1);
    }

    #[test]
    fn test_parse_single_int_rejects_wrong_count() {
        assert!(parse_single_int(&[]).is_err());
        assert!(parse_single_int(&["1".into(), "2".into()]).is_err());
    }

    #[test]
    fn test_parse_ints_rejects_non_numbers() {
        let err = parse_ints(&["1".into(), "x".into()]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload(_)));
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn test_empty_data_payload_is_not_a_number() {
        // "DATA " yields one empty token, which must not parse as 0.
        let Response::Data(tokens) = Response::parse("DATA ").unwrap() else {
            panic!("expected DATA");
        };
        assert_eq!(tokens, vec![String::new()]);
        assert!(parse_single_int(&tokens).is_err());
    }
}
