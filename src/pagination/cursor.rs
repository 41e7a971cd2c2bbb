use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Which way a cursor walks the descending result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    fn as_char(self) -> char {
        match self {
            Direction::Next => 'n',
            Direction::Prev => 'p',
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "n" => Ok(Direction::Next),
            "p" => Ok(Direction::Prev),
            other => Err(Error::InvalidCursorDirection(other.to_string())),
        }
    }
}

/// A direction plus the sort-key boundary of the page edge it points at.
/// Built transiently per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCursor {
    pub direction: Direction,
    pub boundary: String,
}

impl DecodedCursor {
    pub fn new(direction: Direction, boundary: impl Into<String>) -> Self {
        Self {
            direction,
            boundary: boundary.into(),
        }
    }

    /// Encodes as base64url("<direction>|<boundary>").
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE.encode(format!("{}|{}", self.direction.as_char(), self.boundary))
    }

    /// Decodes an opaque cursor string. The boundary itself contains the
    /// delimiter, so only the first `|` separates direction from boundary.
    /// Fails closed: anything not shaped like a valid cursor is rejected
    /// whole, never partially.
    pub fn decode(encoded: &str) -> Result<Self> {
        let raw = URL_SAFE.decode(encoded).map_err(|_| Error::InvalidCursor)?;
        let text = String::from_utf8(raw).map_err(|_| Error::InvalidCursor)?;
        let (direction, boundary) = text.split_once('|').ok_or(Error::InvalidCursor)?;
        if boundary.is_empty() {
            return Err(Error::InvalidCursor);
        }
        Ok(Self {
            direction: Direction::parse(direction)?,
            boundary: boundary.to_string(),
        })
    }
}

// Zero-padded to a fixed width; unpadded timestamps would break lexical
// ordering as the digit count grows.
const TIMESTAMP_WIDTH: usize = 16;

/// Formats the sort key of a row: `<padded-micros>|<id>`. Strictly
/// increasing across writes within an owner scope, with ties broken by the
/// fixed-length id; a unique index backs global uniqueness.
#[must_use]
pub fn sort_key(at: DateTime<Utc>, id: &str) -> String {
    format!(
        "{:0width$}|{}",
        at.timestamp_micros(),
        id,
        width = TIMESTAMP_WIDTH
    )
}
