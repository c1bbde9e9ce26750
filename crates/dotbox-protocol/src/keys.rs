//! Grid coordinates and the string keys used to address lines and squares.
//!
//! The external document store keys its `lines` and `squares` maps by
//! plain strings, so every client has to produce *exactly* the same
//! string for the same line. Two rules make that work:
//!
//! - a [`Dot`] always prints as `"{row},{col}"`;
//! - a [`LineKey`] always stores its smaller endpoint first (row, then
//!   column), so `"0,1-0,0"` and `"0,0-0,1"` are the same line.
//!
//! Both key types serialize as those strings, which means a
//! `BTreeMap<LineKey, _>` becomes a JSON object with the expected keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Dot
// ---------------------------------------------------------------------------

/// A grid vertex at integer coordinate `(row, col)`.
///
/// The derived `Ord` compares `row` first, then `col`. Field order
/// matters here: it is what makes [`LineKey::between`] canonical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Dot {
    pub row: u32,
    pub col: u32,
}

impl Dot {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Dot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for Dot {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidKey(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            row: row.trim().parse().map_err(|_| invalid())?,
            col: col.trim().parse().map_err(|_| invalid())?,
        })
    }
}

// ---------------------------------------------------------------------------
// LineKey
// ---------------------------------------------------------------------------

/// Which way a line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Both endpoints share a row.
    Horizontal,
    /// Both endpoints share a column.
    Vertical,
}

/// Canonical identity of a line between two dots.
///
/// The fields are private so a `LineKey` can only be built through
/// [`LineKey::between`] or parsing, both of which put the smaller dot
/// first. Equality and hashing therefore never depend on which endpoint
/// a client happened to name first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineKey {
    start: Dot,
    end: Dot,
}

impl LineKey {
    /// Builds the key for the line between `a` and `b`, in either order.
    ///
    /// No adjacency check happens here; see `dotbox_rules::Grid::validate_line`
    /// for input coming from players.
    pub fn between(a: Dot, b: Dot) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// The lexicographically smaller endpoint.
    pub fn start(&self) -> Dot {
        self.start
    }

    /// The lexicographically larger endpoint.
    pub fn end(&self) -> Dot {
        self.end
    }

    /// Classifies the line, or `None` for a diagonal.
    pub fn orientation(&self) -> Option<Orientation> {
        if self.start.row == self.end.row {
            Some(Orientation::Horizontal)
        } else if self.start.col == self.end.col {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for LineKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| ProtocolError::InvalidKey(s.to_string()))?;
        Ok(Self::between(a.parse()?, b.parse()?))
    }
}

impl TryFrom<String> for LineKey {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LineKey> for String {
    fn from(key: LineKey) -> Self {
        key.to_string()
    }
}

// ---------------------------------------------------------------------------
// SquareKey
// ---------------------------------------------------------------------------

/// A box, identified by the row/column of its top-left dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SquareKey {
    pub row: u32,
    pub col: u32,
}

impl SquareKey {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// The dot at the square's top-left corner.
    pub fn top_left(&self) -> Dot {
        Dot::new(self.row, self.col)
    }
}

impl fmt::Display for SquareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for SquareKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dot: Dot = s.parse()?;
        Ok(Self::new(dot.row, dot.col))
    }
}

impl TryFrom<String> for SquareKey {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SquareKey> for String {
    fn from(key: SquareKey) -> Self {
        key.to_string()
    }
}
