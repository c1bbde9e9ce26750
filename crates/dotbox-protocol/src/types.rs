//! The match document and the deltas that keep it consistent.
//!
//! A [`Match`] is the aggregate that lives in the shared document store.
//! Clients never send a whole `Match` back; after each accepted move they
//! send a [`MatchUpdate`] describing only what changed, and every
//! participant receives full [`MatchSnapshot`]s through its subscription.
//!
//! Field names serialize in camelCase (`currentPlayer`, `gridSize`, ...)
//! because that is the shape of the documents in the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LineKey, ProtocolError, SquareKey};

/// Identifier of the built-in computer opponent.
pub const AI_PLAYER_ID: &str = "AI-Player";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Ids are opaque strings handed out by whatever identity layer the host
/// uses (`user_k3j9x0q2m`, `AI-Player`, ...). `#[serde(transparent)]`
/// keeps them plain strings on the wire so they can key JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The computer opponent's id.
    pub fn ai() -> Self {
        Self(AI_PLAYER_ID.to_string())
    }

    /// Returns `true` for the computer opponent.
    pub fn is_ai(&self) -> bool {
        self.0 == AI_PLAYER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A unique identifier for a match document in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Drawn lines, each mapped to the player who drew it.
pub type Lines = BTreeMap<LineKey, PlayerId>;

/// Completed squares, each mapped to the player credited with it.
pub type Squares = BTreeMap<SquareKey, PlayerId>;

/// Squares won per player.
pub type Scores = BTreeMap<PlayerId, u32>;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// ```text
/// Lobby → InProgress → Finished
/// ```
///
/// - **Lobby**: created, players may join, no lines drawn yet.
/// - **InProgress**: roster frozen, players take turns drawing lines.
/// - **Finished**: every square has been claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    #[default]
    Lobby,
    InProgress,
    Finished,
}

impl Lifecycle {
    /// The only state a lifecycle may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// The full match document.
///
/// `grid_size` counts boxes per side, so a match has
/// `grid_size * grid_size` squares to claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Turn order. Fixed once the match leaves the lobby.
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub player_names: BTreeMap<PlayerId, String>,
    #[serde(default)]
    pub player_colors: BTreeMap<PlayerId, String>,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub lines: Lines,
    #[serde(default)]
    pub squares: Squares,
    pub current_player: Option<PlayerId>,
    pub state: Lifecycle,
    /// Set when the match finishes with a single top scorer.
    pub winner: Option<PlayerId>,
    pub grid_size: u32,
}

impl Match {
    /// A fresh lobby with `creator` as its only player.
    pub fn new_lobby(creator: PlayerId, creator_name: impl Into<String>, grid_size: u32) -> Self {
        let mut player_names = BTreeMap::new();
        player_names.insert(creator.clone(), creator_name.into());
        Self {
            players: vec![creator],
            player_names,
            player_colors: BTreeMap::new(),
            scores: Scores::new(),
            lines: Lines::new(),
            squares: Squares::new(),
            current_player: None,
            state: Lifecycle::Lobby,
            winner: None,
            grid_size,
        }
    }

    /// Total squares on the board.
    ///
    /// Saturates rather than wrapping, so an oversized document can never
    /// look finished before any square is claimed.
    pub fn total_squares(&self) -> u32 {
        self.grid_size.saturating_mul(self.grid_size)
    }

    pub fn score_of(&self, player: &PlayerId) -> u32 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    /// Scores in roster order, with `0` for players who haven't scored.
    pub fn roster_scores(&self) -> Vec<(&PlayerId, u32)> {
        self.players
            .iter()
            .map(|p| (p, self.score_of(p)))
            .collect()
    }

    /// Applies a delta in place.
    ///
    /// Lines and squares are append-only: if the update names a line or
    /// square the document already has, nothing is changed and
    /// [`ProtocolError::Conflict`] is returned.
    pub fn apply(&mut self, update: &MatchUpdate) -> Result<(), ProtocolError> {
        if let Some(line) = update.lines.keys().find(|k| self.lines.contains_key(*k)) {
            return Err(ProtocolError::Conflict(format!("line {line}")));
        }
        if let Some(square) = update.squares.keys().find(|k| self.squares.contains_key(*k)) {
            return Err(ProtocolError::Conflict(format!("square {square}")));
        }

        for player in &update.players_joined {
            if !self.players.contains(player) {
                self.players.push(player.clone());
            }
        }
        self.player_names
            .extend(update.player_names.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.player_colors
            .extend(update.player_colors.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.lines
            .extend(update.lines.iter().map(|(k, v)| (*k, v.clone())));
        self.squares
            .extend(update.squares.iter().map(|(k, v)| (*k, v.clone())));
        for (player, increment) in &update.scores {
            *self.scores.entry(player.clone()).or_insert(0) += increment;
        }
        if let Some(current) = &update.current_player {
            self.current_player = Some(current.clone());
        }
        if let Some(state) = update.state {
            self.state = state;
        }
        if let Some(winner) = &update.winner {
            self.winner = Some(winner.clone());
        }
        Ok(())
    }

    /// Overlays a snapshot: present fields replace ours, absent ones are kept.
    pub fn overlay(&mut self, snapshot: MatchSnapshot) {
        let MatchSnapshot {
            players,
            player_names,
            player_colors,
            scores,
            lines,
            squares,
            current_player,
            state,
            winner,
            grid_size,
        } = snapshot;

        if let Some(v) = players {
            self.players = v;
        }
        if let Some(v) = player_names {
            self.player_names = v;
        }
        if let Some(v) = player_colors {
            self.player_colors = v;
        }
        if let Some(v) = scores {
            self.scores = v;
        }
        if let Some(v) = lines {
            self.lines = v;
        }
        if let Some(v) = squares {
            self.squares = v;
        }
        if let Some(v) = current_player {
            self.current_player = Some(v);
        }
        if let Some(v) = state {
            self.state = v;
        }
        if let Some(v) = winner {
            self.winner = Some(v);
        }
        if let Some(v) = grid_size {
            self.grid_size = v;
        }
    }
}

// ---------------------------------------------------------------------------
// MatchUpdate
// ---------------------------------------------------------------------------

/// A minimal delta written to the store after an accepted action.
///
/// Every field is optional or empty by default, so a move typically
/// looks like:
///
/// ```json
/// { "lines": { "0,0-0,1": "p1" }, "currentPlayer": "p2" }
/// ```
///
/// `scores` holds *increments*, mirroring the store's atomic
/// field-increment primitive, not absolute values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub players_joined: Vec<PlayerId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub player_names: BTreeMap<PlayerId, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub player_colors: BTreeMap<PlayerId, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub lines: Lines,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub squares: Squares,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: Scores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Lifecycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
}

impl MatchUpdate {
    /// Returns `true` if applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// MatchSnapshot
// ---------------------------------------------------------------------------

/// A possibly partial view of a match document as delivered by the store.
///
/// Stores deliver whole documents, but a document written by an older
/// client may lack fields. Anything missing (or `null`) stays as it was
/// locally; see [`Match::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchSnapshot {
    pub players: Option<Vec<PlayerId>>,
    pub player_names: Option<BTreeMap<PlayerId, String>>,
    pub player_colors: Option<BTreeMap<PlayerId, String>>,
    pub scores: Option<Scores>,
    pub lines: Option<Lines>,
    pub squares: Option<Squares>,
    pub current_player: Option<PlayerId>,
    pub state: Option<Lifecycle>,
    pub winner: Option<PlayerId>,
    pub grid_size: Option<u32>,
}

impl From<Match> for MatchSnapshot {
    fn from(m: Match) -> Self {
        Self {
            players: Some(m.players),
            player_names: Some(m.player_names),
            player_colors: Some(m.player_colors),
            scores: Some(m.scores),
            lines: Some(m.lines),
            squares: Some(m.squares),
            current_player: m.current_player,
            state: Some(m.state),
            winner: m.winner,
            grid_size: Some(m.grid_size),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
