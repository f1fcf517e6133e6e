use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tiles::Letter;
use crate::{ChannelId, PlayerId};

/// Top-level error type for the entire engine
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ScrabbleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),

    #[error("Concurrency error: {0}")]
    Concurrency(#[from] ConcurrencyError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Rule violations rejected before any mutation, surfaced verbatim to the
/// acting player.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Invalid number of players: {count} (must be 2-4)")]
    InvalidPlayerCount { count: usize },

    #[error("Duplicate player: {player}")]
    DuplicatePlayer { player: PlayerId },

    #[error("Illegal placement: {rule}")]
    IllegalPlacement { rule: String },

    #[error("Words not in dictionary: {}", .words.iter().join(", "))]
    InvalidWord { words: Vec<String> },

    #[error("Tile not held: {letter}")]
    TileNotHeld { letter: Letter },

    #[error("Cannot exchange {requested} tiles: {available} remaining in bag")]
    InvalidExchange { requested: usize, available: usize },

    #[error("Reorder must be a permutation of the current rack")]
    InvalidPermutation,

    #[error("Player not in game: {player}")]
    UnknownPlayer { player: PlayerId },

    #[error("Game already exists in channel: {channel}")]
    GameAlreadyExists { channel: ChannelId },

    #[error("No game in channel: {channel}")]
    GameNotFound { channel: ChannelId },
}

/// Turn state machine errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TurnError {
    #[error("Not your turn: current={current}, attempted={attempted}")]
    NotYourTurn { current: PlayerId, attempted: PlayerId },

    #[error("No play available to challenge")]
    NoActiveChallenge,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Game is already finished")]
    GameOver,
}

/// Lock contention errors; caller should retry with backoff
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ConcurrencyError {
    #[error("Session busy: {channel}")]
    SessionBusy { channel: ChannelId },
}

/// Persistence errors (fatal for the request; never silently dropped)
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum StoreError {
    #[error("Session serialization failed: {details}")]
    Serialization { details: String },

    #[error("Storage backend failed: {details}")]
    Backend { details: String },
}

/// Result type aliases for convenience
pub type ScrabbleResult<T> = Result<T, ScrabbleError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Helper methods for creating common errors
impl ValidationError {
    pub fn illegal_placement(rule: impl Into<String>) -> Self {
        Self::IllegalPlacement { rule: rule.into() }
    }

    pub fn unknown_player(player: impl Into<PlayerId>) -> Self {
        Self::UnknownPlayer {
            player: player.into(),
        }
    }
}

impl TurnError {
    pub fn not_your_turn(current: impl Into<PlayerId>, attempted: impl Into<PlayerId>) -> Self {
        Self::NotYourTurn {
            current: current.into(),
            attempted: attempted.into(),
        }
    }
}

impl StoreError {
    pub fn serialization(details: impl Into<String>) -> Self {
        Self::Serialization {
            details: details.into(),
        }
    }

    pub fn backend(details: impl Into<String>) -> Self {
        Self::Backend {
            details: details.into(),
        }
    }
}
