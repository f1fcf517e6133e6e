// Scrabble Engine Library - Core Module Organization
//
// Authoritative game state for channel-bound Scrabble sessions: tile bag,
// racks, board, and the turn state machine, plus the persistence and
// dictionary seams the command dispatcher plugs into. Chat transport and
// rendering live outside this crate.

// Core game data structures
pub mod board;
pub mod player;
pub mod rack;
pub mod tiles;

// Game logic implementation
pub mod session;
pub mod words;

// Session orchestration and persistence
pub mod errors;
pub mod manager;
pub mod store;

// Re-export common types for convenient access
pub use crate::board::{Board, Modifier, Pos, TilePlacement, BINGO_BONUS, BOARD_SIZE, START};
pub use crate::errors::{
    ConcurrencyError, ScrabbleError, ScrabbleResult, StoreError, TurnError, ValidationError,
};
pub use crate::manager::SessionManager;
pub use crate::player::Player;
pub use crate::rack::{Rack, RACK_CAPACITY};
pub use crate::session::{ChallengeOutcome, GameSession, Move, MoveKind, PlayOutcome, SessionStatus};
pub use crate::store::{MemoryStore, SessionStore};
pub use crate::tiles::{Letter, TileBag, TILE_COUNT};
pub use crate::words::{DictionaryValidator, WordValidator};

// Common types used throughout the engine
pub type ChannelId = String;
pub type PlayerId = String;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
