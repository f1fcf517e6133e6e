use serde::{Deserialize, Serialize};

use crate::rack::Rack;
use crate::PlayerId;

/// One seat at the table: identity, held tiles, cumulative score.
///
/// `skip_next_turn` carries the challenge penalty: a player whose challenge
/// fails sits out their next turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub rack: Rack,
    pub score: i32,
    pub skip_next_turn: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Player {
            id: id.into(),
            rack: Rack::new(),
            score: 0,
            skip_next_turn: false,
        }
    }
}
