use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, TilePlacement};
use crate::errors::{ScrabbleResult, TurnError, ValidationError};
use crate::player::Player;
use crate::rack::RACK_CAPACITY;
use crate::tiles::{Letter, TileBag};
use crate::words::WordValidator;
use crate::{ChannelId, PlayerId};

/// Session lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    InProgress,
    Finished { winner: Option<PlayerId> },
}

/// What the most recent move did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MoveKind {
    Play { placements: Vec<TilePlacement> },
    Pass,
    Exchange { count: usize },
}

impl MoveKind {
    /// Exchanges cannot be reversed: the swapped tiles are hidden information
    /// once they are reshuffled into the bag.
    fn undoable(&self) -> bool {
        !matches!(self, MoveKind::Exchange { .. })
    }
}

/// Memento for the most recent move: the pre-move rack plus the exact tiles
/// drawn afterwards is enough to put board, rack, bag, and score back the way
/// they were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Move {
    pub player: PlayerId,
    pub kind: MoveKind,
    pub score_delta: i32,
    pub words: Vec<String>,
    pub rack_before: Vec<Letter>,
    pub drawn: Vec<Letter>,
}

/// Result of a committed play, for the dispatcher to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub words: Vec<String>,
    pub score: i32,
    pub finished: bool,
    pub next_player: Option<PlayerId>,
}

/// Result of a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChallengeOutcome {
    /// The play contained invalid words and was rolled back; it is the
    /// challenged player's turn again
    Overturned { player: PlayerId, words: Vec<String> },
    /// Every word stood; the challenger forfeits a turn
    Stood { challenger: PlayerId },
}

/// One game bound to a single channel. Owns its board, bag, and players
/// exclusively; nothing is shared across sessions.
///
/// Every mutating transition validates completely before touching state, so a
/// failed call leaves the session exactly as it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub channel: ChannelId,
    pub players: Vec<Player>,
    pub board: Board,
    pub bag: TileBag,
    pub turn_index: usize,
    pub status: SessionStatus,
    pub last_move: Option<Move>,
}

impl GameSession {
    /// Start a game: randomized turn order, fresh shuffled bag, seven tiles
    /// dealt to each player in turn order.
    pub fn new(
        channel: impl Into<ChannelId>,
        player_ids: &[PlayerId],
        rng: &mut impl Rng,
    ) -> ScrabbleResult<Self> {
        if !(2..=4).contains(&player_ids.len()) {
            return Err(ValidationError::InvalidPlayerCount {
                count: player_ids.len(),
            }
            .into());
        }
        for (i, id) in player_ids.iter().enumerate() {
            if player_ids[..i].contains(id) {
                return Err(ValidationError::DuplicatePlayer { player: id.clone() }.into());
            }
        }

        let channel = channel.into();
        let mut order = player_ids.to_vec();
        order.shuffle(rng);

        let mut bag = TileBag::new(rng);
        let mut players: Vec<Player> = order.into_iter().map(Player::new).collect();
        for player in &mut players {
            player.rack.refill(&mut bag, rng);
        }

        log::info!(
            "New scrabble game in channel {}: {} players, {} goes first",
            channel,
            players.len(),
            players[0].id
        );

        Ok(GameSession {
            channel,
            players,
            board: Board::new(),
            bag,
            turn_index: 0,
            status: SessionStatus::InProgress,
            last_move: None,
        })
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.turn_index]
    }

    pub fn player_index(&self, player: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player)
    }

    /// A player's held tiles, for private display. Read-only: racks refill
    /// when a turn completes, never at display time.
    pub fn rack_of(&self, player: &str) -> ScrabbleResult<&[Letter]> {
        let index = self
            .player_index(player)
            .ok_or_else(|| ValidationError::unknown_player(player))?;
        Ok(self.players[index].rack.tiles())
    }

    /// Permute a player's own rack for display. Not turn-gated.
    pub fn reorder(&mut self, player: &str, order: &[Letter]) -> ScrabbleResult<()> {
        let index = self
            .player_index(player)
            .ok_or_else(|| ValidationError::unknown_player(player))?;
        self.players[index].rack.reorder(order)?;
        Ok(())
    }

    /// Place tiles, validate and score the words they form, refill the rack,
    /// and advance the turn. Fails without mutation on any rule violation.
    pub fn play<V: WordValidator + ?Sized>(
        &mut self,
        player: &str,
        placements: &[TilePlacement],
        validator: &V,
        rng: &mut impl Rng,
    ) -> ScrabbleResult<PlayOutcome> {
        self.ensure_in_progress()?;
        self.ensure_current(player)?;

        self.board.validate_placement(placements)?;
        let formed = self.board.extract_words(placements);
        let invalid: Vec<String> = formed
            .iter()
            .filter(|w| !validator.is_valid_word(&w.text))
            .map(|w| w.text.clone())
            .collect();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidWord { words: invalid }.into());
        }

        let needed: Vec<Letter> = placements.iter().map(|p| p.rack_tile()).collect();
        let index = self.turn_index;
        let rack_before = self.players[index].rack.tiles().to_vec();

        // Last fallible step; everything after this commits
        self.players[index].rack.remove(&needed)?;

        self.board.apply(placements);
        let score = self.board.score_placement(placements, &formed);
        self.players[index].score += score;
        let drawn = self.players[index].rack.refill(&mut self.bag, rng);

        let words: Vec<String> = formed.into_iter().map(|w| w.text).collect();
        self.last_move = Some(Move {
            player: self.players[index].id.clone(),
            kind: MoveKind::Play {
                placements: placements.to_vec(),
            },
            score_delta: score,
            words: words.clone(),
            rack_before,
            drawn,
        });

        log::info!(
            "{} played {} for {} points in channel {}",
            self.players[index].id,
            words.join("/"),
            score,
            self.channel
        );

        let finished = self.bag.is_empty() && self.players[index].rack.is_empty();
        if finished {
            self.finish_playout(index);
        } else {
            self.advance_turn();
        }

        Ok(PlayOutcome {
            words,
            score,
            finished,
            next_player: if finished {
                None
            } else {
                Some(self.current_player().id.clone())
            },
        })
    }

    /// Swap rack tiles for fresh draws and forfeit the turn. Standard rule:
    /// only allowed while the bag holds at least a full rack's worth.
    pub fn exchange(
        &mut self,
        player: &str,
        tiles: &[Letter],
        rng: &mut impl Rng,
    ) -> ScrabbleResult<()> {
        self.ensure_in_progress()?;
        self.ensure_current(player)?;

        if self.bag.remaining() < RACK_CAPACITY {
            return Err(ValidationError::InvalidExchange {
                requested: tiles.len(),
                available: self.bag.remaining(),
            }
            .into());
        }

        let index = self.turn_index;
        let rack_before = self.players[index].rack.tiles().to_vec();
        self.players[index].rack.remove(tiles)?;
        let drawn = self.bag.exchange(tiles, rng)?;
        self.players[index].rack.extend(&drawn);

        self.last_move = Some(Move {
            player: self.players[index].id.clone(),
            kind: MoveKind::Exchange { count: tiles.len() },
            score_delta: 0,
            words: Vec::new(),
            rack_before,
            drawn,
        });

        log::info!(
            "{} exchanged {} tiles in channel {}",
            self.players[index].id,
            tiles.len(),
            self.channel
        );
        self.advance_turn();
        Ok(())
    }

    /// Forfeit the turn without playing. Recorded so the pass itself can be
    /// undone.
    pub fn pass(&mut self, player: &str) -> ScrabbleResult<PlayerId> {
        self.ensure_in_progress()?;
        self.ensure_current(player)?;

        let index = self.turn_index;
        self.last_move = Some(Move {
            player: self.players[index].id.clone(),
            kind: MoveKind::Pass,
            score_delta: 0,
            words: Vec::new(),
            rack_before: self.players[index].rack.tiles().to_vec(),
            drawn: Vec::new(),
        });

        log::info!("{} passed in channel {}", self.players[index].id, self.channel);
        self.advance_turn();
        Ok(self.current_player().id.clone())
    }

    /// Re-validate the most recent play's words. An opponent may challenge
    /// only the latest play, and only before any further action settles it.
    /// A successful challenge rolls the play back and returns the turn to the
    /// challenged player; a failed one costs the challenger a turn. Either
    /// way the play is settled and can no longer be challenged or undone.
    pub fn challenge<V: WordValidator + ?Sized>(
        &mut self,
        challenger: &str,
        validator: &V,
    ) -> ScrabbleResult<ChallengeOutcome> {
        self.ensure_in_progress()?;
        let challenger_index = self
            .player_index(challenger)
            .ok_or_else(|| ValidationError::unknown_player(challenger))?;

        let mv = self
            .last_move
            .as_ref()
            .filter(|m| matches!(m.kind, MoveKind::Play { .. }))
            .ok_or(TurnError::NoActiveChallenge)?;
        if mv.player == challenger {
            return Err(TurnError::NoActiveChallenge.into());
        }

        let invalid: Vec<String> = mv
            .words
            .iter()
            .filter(|w| !validator.is_valid_word(w))
            .cloned()
            .collect();

        // Either outcome consumes the move
        let mv = self.last_move.take().expect("checked above");

        if invalid.is_empty() {
            log::info!(
                "Challenge by {} failed in channel {}; play stands",
                challenger,
                self.channel
            );
            if challenger_index == self.turn_index {
                // The challenge consumed the challenger's own turn
                self.advance_turn();
            } else {
                self.players[challenger_index].skip_next_turn = true;
            }
            Ok(ChallengeOutcome::Stood {
                challenger: challenger.to_string(),
            })
        } else {
            log::info!(
                "Challenge by {} upheld in channel {}: {} removed",
                challenger,
                self.channel,
                invalid.join("/")
            );
            let player = mv.player.clone();
            self.revert_move(mv);
            Ok(ChallengeOutcome::Overturned {
                player,
                words: invalid,
            })
        }
    }

    /// Take back the most recent move. Only its author may undo, and only
    /// while it is still the latest committed action.
    pub fn undo(&mut self, player: &str) -> ScrabbleResult<()> {
        self.ensure_in_progress()?;

        let mv = self.last_move.as_ref().ok_or(TurnError::NothingToUndo)?;
        if mv.player != player {
            return Err(
                TurnError::not_your_turn(mv.player.clone(), player.to_string()).into(),
            );
        }
        if !mv.kind.undoable() {
            return Err(TurnError::NothingToUndo.into());
        }

        let mv = self.last_move.take().expect("checked above");
        log::info!("{} undid their move in channel {}", player, self.channel);
        self.revert_move(mv);
        Ok(())
    }

    /// Total tiles across bag, racks, and board; 100 at all times
    pub fn total_tiles(&self) -> usize {
        self.bag.remaining()
            + self.players.iter().map(|p| p.rack.len()).sum::<usize>()
            + self.board.tiles_on_board()
    }

    fn ensure_in_progress(&self) -> Result<(), TurnError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Finished { .. } => Err(TurnError::GameOver),
        }
    }

    fn ensure_current(&self, player: &str) -> ScrabbleResult<()> {
        if self.player_index(player).is_none() {
            return Err(ValidationError::unknown_player(player).into());
        }
        if self.current_player().id != player {
            return Err(TurnError::not_your_turn(
                self.current_player().id.clone(),
                player.to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Move to the next seat, consuming one pending challenge penalty per
    /// skipped player
    fn advance_turn(&mut self) {
        let n = self.players.len();
        for _ in 0..n {
            self.turn_index = (self.turn_index + 1) % n;
            if self.players[self.turn_index].skip_next_turn {
                self.players[self.turn_index].skip_next_turn = false;
                log::info!(
                    "{} sits out a turn after a failed challenge",
                    self.players[self.turn_index].id
                );
                continue;
            }
            break;
        }
    }

    /// Roll back a recorded move and hand the turn back to its author
    fn revert_move(&mut self, mv: Move) {
        let Some(index) = self.player_index(&mv.player) else {
            return;
        };
        match &mv.kind {
            MoveKind::Play { placements } => {
                self.board.revert(placements);
                self.bag.put_back(&mv.drawn);
                self.players[index].rack.restore(&mv.rack_before);
                self.players[index].score -= mv.score_delta;
            }
            MoveKind::Pass => {}
            // Not reversible; callers reject these before getting here
            MoveKind::Exchange { .. } => {}
        }
        self.turn_index = index;
    }

    /// The acting player went out with an empty bag: remaining players forfeit
    /// their rack value to the finisher and the game ends.
    fn finish_playout(&mut self, finisher: usize) {
        let mut forfeit = 0;
        for (i, player) in self.players.iter_mut().enumerate() {
            if i != finisher {
                let value = player.rack.value();
                player.score -= value;
                forfeit += value;
            }
        }
        self.players[finisher].score += forfeit;

        let winner = self
            .players
            .iter()
            .max_by_key(|p| p.score)
            .map(|p| p.id.clone());
        log::info!(
            "Game over in channel {}: winner {:?}",
            self.channel,
            winner
        );
        self.status = SessionStatus::Finished { winner };
    }
}
