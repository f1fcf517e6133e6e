use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::tiles::{Letter, TileBag};

/// Maximum tiles a player holds at once
pub const RACK_CAPACITY: usize = 7;

/// A player's held, unplayed tiles. Order is display order only and has no
/// effect on play.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rack {
    tiles: Vec<Letter>,
}

impl Rack {
    pub fn new() -> Self {
        Rack { tiles: Vec::with_capacity(RACK_CAPACITY) }
    }

    pub fn tiles(&self) -> &[Letter] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Summed point value of held tiles (end-game deductions)
    pub fn value(&self) -> i32 {
        self.tiles.iter().map(|t| t.value()).sum()
    }

    /// Draw from the bag until the rack holds 7 tiles or the bag is empty.
    /// Returns exactly the tiles drawn, in draw order; undo needs them to
    /// put the bag back together.
    pub fn refill(&mut self, bag: &mut TileBag, rng: &mut impl Rng) -> Vec<Letter> {
        let mut drawn = Vec::new();
        while self.tiles.len() < RACK_CAPACITY {
            match bag.draw_one(rng) {
                Some(tile) => {
                    self.tiles.push(tile);
                    drawn.push(tile);
                }
                None => break,
            }
        }
        drawn
    }

    /// Remove the exact multiset of letters consumed by a play or exchange.
    /// Validated against a copy first, so a failed removal leaves the rack
    /// untouched. A blank play consumes `Letter::Blank`, never the letter it
    /// was designated as.
    pub fn remove(&mut self, tiles: &[Letter]) -> ValidationResult<()> {
        let mut remaining = self.tiles.clone();
        for &tile in tiles {
            match remaining.iter().position(|&held| held == tile) {
                Some(index) => {
                    remaining.remove(index);
                }
                None => return Err(ValidationError::TileNotHeld { letter: tile }),
            }
        }
        self.tiles = remaining;
        Ok(())
    }

    /// Replace the display order. The new order must be a permutation of the
    /// current contents.
    pub fn reorder(&mut self, order: &[Letter]) -> ValidationResult<()> {
        let mut current = self.tiles.clone();
        let mut proposed = order.to_vec();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(ValidationError::InvalidPermutation);
        }
        self.tiles = order.to_vec();
        Ok(())
    }

    /// Restore a rack from a move memento
    pub(crate) fn restore(&mut self, tiles: &[Letter]) {
        self.tiles = tiles.to_vec();
    }

    pub(crate) fn extend(&mut self, tiles: &[Letter]) {
        self.tiles.extend_from_slice(tiles);
    }

    #[cfg(test)]
    pub(crate) fn from_letters(tiles: &[Letter]) -> Self {
        Rack { tiles: tiles.to_vec() }
    }
}
