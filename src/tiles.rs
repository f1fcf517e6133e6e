use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};

/// Total tiles in a fresh bag
pub const TILE_COUNT: usize = 100;

/// A single tile face: the 26 letters plus the blank wildcard
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Blank,
}

pub const ALL_LETTERS: [Letter; 27] = [
    Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F, Letter::G,
    Letter::H, Letter::I, Letter::J, Letter::K, Letter::L, Letter::M, Letter::N,
    Letter::O, Letter::P, Letter::Q, Letter::R, Letter::S, Letter::T, Letter::U,
    Letter::V, Letter::W, Letter::X, Letter::Y, Letter::Z, Letter::Blank,
];

impl Letter {
    /// Standard letter point value; blanks score nothing
    pub fn value(self) -> i32 {
        use Letter::*;
        match self {
            A | E | I | O | U | L | N | S | T | R => 1,
            D | G => 2,
            B | C | M | P => 3,
            F | H | V | W | Y => 4,
            K => 5,
            J | X => 8,
            Q | Z => 10,
            Blank => 0,
        }
    }

    /// Number of copies of this tile in a fresh bag (fixed distribution,
    /// totalling 100)
    pub fn frequency(self) -> usize {
        use Letter::*;
        match self {
            E => 12,
            A | I => 9,
            O => 8,
            N | R | T => 6,
            L | S | U | D => 4,
            G => 3,
            B | C | M | P | F | H | V | W | Y | Blank => 2,
            K | J | X | Q | Z => 1,
        }
    }

    pub fn as_char(self) -> char {
        use Letter::*;
        match self {
            A => 'A', B => 'B', C => 'C', D => 'D', E => 'E', F => 'F', G => 'G',
            H => 'H', I => 'I', J => 'J', K => 'K', L => 'L', M => 'M', N => 'N',
            O => 'O', P => 'P', Q => 'Q', R => 'R', S => 'S', T => 'T', U => 'U',
            V => 'V', W => 'W', X => 'X', Y => 'Y', Z => 'Z',
            Blank => '_',
        }
    }

    pub fn from_char(c: char) -> Option<Letter> {
        use Letter::*;
        match c.to_ascii_uppercase() {
            'A' => Some(A), 'B' => Some(B), 'C' => Some(C), 'D' => Some(D),
            'E' => Some(E), 'F' => Some(F), 'G' => Some(G), 'H' => Some(H),
            'I' => Some(I), 'J' => Some(J), 'K' => Some(K), 'L' => Some(L),
            'M' => Some(M), 'N' => Some(N), 'O' => Some(O), 'P' => Some(P),
            'Q' => Some(Q), 'R' => Some(R), 'S' => Some(S), 'T' => Some(T),
            'U' => Some(U), 'V' => Some(V), 'W' => Some(W), 'X' => Some(X),
            'Y' => Some(Y), 'Z' => Some(Z),
            '_' => Some(Blank),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The pool of undrawn tiles for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileBag {
    tiles: Vec<Letter>,
}

impl TileBag {
    /// Build the full 100-tile distribution in a uniformly random order.
    /// `shuffle` is a Fisher-Yates shuffle, so every permutation is equally
    /// likely.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut tiles = Vec::with_capacity(TILE_COUNT);
        for &letter in ALL_LETTERS.iter() {
            for _ in 0..letter.frequency() {
                tiles.push(letter);
            }
        }
        debug_assert_eq!(tiles.len(), TILE_COUNT);
        tiles.shuffle(rng);
        TileBag { tiles }
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Remove and return one tile chosen uniformly at random
    pub fn draw_one(&mut self, rng: &mut impl Rng) -> Option<Letter> {
        if self.tiles.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.tiles.len());
        Some(self.tiles.swap_remove(index))
    }

    /// Draw up to `n` tiles without replacement. Returns fewer than `n` when
    /// the bag runs out; exhaustion is a normal end-of-game condition, not an
    /// error.
    pub fn draw(&mut self, n: usize, rng: &mut impl Rng) -> Vec<Letter> {
        let mut drawn = Vec::with_capacity(n.min(self.tiles.len()));
        for _ in 0..n {
            match self.draw_one(rng) {
                Some(tile) => drawn.push(tile),
                None => break,
            }
        }
        drawn
    }

    /// Swap the given tiles for an equal number of fresh draws. Replacements
    /// are drawn before the returned tiles go back in, so a player can never
    /// draw back what they just gave up.
    pub fn exchange(&mut self, tiles: &[Letter], rng: &mut impl Rng) -> ValidationResult<Vec<Letter>> {
        if self.remaining() < tiles.len() {
            return Err(ValidationError::InvalidExchange {
                requested: tiles.len(),
                available: self.remaining(),
            });
        }
        let drawn = self.draw(tiles.len(), rng);
        self.tiles.extend_from_slice(tiles);
        self.tiles.shuffle(rng);
        Ok(drawn)
    }

    /// Return tiles to the bag without drawing (move reversal)
    pub fn put_back(&mut self, tiles: &[Letter]) {
        self.tiles.extend_from_slice(tiles);
    }

    #[cfg(test)]
    pub(crate) fn take_letter(&mut self, letter: Letter) -> Option<Letter> {
        let index = self.tiles.iter().position(|&t| t == letter)?;
        Some(self.tiles.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::collections::HashMap;

    fn rng() -> XorShiftRng {
        XorShiftRng::seed_from_u64(42)
    }

    #[test]
    fn test_fresh_bag_has_exact_distribution() {
        let bag = TileBag::new(&mut rng());
        assert_eq!(bag.remaining(), TILE_COUNT);

        let mut counts: HashMap<Letter, usize> = HashMap::new();
        for &tile in &bag.tiles {
            *counts.entry(tile).or_insert(0) += 1;
        }
        for &letter in ALL_LETTERS.iter() {
            assert_eq!(
                counts.get(&letter).copied().unwrap_or(0),
                letter.frequency(),
                "wrong count for {}",
                letter
            );
        }
        assert_eq!(counts.values().sum::<usize>(), TILE_COUNT);
    }

    #[test]
    fn test_draw_without_replacement_drains_exact_distribution() {
        let mut rng = rng();
        let mut bag = TileBag::new(&mut rng);
        let drawn = bag.draw(TILE_COUNT, &mut rng);

        assert_eq!(drawn.len(), TILE_COUNT);
        assert_eq!(bag.remaining(), 0);

        // Every drawn tile came from the fixed distribution
        let mut counts: HashMap<Letter, usize> = HashMap::new();
        for tile in drawn {
            *counts.entry(tile).or_insert(0) += 1;
        }
        for &letter in ALL_LETTERS.iter() {
            assert_eq!(counts.get(&letter).copied().unwrap_or(0), letter.frequency());
        }

        // Exhaustion is not an error
        assert!(bag.draw(5, &mut rng).is_empty());
        assert!(bag.draw_one(&mut rng).is_none());
    }

    #[test]
    fn test_draw_returns_fewer_when_short() {
        let mut rng = rng();
        let mut bag = TileBag::new(&mut rng);
        bag.draw(97, &mut rng);
        assert_eq!(bag.remaining(), 3);
        assert_eq!(bag.draw(7, &mut rng).len(), 3);
    }

    #[test]
    fn test_exchange_preserves_bag_size() {
        let mut rng = rng();
        let mut bag = TileBag::new(&mut rng);
        let held = bag.draw(7, &mut rng);
        let before = bag.remaining();

        let drawn = bag.exchange(&held, &mut rng).unwrap();
        assert_eq!(drawn.len(), held.len());
        assert_eq!(bag.remaining(), before);
    }

    #[test]
    fn test_exchange_fails_when_bag_too_small() {
        let mut rng = rng();
        let mut bag = TileBag::new(&mut rng);
        let held = bag.draw(7, &mut rng);
        bag.draw(90, &mut rng);
        assert_eq!(bag.remaining(), 3);

        let err = bag.exchange(&held, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidExchange {
                requested: 7,
                available: 3
            }
        ));
        // Nothing changed
        assert_eq!(bag.remaining(), 3);
    }

    #[test]
    fn test_letter_values_match_standard_table() {
        assert_eq!(Letter::A.value(), 1);
        assert_eq!(Letter::D.value(), 2);
        assert_eq!(Letter::C.value(), 3);
        assert_eq!(Letter::H.value(), 4);
        assert_eq!(Letter::K.value(), 5);
        assert_eq!(Letter::X.value(), 8);
        assert_eq!(Letter::Q.value(), 10);
        assert_eq!(Letter::Blank.value(), 0);
    }

    #[test]
    fn test_char_round_trip() {
        for &letter in ALL_LETTERS.iter() {
            assert_eq!(Letter::from_char(letter.as_char()), Some(letter));
        }
        assert_eq!(Letter::from_char('e'), Some(Letter::E));
        assert_eq!(Letter::from_char('?'), None);
    }
}
