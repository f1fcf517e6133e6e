use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::rack::RACK_CAPACITY;
use crate::tiles::Letter;

/// Board edge length (15x15 grid)
pub const BOARD_SIZE: u8 = 15;

/// Bonus for playing all seven rack tiles in one turn. A tuning constant,
/// not a rule invariant.
pub const BINGO_BONUS: i32 = 50;

/// A cell coordinate, row-major from the top-left
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

/// The start square at the center of the board
pub const START: Pos = Pos { row: 7, col: 7 };

impl Pos {
    pub fn new(row: u8, col: u8) -> Self {
        Pos { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    fn offset(self, dr: i16, dc: i16) -> Option<Pos> {
        let row = self.row as i16 + dr;
        let col = self.col as i16 + dc;
        if (0..BOARD_SIZE as i16).contains(&row) && (0..BOARD_SIZE as i16).contains(&col) {
            Some(Pos::new(row as u8, col as u8))
        } else {
            None
        }
    }

    fn neighbors(self) -> impl Iterator<Item = Pos> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset(dr, dc))
    }
}

/// A cell's fixed scoring multiplier or special status
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
    Start,
}

impl Modifier {
    /// Premium square at a coordinate. The standard layout is symmetric under
    /// all eight board symmetries, so positions are normalized into the
    /// top-left octant before lookup.
    pub fn at(pos: Pos) -> Modifier {
        if pos == START {
            return Modifier::Start;
        }
        let r = pos.row.min(BOARD_SIZE - 1 - pos.row);
        let c = pos.col.min(BOARD_SIZE - 1 - pos.col);
        match (r.min(c), r.max(c)) {
            (0, 0) | (0, 7) => Modifier::TripleWord,
            (1, 1) | (2, 2) | (3, 3) | (4, 4) => Modifier::DoubleWord,
            (1, 5) | (5, 5) => Modifier::TripleLetter,
            (0, 3) | (2, 6) | (3, 7) | (6, 6) => Modifier::DoubleLetter,
            _ => Modifier::None,
        }
    }

    pub fn letter_multiplier(self) -> i32 {
        match self {
            Modifier::DoubleLetter => 2,
            Modifier::TripleLetter => 3,
            _ => 1,
        }
    }

    /// The start square doubles the first word, like a double-word square
    pub fn word_multiplier(self) -> i32 {
        match self {
            Modifier::DoubleWord | Modifier::Start => 2,
            Modifier::TripleWord => 3,
            _ => 1,
        }
    }
}

/// A tile committed to the board. `blank` marks a blank tile played as
/// `letter`; it reads as that letter but scores zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub letter: Letter,
    pub blank: bool,
}

impl PlacedTile {
    pub fn score(self) -> i32 {
        if self.blank {
            0
        } else {
            self.letter.value()
        }
    }
}

/// One board cell: an optional placed tile plus its immutable modifier
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub tile: Option<PlacedTile>,
    pub modifier: Modifier,
}

/// One proposed (cell, letter) assignment within a play. For a blank tile,
/// `letter` is the designated letter and `blank` is true.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub pos: Pos,
    pub letter: Letter,
    pub blank: bool,
}

impl TilePlacement {
    pub fn new(pos: Pos, letter: Letter) -> Self {
        TilePlacement { pos, letter, blank: false }
    }

    pub fn blank(pos: Pos, letter: Letter) -> Self {
        TilePlacement { pos, letter, blank: true }
    }

    /// The rack tile this placement consumes
    pub fn rack_tile(self) -> Letter {
        if self.blank {
            Letter::Blank
        } else {
            self.letter
        }
    }

    fn as_tile(self) -> PlacedTile {
        PlacedTile { letter: self.letter, blank: self.blank }
    }
}

/// A contiguous word on the board, with the tiles that spell it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormedWord {
    pub cells: Vec<(Pos, PlacedTile)>,
    pub text: String,
}

/// The fixed 15x15 grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let cells = std::array::from_fn(|row| {
            std::array::from_fn(|col| Cell {
                tile: None,
                modifier: Modifier::at(Pos::new(row as u8, col as u8)),
            })
        });
        Board { cells }
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn tile_at(&self, pos: Pos) -> Option<&PlacedTile> {
        self.cells[pos.row as usize][pos.col as usize].tile.as_ref()
    }

    pub fn tiles_on_board(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.tile.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles_on_board() == 0
    }

    /// Check a candidate placement against the placement rules. Each failure
    /// names the rule it violated. The board is not modified.
    pub fn validate_placement(&self, placements: &[TilePlacement]) -> ValidationResult<()> {
        let illegal = ValidationError::illegal_placement;

        if placements.is_empty() {
            return Err(illegal("no tiles placed"));
        }
        if placements.len() > RACK_CAPACITY {
            return Err(illegal("more than seven tiles placed"));
        }
        for p in placements {
            if !p.pos.in_bounds() {
                return Err(illegal("cell is off the board"));
            }
            if p.blank && p.letter == Letter::Blank {
                return Err(illegal("blank tile must designate a letter"));
            }
            if !p.blank && p.letter == Letter::Blank {
                return Err(illegal("blank tile played without a designated letter"));
            }
        }

        let positions: HashSet<Pos> = placements.iter().map(|p| p.pos).collect();
        if positions.len() != placements.len() {
            return Err(illegal("duplicate cell in placement"));
        }
        if placements.iter().any(|p| self.tile_at(p.pos).is_some()) {
            return Err(illegal("cell is already occupied"));
        }

        let same_row = placements.iter().all(|p| p.pos.row == placements[0].pos.row);
        let same_col = placements.iter().all(|p| p.pos.col == placements[0].pos.col);
        if !same_row && !same_col {
            return Err(illegal("tiles must share a single row or column"));
        }

        // No internal gaps once existing tiles on the line are counted
        let occupied = |pos: Pos| positions.contains(&pos) || self.tile_at(pos).is_some();
        if same_row {
            let row = placements[0].pos.row;
            let min = placements.iter().map(|p| p.pos.col).min().unwrap_or(0);
            let max = placements.iter().map(|p| p.pos.col).max().unwrap_or(0);
            if (min..=max).any(|col| !occupied(Pos::new(row, col))) {
                return Err(illegal("gap in placed word"));
            }
        } else {
            let col = placements[0].pos.col;
            let min = placements.iter().map(|p| p.pos.row).min().unwrap_or(0);
            let max = placements.iter().map(|p| p.pos.row).max().unwrap_or(0);
            if (min..=max).any(|row| !occupied(Pos::new(row, col))) {
                return Err(illegal("gap in placed word"));
            }
        }

        if self.is_empty() {
            if !positions.contains(&START) {
                return Err(illegal("first word must cover the start square"));
            }
        } else {
            let touches = placements
                .iter()
                .any(|p| p.pos.neighbors().any(|n| self.tile_at(n).is_some()));
            if !touches {
                return Err(illegal("word must connect to existing tiles"));
            }
        }

        Ok(())
    }

    /// Every word newly formed by a validated placement: the word along the
    /// placement line plus any perpendicular word of two or more letters
    /// created by a placed tile.
    pub fn extract_words(&self, placements: &[TilePlacement]) -> Vec<FormedWord> {
        let overlay: HashMap<Pos, PlacedTile> =
            placements.iter().map(|p| (p.pos, p.as_tile())).collect();

        let horizontal = self.main_axis_horizontal(placements);
        let mut words = vec![self.word_through(&overlay, placements[0].pos, horizontal)];

        for p in placements {
            let cross = self.word_through(&overlay, p.pos, !horizontal);
            if cross.cells.len() >= 2 {
                words.push(cross);
            }
        }
        words
    }

    fn main_axis_horizontal(&self, placements: &[TilePlacement]) -> bool {
        if placements.len() > 1 {
            return placements.iter().all(|p| p.pos.row == placements[0].pos.row);
        }
        // Single tile: follow whichever axis already has a neighboring tile
        let pos = placements[0].pos;
        let occupied = |dr: i16, dc: i16| {
            pos.offset(dr, dc)
                .map_or(false, |n| self.tile_at(n).is_some())
        };
        occupied(0, -1) || occupied(0, 1) || (!occupied(-1, 0) && !occupied(1, 0))
    }

    /// The maximal contiguous word through `pos` along one axis, reading the
    /// overlay first and the committed board second
    fn word_through(
        &self,
        overlay: &HashMap<Pos, PlacedTile>,
        pos: Pos,
        horizontal: bool,
    ) -> FormedWord {
        let (dr, dc): (i16, i16) = if horizontal { (0, 1) } else { (1, 0) };
        let lookup = |pos: Pos| overlay.get(&pos).copied().or_else(|| self.tile_at(pos).copied());

        let mut head = pos;
        while let Some(prev) = head.offset(-dr, -dc) {
            if lookup(prev).is_some() {
                head = prev;
            } else {
                break;
            }
        }

        let mut cells = Vec::new();
        let mut cursor = Some(head);
        while let Some(pos) = cursor {
            match lookup(pos) {
                Some(tile) => {
                    cells.push((pos, tile));
                    cursor = pos.offset(dr, dc);
                }
                None => break,
            }
        }

        let text = cells.iter().map(|(_, tile)| tile.letter.as_char()).collect();
        FormedWord { cells, text }
    }

    /// Point value of a validated placement across all words it forms. Letter
    /// multipliers apply per newly covered premium cell, then word multipliers
    /// per word; tiles already on the board score face value only. A
    /// seven-tile placement earns the bingo bonus on top.
    pub fn score_placement(&self, placements: &[TilePlacement], words: &[FormedWord]) -> i32 {
        let placed: HashSet<Pos> = placements.iter().map(|p| p.pos).collect();

        let mut total = 0;
        for word in words {
            let mut word_score = 0;
            let mut word_multiplier = 1;
            for &(pos, tile) in &word.cells {
                if placed.contains(&pos) {
                    let modifier = self.cell(pos).modifier;
                    word_score += tile.score() * modifier.letter_multiplier();
                    word_multiplier *= modifier.word_multiplier();
                } else {
                    word_score += tile.score();
                }
            }
            total += word_score * word_multiplier;
        }

        if placements.len() == RACK_CAPACITY {
            total += BINGO_BONUS;
        }
        total
    }

    /// Commit a validated placement
    pub fn apply(&mut self, placements: &[TilePlacement]) {
        for p in placements {
            self.cells[p.pos.row as usize][p.pos.col as usize].tile = Some(p.as_tile());
        }
    }

    /// Reverse a committed placement, restoring its cells to empty
    pub fn revert(&mut self, placements: &[TilePlacement]) {
        for p in placements {
            self.cells[p.pos.row as usize][p.pos.col as usize].tile = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::Letter::*;

    fn place(row: u8, col: u8, letter: Letter) -> TilePlacement {
        TilePlacement::new(Pos::new(row, col), letter)
    }

    fn cat_at_start() -> Vec<TilePlacement> {
        vec![place(7, 7, C), place(7, 8, A), place(7, 9, T)]
    }

    fn rule_of(err: ValidationError) -> String {
        match err {
            ValidationError::IllegalPlacement { rule } => rule,
            other => panic!("expected IllegalPlacement, got {:?}", other),
        }
    }

    #[test]
    fn test_modifier_layout_matches_standard_board() {
        assert_eq!(Modifier::at(Pos::new(7, 7)), Modifier::Start);
        for pos in [(0, 0), (0, 7), (0, 14), (7, 0), (7, 14), (14, 0), (14, 7), (14, 14)] {
            assert_eq!(Modifier::at(Pos::new(pos.0, pos.1)), Modifier::TripleWord);
        }
        for pos in [(1, 1), (2, 2), (3, 3), (4, 4), (10, 10), (13, 13), (1, 13), (4, 10)] {
            assert_eq!(Modifier::at(Pos::new(pos.0, pos.1)), Modifier::DoubleWord);
        }
        for pos in [(1, 5), (1, 9), (5, 1), (5, 5), (9, 9), (13, 5)] {
            assert_eq!(Modifier::at(Pos::new(pos.0, pos.1)), Modifier::TripleLetter);
        }
        for pos in [(0, 3), (0, 11), (2, 6), (3, 0), (3, 7), (6, 6), (7, 3), (11, 14), (14, 11)] {
            assert_eq!(Modifier::at(Pos::new(pos.0, pos.1)), Modifier::DoubleLetter);
        }
        assert_eq!(Modifier::at(Pos::new(7, 8)), Modifier::None);
        assert_eq!(Modifier::at(Pos::new(8, 7)), Modifier::None);
    }

    #[test]
    fn test_first_move_must_cover_start() {
        let board = Board::new();
        let err = board
            .validate_placement(&[place(0, 0, C), place(0, 1, A), place(0, 2, T)])
            .unwrap_err();
        assert_eq!(rule_of(err), "first word must cover the start square");

        board.validate_placement(&cat_at_start()).unwrap();
    }

    #[test]
    fn test_placement_must_be_one_line_without_gaps() {
        let board = Board::new();

        let err = board
            .validate_placement(&[place(7, 7, C), place(8, 8, A)])
            .unwrap_err();
        assert_eq!(rule_of(err), "tiles must share a single row or column");

        let err = board
            .validate_placement(&[place(7, 7, C), place(7, 9, T)])
            .unwrap_err();
        assert_eq!(rule_of(err), "gap in placed word");
    }

    #[test]
    fn test_gap_filled_by_existing_tile_is_legal() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        // Vertical word through the existing T at (7,9); the placed tiles
        // sandwich it, so the line has no gap.
        board
            .validate_placement(&[place(6, 9, O), place(8, 9, T), place(9, 9, E)])
            .unwrap();
    }

    #[test]
    fn test_occupied_and_duplicate_cells_rejected() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        let err = board.validate_placement(&[place(7, 7, X)]).unwrap_err();
        assert_eq!(rule_of(err), "cell is already occupied");

        let err = board
            .validate_placement(&[place(8, 7, X), place(8, 7, Y)])
            .unwrap_err();
        assert_eq!(rule_of(err), "duplicate cell in placement");
    }

    #[test]
    fn test_later_moves_must_connect() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        let err = board
            .validate_placement(&[place(0, 0, D), place(0, 1, O), place(0, 2, G)])
            .unwrap_err();
        assert_eq!(rule_of(err), "word must connect to existing tiles");

        // Adjacent below the A forms a cross word
        board
            .validate_placement(&[place(8, 8, T), place(9, 8, E)])
            .unwrap();
    }

    #[test]
    fn test_blank_designation_rules() {
        let board = Board::new();
        let err = board
            .validate_placement(&[TilePlacement::blank(START, Blank)])
            .unwrap_err();
        assert_eq!(rule_of(err), "blank tile must designate a letter");

        let err = board
            .validate_placement(&[place(7, 7, Blank)])
            .unwrap_err();
        assert_eq!(rule_of(err), "blank tile played without a designated letter");
    }

    #[test]
    fn test_extract_main_word_only_on_empty_board() {
        let board = Board::new();
        let words = board.extract_words(&cat_at_start());
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "CAT");
        assert_eq!(words[0].cells[0].0, Pos::new(7, 7));
    }

    #[test]
    fn test_extract_cross_words() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        // T and E played under the A of CAT form the vertical word ATE and
        // nothing horizontally.
        let placements = vec![place(8, 8, T), place(9, 8, E)];
        let words = board.extract_words(&placements);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["ATE"]);

        // Hooking an S onto CAT forms CATS and the vertical word through S
        let placements = vec![place(6, 10, S), place(7, 10, S)];
        let words = board.extract_words(&placements);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert!(texts.contains(&"SS"));
        assert!(texts.contains(&"CATS"));
    }

    #[test]
    fn test_single_tile_axis_follows_existing_word() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        let placements = vec![place(7, 10, S)];
        let words = board.extract_words(&placements);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "CATS");
    }

    #[test]
    fn test_score_cat_on_start_is_doubled() {
        let board = Board::new();
        let placements = cat_at_start();
        board.validate_placement(&placements).unwrap();
        let words = board.extract_words(&placements);

        // C=3 A=1 T=1, start square doubles the word
        assert_eq!(board.score_placement(&placements, &words), 10);
    }

    #[test]
    fn test_blank_scores_zero() {
        let board = Board::new();
        let placements = vec![
            TilePlacement::blank(Pos::new(7, 7), C),
            place(7, 8, A),
            place(7, 9, T),
        ];
        let words = board.extract_words(&placements);
        assert_eq!(words[0].text, "CAT");
        // A=1 T=1, blank C=0, doubled on start
        assert_eq!(board.score_placement(&placements, &words), 4);
    }

    #[test]
    fn test_letter_multiplier_applies_to_new_tiles_only() {
        let mut board = Board::new();
        board.apply(&cat_at_start());

        // TAX vertically through the existing A at (7,8): T(6,8) A(7,8) X(8,8).
        // (6,8) and (8,8) are double-letter squares; the old A keeps face
        // value and re-triggers no premium.
        let placements = vec![place(6, 8, T), place(8, 8, X)];
        let words = board.extract_words(&placements);
        assert_eq!(words[0].text, "TAX");
        assert_eq!(board.score_placement(&placements, &words), 2 + 1 + 16);
    }

    #[test]
    fn test_seven_tile_play_earns_bingo_bonus() {
        let board = Board::new();
        let placements = vec![
            place(7, 4, R),
            place(7, 5, E),
            place(7, 6, T),
            place(7, 7, R),
            place(7, 8, A),
            place(7, 9, I),
            place(7, 10, N),
        ];
        board.validate_placement(&placements).unwrap();
        let words = board.extract_words(&placements);
        assert_eq!(words[0].text, "RETRAIN");

        // 7 letters at value 1, doubled on start, plus the bonus
        assert_eq!(board.score_placement(&placements, &words), 14 + BINGO_BONUS);
    }

    #[test]
    fn test_apply_then_revert_restores_board() {
        let mut board = Board::new();
        let placements = cat_at_start();

        board.apply(&placements);
        assert_eq!(board.tiles_on_board(), 3);
        assert_eq!(board.tile_at(Pos::new(7, 7)).unwrap().letter, C);

        board.revert(&placements);
        assert!(board.is_empty());
        for p in &placements {
            assert!(board.tile_at(p.pos).is_none());
        }
    }
}
