use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use bits_helpers::Direction;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

pub const MIN_GRID_SIZE: usize = 2;
/// Largest side length whose tile ids (up to 256² - 1) still fit in a `u16`.
pub const MAX_GRID_SIZE: usize = 256;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Panel {
    Empty,
    Tile(u16),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Grid size {0} is too small, a board needs at least {MIN_GRID_SIZE}x{MIN_GRID_SIZE}")]
    SizeTooSmall(usize),

    #[error("Grid size {0} is too large, the limit is {MAX_GRID_SIZE}")]
    SizeTooLarge(usize),

    #[error("Board is not square - expected {expected} cells, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Tile {tile} is outside 1..={max}")]
    TileOutOfRange { tile: u16, max: usize },

    #[error("Tile {0} appears more than once")]
    DuplicateTile(u16),

    #[error("Board has no empty slot")]
    MissingEmpty,

    #[error("Board has {0} empty slots")]
    MultipleEmpty(usize),
}

/// How a new level's board is produced from the solved layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShuffleStrategy {
    /// Fisher-Yates over every cell. Half of the results cannot be solved
    /// with slides alone.
    #[default]
    Uniform,
    /// Fisher-Yates, reshuffled until the permutation parity allows a solve.
    Solvable,
    /// Random legal gap moves away from the solved layout.
    RandomWalk { moves: usize },
}

/// A tile that changed place after an accepted slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideMove {
    pub tile: u16,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleBoard {
    size: usize,
    panels: Vec<Panel>,
    empty: usize,
}

impl PuzzleBoard {
    /// The canonical layout: `1..N²-1` in order, empty slot last.
    pub fn solved(size: usize) -> Result<Self, BoardError> {
        check_size(size)?;
        Ok(Self::solved_unchecked(size))
    }

    pub fn from_panels(size: usize, panels: Vec<Panel>) -> Result<Self, BoardError> {
        check_size(size)?;
        let expected = size * size;
        if panels.len() != expected {
            return Err(BoardError::LengthMismatch {
                expected,
                actual: panels.len(),
            });
        }
        let max = expected - 1;
        let mut seen = vec![false; expected];
        let mut empties = Vec::new();
        for (index, panel) in panels.iter().enumerate() {
            match *panel {
                Panel::Empty => empties.push(index),
                Panel::Tile(tile) => {
                    let slot = seen
                        .get_mut(tile as usize)
                        .filter(|_| tile != 0)
                        .ok_or(BoardError::TileOutOfRange { tile, max })?;
                    if *slot {
                        return Err(BoardError::DuplicateTile(tile));
                    }
                    *slot = true;
                }
            }
        }
        match empties.as_slice() {
            [] => Err(BoardError::MissingEmpty),
            [empty] => Ok(Self {
                size,
                empty: *empty,
                panels,
            }),
            many => Err(BoardError::MultipleEmpty(many.len())),
        }
    }

    /// Builds a board from plain numbers where `0` marks the empty slot.
    pub fn from_numbers(size: usize, numbers: &[u16]) -> Result<Self, BoardError> {
        let panels = numbers
            .iter()
            .map(|&n| if n == 0 { Panel::Empty } else { Panel::Tile(n) })
            .collect();
        Self::from_panels(size, panels)
    }

    /// Produces a fresh, unsolved board for a new level.
    pub fn generate(
        size: usize,
        strategy: ShuffleStrategy,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, BoardError> {
        check_size(size)?;
        Ok(Self::solved_unchecked(size).reshuffled(strategy, rng))
    }

    /// A new unsolved board of the same size.
    #[must_use]
    pub fn reshuffled(&self, strategy: ShuffleStrategy, rng: &mut fastrand::Rng) -> Self {
        let mut board = Self::solved_unchecked(self.size);
        match strategy {
            ShuffleStrategy::Uniform => loop {
                board.shuffle(rng);
                if !board.is_solved() {
                    break;
                }
            },
            ShuffleStrategy::Solvable => loop {
                board.shuffle(rng);
                if board.is_solvable() && !board.is_solved() {
                    break;
                }
            },
            ShuffleStrategy::RandomWalk { moves } => {
                let mut last = None;
                for _ in 0..moves {
                    last = board.random_gap_step(last, rng);
                }
                // Without an immediate undo one step always leaves the solved layout.
                while board.is_solved() {
                    last = board.random_gap_step(last, rng);
                }
            }
        }
        board
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn get(&self, index: usize) -> Option<Panel> {
        self.panels.get(index).copied()
    }

    pub const fn empty_index(&self) -> usize {
        self.empty
    }

    pub fn find_tile(&self, tile: u16) -> Option<usize> {
        self.panels.iter().position(|&p| p == Panel::Tile(tile))
    }

    /// Grid position of a cell: `x` is the column, `y` the row.
    pub const fn position(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.size) as i32, (index / self.size) as i32)
    }

    pub fn index_at(&self, pos: IVec2) -> Option<usize> {
        let size = self.size as i32;
        if pos.x < 0 || pos.y < 0 || pos.x >= size || pos.y >= size {
            return None;
        }
        Some(self.index(pos.x as usize, pos.y as usize))
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        let d = self.position(a) - self.position(b);
        d.x.abs() + d.y.abs() == 1
    }

    /// Moves `tile` one step in `direction`, only if that step lands on the
    /// empty slot. Anything else leaves the board untouched.
    pub fn slide_tile(&mut self, tile: u16, direction: Direction) -> Option<SlideMove> {
        let index = self.find_tile(tile)?;
        self.slide_index(index, direction)
    }

    pub fn slide_index(&mut self, index: usize, direction: Direction) -> Option<SlideMove> {
        if index >= self.panels.len() {
            return None;
        }
        let target = self.index_at(self.position(index) + direction.delta())?;
        if target != self.empty {
            return None;
        }
        self.move_into_gap(index)
    }

    /// Moves the tile lying against the gap on the side opposite `direction`,
    /// so a swipe up pulls the tile below the gap upward.
    pub fn slide_gap(&mut self, direction: Direction) -> Option<SlideMove> {
        let source = self.index_at(self.position(self.empty) - direction.delta())?;
        self.move_into_gap(source)
    }

    /// Tap-to-slide: a tile next to the gap moves into it.
    pub fn tap(&mut self, index: usize) -> Option<SlideMove> {
        if index >= self.panels.len() || !self.is_adjacent(index, self.empty) {
            return None;
        }
        self.move_into_gap(index)
    }

    /// Exchanges any two distinct cells, ignoring adjacency.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        let len = self.panels.len();
        if a == b || a >= len || b >= len {
            return false;
        }
        self.panels.swap(a, b);
        if self.empty == a {
            self.empty = b;
        } else if self.empty == b {
            self.empty = a;
        }
        true
    }

    pub fn is_solved(&self) -> bool {
        let last = self.panels.len() - 1;
        self.panels.iter().enumerate().all(|(i, &panel)| match panel {
            Panel::Empty => i == last,
            Panel::Tile(tile) => tile as usize == i + 1,
        })
    }

    /// Pairs of tiles that appear in the wrong relative order, gap ignored.
    pub fn inversions(&self) -> usize {
        let tiles: Vec<u16> = self
            .panels
            .iter()
            .filter_map(|p| match p {
                Panel::Tile(t) => Some(*t),
                Panel::Empty => None,
            })
            .collect();
        tiles
            .iter()
            .enumerate()
            .map(|(i, a)| tiles.iter().skip(i + 1).filter(|b| a > b).count())
            .sum()
    }

    /// Whether slides alone can reach the solved layout.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.inversions();
        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            let gap_row_from_bottom = self.size - self.empty / self.size;
            (inversions + gap_row_from_bottom) % 2 == 1
        }
    }

    const fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.size
    }

    fn solved_unchecked(size: usize) -> Self {
        let len = size * size;
        let panels = (0..len)
            .map(|i| {
                if i < len - 1 {
                    Panel::Tile((i + 1) as u16)
                } else {
                    Panel::Empty
                }
            })
            .collect();
        Self {
            size,
            panels,
            empty: len - 1,
        }
    }

    fn shuffle(&mut self, rng: &mut fastrand::Rng) {
        for i in (1..self.panels.len()).rev() {
            let j = rng.usize(..=i);
            self.panels.swap(i, j);
        }
        self.empty = self
            .panels
            .iter()
            .position(|&p| p == Panel::Empty)
            .unwrap_or(self.panels.len() - 1);
    }

    fn random_gap_step(
        &mut self,
        last: Option<Direction>,
        rng: &mut fastrand::Rng,
    ) -> Option<Direction> {
        let candidates: Vec<Direction> = Direction::iter()
            .filter(|dir| Some(dir.opposite()) != last)
            .filter(|dir| {
                self.index_at(self.position(self.empty) - dir.delta())
                    .is_some()
            })
            .collect();
        let dir = *candidates.get(rng.usize(..candidates.len()))?;
        self.slide_gap(dir).map(|_| dir)
    }

    fn move_into_gap(&mut self, index: usize) -> Option<SlideMove> {
        let Some(Panel::Tile(tile)) = self.get(index) else {
            return None;
        };
        let to = self.empty;
        self.panels.swap(index, to);
        self.empty = index;
        Some(SlideMove {
            tile,
            from: index,
            to,
        })
    }
}

const fn check_size(size: usize) -> Result<(), BoardError> {
    if size < MIN_GRID_SIZE {
        Err(BoardError::SizeTooSmall(size))
    } else if size > MAX_GRID_SIZE {
        Err(BoardError::SizeTooLarge(size))
    } else {
        Ok(())
    }
}

impl Display for PuzzleBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = (self.panels.len() - 1).to_string().len();
        for row in self.panels.chunks(self.size) {
            for panel in row {
                match panel {
                    Panel::Empty => write!(f, "{:>width$} ", "")?,
                    Panel::Tile(v) => write!(f, "{v:>0width$} ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(numbers: &[u16]) -> PuzzleBoard {
        let size = (numbers.len() as f64).sqrt() as usize;
        PuzzleBoard::from_numbers(size, numbers).expect("valid test board")
    }

    fn assert_permutation(board: &PuzzleBoard) {
        let n = board.len();
        let mut tiles: Vec<u16> = board
            .panels()
            .iter()
            .filter_map(|p| match p {
                Panel::Tile(t) => Some(*t),
                Panel::Empty => None,
            })
            .collect();
        tiles.sort_unstable();
        let expected: Vec<u16> = (1..n as u16).collect();
        assert_eq!(tiles, expected, "every tile exactly once");
        assert_eq!(
            board.panels().iter().filter(|p| **p == Panel::Empty).count(),
            1,
            "exactly one empty slot"
        );
        assert_eq!(
            board.get(board.empty_index()),
            Some(Panel::Empty),
            "cached empty index is accurate"
        );
    }

    #[test]
    fn generated_boards_are_permutations() {
        let mut rng = fastrand::Rng::with_seed(7);
        for size in 2..=6 {
            for strategy in [
                ShuffleStrategy::Uniform,
                ShuffleStrategy::Solvable,
                ShuffleStrategy::RandomWalk { moves: 30 },
            ] {
                let board = PuzzleBoard::generate(size, strategy, &mut rng).expect("valid size");
                assert_eq!(board.len(), size * size, "{size}x{size} length");
                assert_permutation(&board);
                assert!(!board.is_solved(), "{strategy:?} never hands out a solved board");
            }
        }
    }

    #[test]
    fn solvable_strategies_respect_parity() {
        let mut rng = fastrand::Rng::with_seed(42);
        for size in 2..=5 {
            for _ in 0..20 {
                let board = PuzzleBoard::generate(size, ShuffleStrategy::Solvable, &mut rng)
                    .expect("valid size");
                assert!(board.is_solvable(), "solvable shuffle\n{board}");
                let walked =
                    PuzzleBoard::generate(size, ShuffleStrategy::RandomWalk { moves: 0 }, &mut rng)
                        .expect("valid size");
                assert!(walked.is_solvable(), "random walk\n{walked}");
            }
        }
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(
            PuzzleBoard::generate(1, ShuffleStrategy::Uniform, &mut rng),
            Err(BoardError::SizeTooSmall(1)),
            "1x1"
        );
        assert_eq!(
            PuzzleBoard::solved(257),
            Err(BoardError::SizeTooLarge(257)),
            "tile ids would overflow"
        );
        let largest = PuzzleBoard::solved(MAX_GRID_SIZE).expect("256x256 still fits");
        assert_eq!(
            largest.get(largest.len() - 2),
            Some(Panel::Tile(u16::MAX)),
            "last tile id is u16::MAX"
        );
    }

    #[test]
    fn malformed_permutations_are_rejected() {
        assert_eq!(
            PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0]),
            Err(BoardError::LengthMismatch {
                expected: 9,
                actual: 8
            }),
            "non-square"
        );
        assert_eq!(
            PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 7, 0]),
            Err(BoardError::DuplicateTile(7)),
            "duplicate"
        );
        assert_eq!(
            PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 9, 0]),
            Err(BoardError::TileOutOfRange { tile: 9, max: 8 }),
            "out of range"
        );
        assert_eq!(
            PuzzleBoard::from_numbers(2, &[1, 2, 3, 0]).map(|b| b.is_solved()),
            Ok(true),
            "2x2 solved"
        );
        assert_eq!(
            PuzzleBoard::from_numbers(2, &[1, 2, 0, 0]),
            Err(BoardError::MultipleEmpty(2)),
            "two gaps"
        );
        assert_eq!(
            PuzzleBoard::from_panels(2, vec![Panel::Tile(1); 4]),
            Err(BoardError::DuplicateTile(1)),
            "no gap, duplicates caught first"
        );
        assert_eq!(
            PuzzleBoard::from_panels(
                2,
                vec![Panel::Tile(1), Panel::Tile(2), Panel::Tile(3), Panel::Tile(0)]
            ),
            Err(BoardError::TileOutOfRange { tile: 0, max: 3 }),
            "zero is not a tile id"
        );
    }

    #[test]
    fn solved_detection() {
        assert!(board(&[1, 2, 3, 4, 5, 6, 7, 8, 0]).is_solved(), "canonical");
        assert!(!board(&[1, 2, 3, 4, 5, 6, 7, 0, 8]).is_solved(), "gap not last");
        assert!(!board(&[2, 1, 3, 4, 5, 6, 7, 8, 0]).is_solved(), "swapped pair");
        assert!(PuzzleBoard::solved(4).expect("4x4").is_solved(), "solved()");
    }

    #[test]
    fn slide_into_gap_then_back() {
        let mut b = board(&[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let original = b.clone();

        let moved = b.slide_tile(8, Direction::Left);
        assert_eq!(
            moved,
            Some(SlideMove {
                tile: 8,
                from: 8,
                to: 7
            }),
            "8 moves left into the gap"
        );
        assert!(b.is_solved(), "that move solves the board");

        assert!(b.slide_tile(8, Direction::Right).is_some(), "inverse move");
        assert_eq!(b, original, "round trip restores the board");
    }

    #[test]
    fn direction_must_point_at_the_gap() {
        let mut b = board(&[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let original = b.clone();
        assert_eq!(b.slide_tile(8, Direction::Up), None, "gap is not above 8");
        assert_eq!(b.slide_tile(8, Direction::Right), None, "off the board");
        assert_eq!(b.slide_tile(5, Direction::Left), None, "5 sits above the gap, not beside it");
        assert_eq!(b.slide_tile(4, Direction::Down), None, "4 would land on 7");
        assert_eq!(b.slide_tile(42, Direction::Down), None, "unknown tile");
        assert_eq!(b, original, "rejected moves leave the board untouched");
    }

    #[test]
    fn non_adjacent_tile_is_a_no_op() {
        let mut b = board(&[2, 1, 3, 4, 5, 6, 7, 8, 0]);
        let original = b.clone();
        assert_eq!(b.slide_tile(3, Direction::Left), None, "3 is far from the gap");
        assert_eq!(b.tap(0), None, "tap far from the gap");
        assert_eq!(b, original, "unchanged");
    }

    #[test]
    fn every_neighbour_of_the_gap_can_move_in() {
        let start = board(&[1, 2, 3, 4, 0, 5, 6, 7, 8]);
        for dir in Direction::iter() {
            let mut b = start.clone();
            let source = b
                .index_at(b.position(b.empty_index()) - dir.delta())
                .expect("centre gap has four neighbours");
            let tile = b.get(source);
            let moved = b.slide_index(source, dir).expect("adjacent move is legal");
            assert_eq!(moved.to, start.empty_index(), "{dir}: tile lands on the gap");
            assert_eq!(b.get(start.empty_index()), tile, "{dir}: tile exchanged");
            assert_eq!(b.empty_index(), source, "{dir}: gap exchanged");
        }
    }

    #[test]
    fn gap_relative_swipes() {
        let mut b = board(&[1, 2, 3, 4, 0, 5, 6, 7, 8]);
        let moved = b.slide_gap(Direction::Up).expect("tile below moves up");
        assert_eq!((moved.tile, moved.from, moved.to), (7, 7, 4), "7 moved up");

        let mut edge = board(&[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(edge.slide_gap(Direction::Up), None, "nothing below the last row");
        assert_eq!(edge.slide_gap(Direction::Left), None, "nothing right of the last column");
        assert!(edge.slide_gap(Direction::Right).is_some(), "8 moves right");
    }

    #[test]
    fn tap_moves_adjacent_tiles_only() {
        let mut b = board(&[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(b.tap(4).map(|m| m.tile), Some(5), "5 sits above the gap");
        assert_eq!(b.empty_index(), 4, "gap moved up");
        assert_eq!(b.tap(4), None, "tapping the gap does nothing");
        assert_eq!(b.tap(99), None, "out of range");
    }

    #[test]
    fn swap_ignores_adjacency() {
        let mut b = board(&[2, 1, 3, 4, 5, 6, 7, 8, 0]);
        assert!(b.swap(0, 1), "far or near, swaps are allowed");
        assert!(b.is_solved(), "swap fixed the board");
        assert!(!b.swap(3, 3), "same cell");
        assert!(!b.swap(3, 9), "out of range");

        assert!(b.swap(8, 0), "gap can be swapped too");
        assert_eq!(b.empty_index(), 0, "gap cache follows the swap");
    }

    #[test]
    fn parity_of_known_boards() {
        assert!(board(&[1, 2, 3, 4, 5, 6, 7, 8, 0]).is_solvable(), "solved 3x3");
        assert!(!board(&[2, 1, 3, 4, 5, 6, 7, 8, 0]).is_solvable(), "one transposition");
        assert!(
            !board(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 14, 0]).is_solvable(),
            "the classic 14-15 swap"
        );
        assert!(
            board(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]).is_solvable(),
            "one slide away"
        );
        assert!(board(&[1, 2, 0, 3]).is_solvable(), "2x2 one slide away");
    }

    #[test]
    fn display_renders_rows() {
        let b = board(&[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(b.to_string(), "1 2 3 \n4 5 6 \n7 8   \n", "3x3 layout");
    }
}
