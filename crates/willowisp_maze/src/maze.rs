use std::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use bitflags::bitflags;
use bits_helpers::Direction;
use thiserror::Error;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CollisionFlags: u32 {
        const NOCOL = 0x00000000;
        const COL_U = 0x00000001;
        const COL_D = 0x00000002;
        const COL_L = 0x00000004;
        const COL_R = 0x00000008;
    }
}

impl CollisionFlags {
    pub const fn blocking(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::COL_U,
            Direction::Down => Self::COL_D,
            Direction::Left => Self::COL_L,
            Direction::Right => Self::COL_R,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("Maze layout has no rows")]
    Empty,

    #[error("Row {row} has {actual} cells, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown cell symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },

    #[error("Maze layout has no start cell")]
    MissingStart,

    #[error("Maze layout has no goal cell")]
    MissingGoal,

    #[error("Maze layout has more than one {0:?} cell")]
    Duplicate(char),
}

/// A square maze parsed from text rows: `.` open, `#` wall, `S` start, `G` goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeLayout {
    size: usize,
    walls: Vec<bool>,
    tiles: Vec<CollisionFlags>,
    start: IVec2,
    goal: IVec2,
}

impl MazeLayout {
    pub fn parse(rows: &[&str]) -> Result<Self, MazeError> {
        let size = rows.len();
        if size == 0 {
            return Err(MazeError::Empty);
        }
        let mut walls = Vec::with_capacity(size * size);
        let mut start = None;
        let mut goal = None;
        for (y, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.chars().collect();
            if cells.len() != size {
                return Err(MazeError::NotSquare {
                    row: y,
                    expected: size,
                    actual: cells.len(),
                });
            }
            for (x, symbol) in cells.into_iter().enumerate() {
                let pos = IVec2::new(x as i32, y as i32);
                let marker = match symbol {
                    '.' => None,
                    '#' => {
                        walls.push(true);
                        continue;
                    }
                    'S' => Some(&mut start),
                    'G' => Some(&mut goal),
                    _ => {
                        return Err(MazeError::UnknownSymbol {
                            symbol,
                            row: y,
                            col: x,
                        });
                    }
                };
                if let Some(slot) = marker {
                    if slot.replace(pos).is_some() {
                        return Err(MazeError::Duplicate(symbol));
                    }
                }
                walls.push(false);
            }
        }
        let mut layout = Self {
            size,
            tiles: vec![CollisionFlags::NOCOL; size * size],
            walls,
            start: start.ok_or(MazeError::MissingStart)?,
            goal: goal.ok_or(MazeError::MissingGoal)?,
        };
        layout.compress();
        Ok(layout)
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn start(&self) -> IVec2 {
        self.start
    }

    pub const fn goal(&self) -> IVec2 {
        self.goal
    }

    pub fn is_wall(&self, pos: IVec2) -> bool {
        self.index(pos)
            .and_then(|i| self.walls.get(i))
            .copied()
            .unwrap_or(true)
    }

    pub fn can_go(&self, src: IVec2, dir: Direction) -> bool {
        self.index(src)
            .and_then(|i| self.tiles.get(i))
            .is_some_and(|tile| !tile.contains(CollisionFlags::blocking(dir)))
    }

    /// Where a wisp starting at `from` comes to rest when pushed toward `dir`.
    pub fn slide_from(&self, from: IVec2, dir: Direction) -> IVec2 {
        let mut pos = from;
        while self.can_go(pos, dir) {
            pos += dir.delta();
        }
        pos
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        let size = self.size as i32;
        if pos.x < 0 || pos.y < 0 || pos.x >= size || pos.y >= size {
            return None;
        }
        Some(pos.x as usize + pos.y as usize * self.size)
    }

    // Turns the wall grid into per-cell collision flags, the border counting as wall.
    fn compress(&mut self) {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let pos = IVec2::new(x, y);
                let mut col = CollisionFlags::NOCOL;
                for dir in [
                    Direction::Up,
                    Direction::Down,
                    Direction::Left,
                    Direction::Right,
                ] {
                    if self.is_wall(pos + dir.delta()) {
                        col |= CollisionFlags::blocking(dir);
                    }
                }
                if let Some(tile) = self.index(pos).and_then(|i| self.tiles.get_mut(i)) {
                    *tile = col;
                }
            }
        }
    }
}

impl Display for MazeLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let pos = IVec2::new(x, y);
                let symbol = if pos == self.start {
                    'S'
                } else if pos == self.goal {
                    'G'
                } else if self.is_wall(pos) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
