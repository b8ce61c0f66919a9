use std::sync::Arc;

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use bits_helpers::player::PlayerIdentity;
use bits_helpers::restart::Restartable;
use bits_helpers::{Direction, LeaderboardSink, ScoreSubmission};
use strum::Display;

use crate::board::{BoardError, PuzzleBoard, SlideMove};
use crate::config::{PuzzleConfig, ScoringRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionPhase {
    /// Waiting for a level to start.
    Idle,
    Playing,
    Solved,
    TimedOut,
    /// No further levels; only a restart leaves this.
    GameOver,
}

/// Booster selection progress while swap mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapMode {
    #[default]
    Off,
    Armed,
    Holding(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { slide: SlideMove, solved: bool },
    /// Illegal for the current board. Nothing changed.
    Rejected,
    /// The session does not take slides right now. Nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Selected(usize),
    Deselected,
    Swapped {
        first: usize,
        second: usize,
        solved: bool,
    },
    /// No booster, wrong phase, or bad indices. Nothing changed.
    Refused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { time_left: u32 },
    TimedOut,
    /// No clock, or no level in play.
    Inactive,
}

/// State of one player's run through the puzzle levels.
#[derive(Resource, Clone)]
pub struct PuzzleSession {
    config: PuzzleConfig,
    player: PlayerIdentity,
    leaderboard: Arc<dyn LeaderboardSink>,
    rng: fastrand::Rng,
    board: PuzzleBoard,
    phase: SessionPhase,
    level: u32,
    moves: u32,
    boosters: u32,
    swap_mode: SwapMode,
    time_left: Option<u32>,
    score: u32,
}

impl PuzzleSession {
    pub fn new(
        config: PuzzleConfig,
        player: PlayerIdentity,
        leaderboard: Arc<dyn LeaderboardSink>,
    ) -> Result<Self, BoardError> {
        let board = PuzzleBoard::solved(config.grid_size)?;
        Ok(Self {
            rng: config.rng(),
            boosters: config.boosters,
            config,
            player,
            leaderboard,
            board,
            phase: SessionPhase::Idle,
            level: 1,
            moves: 0,
            swap_mode: SwapMode::Off,
            time_left: None,
            score: 0,
        })
    }

    pub const fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub const fn player(&self) -> &PlayerIdentity {
        &self.player
    }

    pub const fn board(&self) -> &PuzzleBoard {
        &self.board
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn moves(&self) -> u32 {
        self.moves
    }

    pub const fn boosters(&self) -> u32 {
        self.boosters
    }

    pub const fn swap_mode(&self) -> SwapMode {
        self.swap_mode
    }

    pub const fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub fn is_solved(&self) -> bool {
        self.board.is_solved()
    }

    /// Deals a new board for the current level. Only valid while idle.
    pub fn start_level(&mut self) -> bool {
        if !self.can_start_level() {
            return false;
        }
        let board = self.board.reshuffled(self.config.shuffle, &mut self.rng);
        self.start_level_with(board)
    }

    /// Starts the current level on a prepared board of the configured size.
    pub fn start_level_with(&mut self, board: PuzzleBoard) -> bool {
        if !self.can_start_level() {
            return false;
        }
        if board.size() != self.config.grid_size {
            warn!(
                "Refusing a {0}x{0} board for a {1}x{1} game",
                board.size(),
                self.config.grid_size
            );
            return false;
        }
        self.board = board;
        self.moves = 0;
        self.swap_mode = SwapMode::Off;
        self.time_left = self.config.countdown.map(|c| c.budget_for(self.level));
        self.phase = SessionPhase::Playing;
        info!(
            "Level {} started, {} seconds on the clock\n{}",
            self.level,
            self.time_left
                .map_or_else(|| "no".to_owned(), |t| t.to_string()),
            self.board
        );
        if self.board.is_solved() {
            self.finish_level();
        }
        true
    }

    /// Slides a numbered tile one step in `direction`.
    pub fn slide_tile(&mut self, tile: u16, direction: Direction) -> MoveOutcome {
        self.apply_slide(|board| board.slide_tile(tile, direction))
    }

    /// Swipe relative to the gap: the neighbour opposite `direction` moves in.
    pub fn slide_gap(&mut self, direction: Direction) -> MoveOutcome {
        self.apply_slide(|board| board.slide_gap(direction))
    }

    /// Tap-to-slide on the cell at `index`.
    pub fn tap(&mut self, index: usize) -> MoveOutcome {
        self.apply_slide(|board| board.tap(index))
    }

    /// Enters swap mode when a booster is left, or leaves it. Returns whether
    /// swap mode is on afterwards.
    pub fn toggle_swap_mode(&mut self) -> bool {
        self.swap_mode = match self.swap_mode {
            SwapMode::Off if self.phase == SessionPhase::Playing && self.boosters > 0 => {
                SwapMode::Armed
            }
            _ => SwapMode::Off,
        };
        self.swap_mode != SwapMode::Off
    }

    /// Feeds a tap to the booster selection while swap mode is on.
    pub fn select_for_swap(&mut self, index: usize) -> SwapOutcome {
        if index >= self.board.len() {
            return SwapOutcome::Refused;
        }
        match self.swap_mode {
            SwapMode::Off => SwapOutcome::Refused,
            SwapMode::Armed => {
                self.swap_mode = SwapMode::Holding(index);
                SwapOutcome::Selected(index)
            }
            SwapMode::Holding(first) if first == index => {
                self.swap_mode = SwapMode::Armed;
                SwapOutcome::Deselected
            }
            SwapMode::Holding(first) => self.booster_swap(first, index),
        }
    }

    /// Spends a booster to exchange two cells regardless of adjacency.
    pub fn booster_swap(&mut self, first: usize, second: usize) -> SwapOutcome {
        if self.phase != SessionPhase::Playing || self.boosters == 0 {
            return SwapOutcome::Refused;
        }
        if !self.board.swap(first, second) {
            return SwapOutcome::Refused;
        }
        self.boosters -= 1;
        self.swap_mode = SwapMode::Off;
        debug!(
            "Booster swap {first} <-> {second}, {} left",
            self.boosters
        );
        let solved = self.board.is_solved();
        if solved {
            self.finish_level();
        }
        SwapOutcome::Swapped {
            first,
            second,
            solved,
        }
    }

    /// One real-time second of the level clock.
    pub fn tick_second(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Playing {
            return TickOutcome::Inactive;
        }
        let Some(time_left) = self.time_left.as_mut() else {
            return TickOutcome::Inactive;
        };
        *time_left = time_left.saturating_sub(1);
        if *time_left > 0 {
            return TickOutcome::Running {
                time_left: *time_left,
            };
        }
        self.phase = SessionPhase::TimedOut;
        self.swap_mode = SwapMode::Off;
        info!("Level {} timed out, score {}", self.level, self.score);
        TickOutcome::TimedOut
    }

    /// Leaves a finished level: on to the next one, or game over.
    pub fn advance_level(&mut self) -> SessionPhase {
        match self.phase {
            SessionPhase::Solved
                if self
                    .config
                    .max_levels
                    .is_none_or(|max| self.level < max) =>
            {
                self.level += 1;
                self.phase = SessionPhase::Idle;
            }
            SessionPhase::Solved | SessionPhase::TimedOut => {
                self.phase = SessionPhase::GameOver;
                info!("Game over after level {}, score {}", self.level, self.score);
            }
            SessionPhase::Idle | SessionPhase::Playing | SessionPhase::GameOver => {}
        }
        self.phase
    }

    fn can_start_level(&self) -> bool {
        if self.phase != SessionPhase::Idle {
            warn!("Cannot start level {} while {}", self.level, self.phase);
            return false;
        }
        true
    }

    fn apply_slide(
        &mut self,
        slide: impl FnOnce(&mut PuzzleBoard) -> Option<SlideMove>,
    ) -> MoveOutcome {
        if self.phase != SessionPhase::Playing || self.swap_mode != SwapMode::Off {
            return MoveOutcome::Ignored;
        }
        let Some(slide) = slide(&mut self.board) else {
            return MoveOutcome::Rejected;
        };
        self.moves += 1;
        debug!(
            "Tile {} moved {} -> {}, {} moves",
            slide.tile, slide.from, slide.to, self.moves
        );
        let solved = self.board.is_solved();
        if solved {
            self.finish_level();
        }
        MoveOutcome::Moved { slide, solved }
    }

    fn finish_level(&mut self) {
        self.phase = SessionPhase::Solved;
        self.swap_mode = SwapMode::Off;
        let qualifies = match self.config.scoring {
            ScoringRule::FewestMoves => {
                self.score = self.moves;
                self.moves > 0
            }
            ScoringRule::TimeBonus { points_per_second } => {
                let bonus = self
                    .time_left
                    .unwrap_or(0)
                    .saturating_mul(points_per_second);
                self.score = self.score.saturating_add(bonus);
                self.score > 0
            }
        };
        info!(
            "Level {} solved in {} moves, score {}",
            self.level, self.moves, self.score
        );
        if qualifies {
            self.leaderboard.submit(ScoreSubmission {
                game: self.config.game_id.clone(),
                player_id: self.player.id.clone(),
                player_name: self.player.leaderboard_name(),
                score: self.score,
                order: self.config.scoring.order(),
            });
        }
    }
}

impl Restartable for PuzzleSession {
    type State = SessionPhase;

    fn reset(&mut self) {
        info!("Restarting {}", self.config.game_id);
        self.phase = SessionPhase::Idle;
        self.level = 1;
        self.moves = 0;
        self.score = 0;
        self.boosters = self.config.boosters;
        self.swap_mode = SwapMode::Off;
        self.time_left = None;
    }

    fn initial_state() -> SessionPhase {
        SessionPhase::Idle
    }

    fn state(&self) -> SessionPhase {
        self.phase
    }
}
