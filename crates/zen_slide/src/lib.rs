use std::sync::Arc;

use bevy::prelude::*;
use bits_helpers::player::PlayerIdentity;
use bits_helpers::restart::{RestartRequested, handle_restart};
use bits_helpers::input::{SWIPE_THRESHOLD, classify_swipe};
use bits_helpers::{Direction, LeaderboardSink};

pub mod board;
pub mod config;
pub mod session;

pub use board::{BoardError, Panel, PuzzleBoard, ShuffleStrategy, SlideMove};
pub use config::{Countdown, PuzzleConfig, ScoringRule};
pub use session::{MoveOutcome, PuzzleSession, SessionPhase, SwapMode, SwapOutcome, TickOutcome};

/// Player intent, sent by whatever screen presents the puzzle.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PuzzleInput {
    StartLevel,
    SlideTile { tile: u16, direction: Direction },
    SlideGap(Direction),
    /// Raw drag translation in screen space, slides the gap's neighbour.
    Swipe(Vec2),
    /// Slides the tapped tile, or picks it while swap mode is on.
    Tap(usize),
    ToggleSwapMode,
    AdvanceLevel,
}

/// What the session did with the inputs, for the presenting screen.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    LevelStarted { level: u32, time_left: Option<u32> },
    Moved(SlideMove),
    Swapped { first: usize, second: usize },
    Solved { level: u32, moves: u32, score: u32 },
    TimedOut { level: u32 },
    GameOver { score: u32 },
}

/// Fires once per second of play.
#[derive(Resource)]
pub struct LevelCountdown {
    timer: Timer,
}

impl Default for LevelCountdown {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1., TimerMode::Repeating),
        }
    }
}

pub struct ZenSlidePlugin {
    session: PuzzleSession,
}

impl ZenSlidePlugin {
    pub fn new(
        config: PuzzleConfig,
        player: PlayerIdentity,
        leaderboard: impl LeaderboardSink,
    ) -> Result<Self, BoardError> {
        Self::with_shared_sink(config, player, Arc::new(leaderboard))
    }

    pub fn with_shared_sink(
        config: PuzzleConfig,
        player: PlayerIdentity,
        leaderboard: Arc<dyn LeaderboardSink>,
    ) -> Result<Self, BoardError> {
        Ok(Self {
            session: PuzzleSession::new(config, player, leaderboard)?,
        })
    }
}

impl Plugin for ZenSlidePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.session.clone())
            .init_resource::<LevelCountdown>()
            .add_event::<PuzzleInput>()
            .add_event::<PuzzleOutcome>()
            .add_event::<RestartRequested>()
            .add_systems(
                Update,
                (
                    handle_restart::<PuzzleSession>,
                    apply_puzzle_inputs,
                    tick_level_countdown,
                )
                    .chain(),
            );
    }
}

fn apply_puzzle_inputs(
    mut inputs: EventReader<PuzzleInput>,
    mut session: ResMut<PuzzleSession>,
    mut countdown: ResMut<LevelCountdown>,
    mut outcomes: EventWriter<PuzzleOutcome>,
) {
    for input in inputs.read() {
        match *input {
            PuzzleInput::StartLevel => {
                if session.start_level() {
                    countdown.timer.reset();
                    outcomes.send(PuzzleOutcome::LevelStarted {
                        level: session.level(),
                        time_left: session.time_left(),
                    });
                }
            }
            PuzzleInput::SlideTile { tile, direction } => {
                let outcome = session.slide_tile(tile, direction);
                report_move(&session, outcome, &mut outcomes);
            }
            PuzzleInput::SlideGap(direction) => {
                let outcome = session.slide_gap(direction);
                report_move(&session, outcome, &mut outcomes);
            }
            PuzzleInput::Swipe(translation) => {
                let Some(direction) = classify_swipe(translation, SWIPE_THRESHOLD) else {
                    continue;
                };
                let outcome = session.slide_gap(direction);
                report_move(&session, outcome, &mut outcomes);
            }
            PuzzleInput::Tap(index) if session.swap_mode() != SwapMode::Off => {
                if let SwapOutcome::Swapped {
                    first,
                    second,
                    solved,
                } = session.select_for_swap(index)
                {
                    outcomes.send(PuzzleOutcome::Swapped { first, second });
                    if solved {
                        report_solved(&session, &mut outcomes);
                    }
                }
            }
            PuzzleInput::Tap(index) => {
                let outcome = session.tap(index);
                report_move(&session, outcome, &mut outcomes);
            }
            PuzzleInput::ToggleSwapMode => {
                session.toggle_swap_mode();
            }
            PuzzleInput::AdvanceLevel => {
                let was_over = session.phase() == SessionPhase::GameOver;
                if session.advance_level() == SessionPhase::GameOver && !was_over {
                    outcomes.send(PuzzleOutcome::GameOver {
                        score: session.score(),
                    });
                }
            }
        }
    }
}

fn report_move(
    session: &PuzzleSession,
    outcome: MoveOutcome,
    outcomes: &mut EventWriter<PuzzleOutcome>,
) {
    if let MoveOutcome::Moved { slide, solved } = outcome {
        outcomes.send(PuzzleOutcome::Moved(slide));
        if solved {
            report_solved(session, outcomes);
        }
    }
}

fn report_solved(session: &PuzzleSession, outcomes: &mut EventWriter<PuzzleOutcome>) {
    outcomes.send(PuzzleOutcome::Solved {
        level: session.level(),
        moves: session.moves(),
        score: session.score(),
    });
}

fn tick_level_countdown(
    time: Res<Time>,
    mut countdown: ResMut<LevelCountdown>,
    mut session: ResMut<PuzzleSession>,
    mut outcomes: EventWriter<PuzzleOutcome>,
) {
    // The clock only runs for a level in play, so a finished or abandoned
    // level can never be ticked.
    if session.phase() != SessionPhase::Playing || session.time_left().is_none() {
        return;
    }
    countdown.timer.tick(time.delta());
    for _ in 0..countdown.timer.times_finished_this_tick() {
        if session.tick_second() == TickOutcome::TimedOut {
            outcomes.send(PuzzleOutcome::TimedOut {
                level: session.level(),
            });
            break;
        }
    }
}
