use bevy::log::{debug, info};
use bevy::prelude::*;
use bits_helpers::Direction;
use bits_helpers::input::{SWIPE_THRESHOLD, classify_swipe};
use bits_helpers::restart::{RestartRequested, Restartable, handle_restart};

mod maze;

pub use maze::{CollisionFlags, MazeError, MazeLayout};

pub const LEVELS: [&[&str]; 3] = [
    &["S..#G", "##.#.", ".....", ".####", "....."],
    &["...#S", ".#.#.", ".#...", ".###.", "G...."],
    &[
        "S.#...", "..#.#.", "#.#.#.", "#...#G", "###.##", "....#.",
    ],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    Moved { to: IVec2, won: bool },
    /// A wall or the edge is right there. Not counted.
    Blocked,
    /// The level is already won.
    Ignored,
}

#[derive(Resource, Debug, Clone)]
pub struct MazeRun {
    levels: Vec<MazeLayout>,
    level: usize,
    wisp: IVec2,
    swipes: u32,
    won: bool,
}

impl MazeRun {
    pub fn new() -> Result<Self, MazeError> {
        Self::with_levels(&LEVELS)
    }

    pub fn with_levels(rows: &[&[&str]]) -> Result<Self, MazeError> {
        let levels = rows
            .iter()
            .map(|level| MazeLayout::parse(level))
            .collect::<Result<Vec<_>, _>>()?;
        let first = levels.first().ok_or(MazeError::Empty)?;
        Ok(Self {
            wisp: first.start(),
            levels,
            level: 0,
            swipes: 0,
            won: false,
        })
    }

    pub fn layout(&self) -> Option<&MazeLayout> {
        self.levels.get(self.level)
    }

    /// Zero-based index of the current maze.
    pub const fn level(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub const fn wisp(&self) -> IVec2 {
        self.wisp
    }

    pub const fn swipes(&self) -> u32 {
        self.swipes
    }

    pub const fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_last_level(&self) -> bool {
        self.level + 1 >= self.levels.len()
    }

    pub fn slide(&mut self, dir: Direction) -> SlideOutcome {
        if self.won {
            return SlideOutcome::Ignored;
        }
        let Some(layout) = self.levels.get(self.level) else {
            return SlideOutcome::Ignored;
        };
        let to = layout.slide_from(self.wisp, dir);
        if to == self.wisp {
            return SlideOutcome::Blocked;
        }
        self.wisp = to;
        self.swipes += 1;
        self.won = to == layout.goal();
        if self.won {
            info!("Maze {} found in {} swipes", self.level + 1, self.swipes);
        }
        SlideOutcome::Moved { to, won: self.won }
    }

    /// Moves on to the next maze, starting over from the first after the last.
    pub fn next_level(&mut self) {
        self.level = if self.is_last_level() {
            0
        } else {
            self.level + 1
        };
        debug!("Entering maze {}", self.level + 1);
        self.enter_level();
    }

    fn enter_level(&mut self) {
        if let Some(layout) = self.levels.get(self.level) {
            self.wisp = layout.start();
        }
        self.swipes = 0;
        self.won = false;
    }
}

impl Restartable for MazeRun {
    type State = (usize, u32, bool);

    fn reset(&mut self) {
        self.level = 0;
        self.enter_level();
    }

    fn initial_state() -> Self::State {
        (0, 0, false)
    }

    fn state(&self) -> Self::State {
        (self.level, self.swipes, self.won)
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum MazeInput {
    Swipe(Direction),
    /// Drag translation in screen space; short drags are dropped.
    Drag(Vec2),
    NextLevel,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeOutcome {
    WispMoved(IVec2),
    Won { level: usize, swipes: u32 },
    LevelEntered(usize),
}

pub struct WillowispPlugin {
    run: MazeRun,
}

impl WillowispPlugin {
    pub fn new() -> Result<Self, MazeError> {
        Ok(Self {
            run: MazeRun::new()?,
        })
    }
}

impl Plugin for WillowispPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.run.clone())
            .add_event::<MazeInput>()
            .add_event::<MazeOutcome>()
            .add_event::<RestartRequested>()
            .add_systems(
                Update,
                (handle_restart::<MazeRun>, apply_maze_inputs).chain(),
            );
    }
}

fn apply_maze_inputs(
    mut inputs: EventReader<MazeInput>,
    mut run: ResMut<MazeRun>,
    mut outcomes: EventWriter<MazeOutcome>,
) {
    for input in inputs.read() {
        let dir = match *input {
            MazeInput::Swipe(dir) => dir,
            MazeInput::Drag(translation) => match classify_swipe(translation, SWIPE_THRESHOLD) {
                Some(dir) => dir,
                None => continue,
            },
            MazeInput::NextLevel => {
                if run.is_won() {
                    run.next_level();
                    outcomes.send(MazeOutcome::LevelEntered(run.level()));
                }
                continue;
            }
        };
        if let SlideOutcome::Moved { to, won } = run.slide(dir) {
            outcomes.send(MazeOutcome::WispMoved(to));
            if won {
                outcomes.send(MazeOutcome::Won {
                    level: run.level(),
                    swipes: run.swipes(),
                });
            }
        }
    }
}
