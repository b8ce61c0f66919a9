use bevy::log::{debug, info};
use bevy::prelude::*;
use bits_helpers::restart::{RestartRequested, Restartable, handle_restart};
use strum::Display;

mod constellations;

pub use constellations::{CONSTELLATIONS, Constellation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SkyPhase {
    Tracing,
    /// Every star of the current constellation is on the path.
    Completed,
    /// The last constellation is done; only a restart leaves this.
    JourneyComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Extended { path_len: usize },
    Completed,
    /// Out of order. The path was cleared.
    Reset,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Constellation(usize),
    JourneyComplete,
    /// The current constellation is not finished yet.
    NotReady,
}

#[derive(Resource, Debug, Clone)]
pub struct StarlightSky {
    constellations: &'static [Constellation],
    level: usize,
    /// Star indices tapped so far, always a prefix of `0..star_count`.
    path: Vec<usize>,
    phase: SkyPhase,
}

impl Default for StarlightSky {
    fn default() -> Self {
        Self::new(&CONSTELLATIONS)
    }
}

impl StarlightSky {
    pub const fn new(constellations: &'static [Constellation]) -> Self {
        Self {
            constellations,
            level: 0,
            path: Vec::new(),
            phase: SkyPhase::Tracing,
        }
    }

    pub fn constellation(&self) -> Option<&Constellation> {
        self.constellations.get(self.level)
    }

    pub const fn level(&self) -> usize {
        self.level
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub const fn phase(&self) -> SkyPhase {
        self.phase
    }

    pub fn tap(&mut self, star: usize) -> TapOutcome {
        if self.phase != SkyPhase::Tracing {
            return TapOutcome::Ignored;
        }
        let Some(constellation) = self.constellations.get(self.level) else {
            return TapOutcome::Ignored;
        };
        if star != self.path.len() {
            debug!("Star {star} out of order, path cleared");
            self.path.clear();
            return TapOutcome::Reset;
        }
        self.path.push(star);
        if self.path.len() < constellation.star_count() {
            return TapOutcome::Extended {
                path_len: self.path.len(),
            };
        }
        info!("Charted {}", constellation.name);
        self.phase = SkyPhase::Completed;
        TapOutcome::Completed
    }

    pub fn next_level(&mut self) -> Advance {
        if self.phase != SkyPhase::Completed {
            return Advance::NotReady;
        }
        if self.level + 1 >= self.constellations.len() {
            info!("Journey complete after {} constellations", self.level + 1);
            self.phase = SkyPhase::JourneyComplete;
            return Advance::JourneyComplete;
        }
        self.level += 1;
        self.path.clear();
        self.phase = SkyPhase::Tracing;
        Advance::Constellation(self.level)
    }

    /// Pairs of star positions joined by the path, for line drawing.
    pub fn segments(&self) -> Vec<(Vec2, Vec2)> {
        let Some(constellation) = self.constellation() else {
            return Vec::new();
        };
        self.path
            .windows(2)
            .filter_map(|pair| match *pair {
                [from, to] => Some((constellation.star(from)?, constellation.star(to)?)),
                _ => None,
            })
            .collect()
    }
}

impl Restartable for StarlightSky {
    type State = (usize, SkyPhase);

    fn reset(&mut self) {
        self.level = 0;
        self.path.clear();
        self.phase = SkyPhase::Tracing;
    }

    fn initial_state() -> Self::State {
        (0, SkyPhase::Tracing)
    }

    fn state(&self) -> Self::State {
        (self.level, self.phase)
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarInput {
    Tap(usize),
    NextLevel,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarOutcome {
    Tapped(TapOutcome),
    Advanced(Advance),
}

pub struct StarlightPlugin;

impl Plugin for StarlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StarlightSky>()
            .add_event::<StarInput>()
            .add_event::<StarOutcome>()
            .add_event::<RestartRequested>()
            .add_systems(
                Update,
                (handle_restart::<StarlightSky>, apply_star_inputs).chain(),
            );
    }
}

fn apply_star_inputs(
    mut inputs: EventReader<StarInput>,
    mut sky: ResMut<StarlightSky>,
    mut outcomes: EventWriter<StarOutcome>,
) {
    for input in inputs.read() {
        let outcome = match *input {
            StarInput::Tap(star) => StarOutcome::Tapped(sky.tap(star)),
            StarInput::NextLevel => StarOutcome::Advanced(sky.next_level()),
        };
        outcomes.send(outcome);
    }
}
