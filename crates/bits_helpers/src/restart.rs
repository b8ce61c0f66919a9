use bevy::prelude::*;

/// Sent by the host when the player asks to start over.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestartRequested;

pub trait Restartable {
    type State: Copy + Eq + core::fmt::Debug;

    /// Drops all progress and returns to the first level.
    fn reset(&mut self);
    fn initial_state() -> Self::State;
    fn state(&self) -> Self::State;
}

pub fn handle_restart<T: Restartable + Resource>(
    mut requests: EventReader<RestartRequested>,
    mut restartable: ResMut<T>,
) {
    if requests.read().count() > 0 {
        restartable.reset();
        debug_assert_eq!(
            restartable.state(),
            T::initial_state(),
            "reset must land in the initial state"
        );
    }
}
