use bevy::prelude::*;

use crate::Direction;

/// Minimum travel, in logical pixels, before a drag counts as a swipe.
pub const SWIPE_THRESHOLD: f32 = 20.;

/// Resolves a drag translation (screen space, y pointing down) into a swipe.
///
/// The dominant axis wins. Ties between the axes and drags that do not travel
/// further than `threshold` along the dominant axis are not swipes.
pub fn classify_swipe(translation: Vec2, threshold: f32) -> Option<Direction> {
    let (ax, ay) = (translation.x.abs(), translation.y.abs());
    if ax > ay && ax > threshold {
        Some(if translation.x > 0. {
            Direction::Right
        } else {
            Direction::Left
        })
    } else if ay > ax && ay > threshold {
        Some(if translation.y > 0. {
            Direction::Down
        } else {
            Direction::Up
        })
    } else {
        None
    }
}

/// Tracks a press/release pair and turns it into a swipe on release.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwipeTracker {
    pressed_at: Option<Vec2>,
}

impl SwipeTracker {
    pub fn press(&mut self, position: Vec2) {
        self.pressed_at = Some(position);
    }

    pub fn release(&mut self, position: Vec2) -> Option<Direction> {
        let start = self.pressed_at.take()?;
        classify_swipe(position - start, SWIPE_THRESHOLD)
    }

    pub const fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}
