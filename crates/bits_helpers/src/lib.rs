mod direction;
pub use direction::*;

pub mod input;
pub mod player;
pub mod progress;
pub mod restart;

mod leaderboard;
pub use leaderboard::*;
