use bits_helpers::ScoreOrder;
use serde::{Deserialize, Serialize};

use crate::board::ShuffleStrategy;

/// Per-level time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// Seconds on the clock for level 1.
    pub initial_secs: u32,
    /// Seconds taken off for each level after the first.
    pub decrement_per_level: u32,
    /// The budget never shrinks below this.
    pub minimum_secs: u32,
}

impl Countdown {
    pub fn budget_for(&self, level: u32) -> u32 {
        let cut = level
            .saturating_sub(1)
            .saturating_mul(self.decrement_per_level);
        self.initial_secs
            .saturating_sub(cut)
            .max(self.minimum_secs)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            initial_secs: 60,
            decrement_per_level: 5,
            minimum_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringRule {
    /// The score is the move count of the solved level.
    FewestMoves,
    /// Each solved level adds the seconds left on the clock times this.
    TimeBonus { points_per_second: u32 },
}

impl ScoringRule {
    pub const fn order(self) -> ScoreOrder {
        match self {
            Self::FewestMoves => ScoreOrder::LowerIsBetter,
            Self::TimeBonus { .. } => ScoreOrder::HigherIsBetter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Leaderboard key the scores are filed under.
    pub game_id: String,
    pub grid_size: usize,
    /// Swap-assist charges granted at the start of a game.
    pub boosters: u32,
    pub shuffle: ShuffleStrategy,
    /// `None` plays without a clock.
    pub countdown: Option<Countdown>,
    pub scoring: ScoringRule,
    /// `None` keeps handing out levels forever.
    pub max_levels: Option<u32>,
    /// Fixed seed for reproducible boards.
    pub seed: Option<u64>,
}

impl PuzzleConfig {
    /// Untimed 3x3 with three swap boosters, ranked by fewest moves.
    pub fn zen_slide() -> Self {
        Self {
            game_id: "zen_slide".to_owned(),
            grid_size: 3,
            boosters: 3,
            shuffle: ShuffleStrategy::Uniform,
            countdown: None,
            scoring: ScoringRule::FewestMoves,
            max_levels: None,
            seed: None,
        }
    }

    /// Timed 3x3 levels that get shorter, scored on time left.
    pub fn dulce_flow() -> Self {
        Self {
            game_id: "dulce_flow".to_owned(),
            grid_size: 3,
            boosters: 0,
            shuffle: ShuffleStrategy::Uniform,
            countdown: Some(Countdown::default()),
            scoring: ScoringRule::TimeBonus {
                points_per_second: 10,
            },
            max_levels: None,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn rng(&self) -> fastrand::Rng {
        self.seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self::zen_slide()
    }
}
