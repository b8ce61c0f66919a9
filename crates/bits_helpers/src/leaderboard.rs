use core::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use bevy::log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Which way a leaderboard ranks its scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    /// Fewest moves and similar: smaller is better.
    LowerIsBetter,
    /// Points: bigger is better.
    HigherIsBetter,
}

impl ScoreOrder {
    /// Orders `a` before `b` when `a` is the better score.
    pub fn compare(self, a: u32, b: u32) -> Ordering {
        match self {
            Self::LowerIsBetter => a.cmp(&b),
            Self::HigherIsBetter => b.cmp(&a),
        }
    }

    pub fn is_better(self, candidate: u32, current: u32) -> bool {
        self.compare(candidate, current) == Ordering::Less
    }
}

/// A finished score on its way to the hosted leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub game: String,
    pub player_id: String,
    pub player_name: String,
    pub score: u32,
    pub order: ScoreOrder,
}

/// Receives finished scores. Delivery is fire-and-forget: implementations
/// swallow their own failures and games never wait on them.
pub trait LeaderboardSink: Send + Sync + 'static {
    fn submit(&self, submission: ScoreSubmission);
}

impl LeaderboardSink for Sender<ScoreSubmission> {
    fn submit(&self, submission: ScoreSubmission) {
        if let Err(err) = self.send(submission) {
            warn!("Score dropped, leaderboard receiver is gone: {:?}", err.0);
        }
    }
}

/// Shared in-process queue; the host drains it and forwards to the backend.
#[derive(Debug, Clone, Default)]
pub struct ScoreQueue {
    pending: Arc<Mutex<Vec<ScoreSubmission>>>,
}

impl ScoreQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<ScoreSubmission> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl LeaderboardSink for ScoreQueue {
    fn submit(&self, submission: ScoreSubmission) {
        debug!(
            "Queued {} score {} for {}",
            submission.game, submission.score, submission.player_name
        );
        self.pending.lock().push(submission);
    }
}

/// How a local leaderboard keeps entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsPolicy {
    /// One row per player holding their best score.
    BestPerPlayer,
    /// Every submission is its own row.
    AllEntries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub player_id: String,
    pub player_name: String,
    pub score: u32,
}

/// A local mirror of a hosted leaderboard, fed from submissions.
#[derive(Debug, Clone)]
pub struct Standings {
    order: ScoreOrder,
    policy: StandingsPolicy,
    entries: Vec<Standing>,
    best_index: HashMap<String, usize>,
}

impl Standings {
    pub fn new(order: ScoreOrder, policy: StandingsPolicy) -> Self {
        Self {
            order,
            policy,
            entries: Vec::new(),
            best_index: HashMap::new(),
        }
    }

    /// Fewest-moves board: best per player, ascending.
    pub fn fewest_moves() -> Self {
        Self::new(ScoreOrder::LowerIsBetter, StandingsPolicy::BestPerPlayer)
    }

    /// Points board: every run counts, descending.
    pub fn high_scores() -> Self {
        Self::new(ScoreOrder::HigherIsBetter, StandingsPolicy::AllEntries)
    }

    /// Records a submission. Returns false when it was discarded because
    /// the player already holds a score at least as good.
    pub fn record(&mut self, submission: &ScoreSubmission) -> bool {
        let entry = Standing {
            player_id: submission.player_id.clone(),
            player_name: submission.player_name.clone(),
            score: submission.score,
        };
        match self.policy {
            StandingsPolicy::AllEntries => {
                self.entries.push(entry);
                true
            }
            StandingsPolicy::BestPerPlayer => {
                let existing = self
                    .best_index
                    .get(&submission.player_id)
                    .and_then(|&i| self.entries.get_mut(i));
                match existing {
                    Some(current) if !self.order.is_better(entry.score, current.score) => false,
                    Some(current) => {
                        *current = entry;
                        true
                    }
                    None => {
                        self.best_index
                            .insert(entry.player_id.clone(), self.entries.len());
                        self.entries.push(entry);
                        true
                    }
                }
            }
        }
    }

    pub fn top(&self, n: usize) -> Vec<Standing> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| self.order.compare(a.score, b.score));
        sorted.truncate(n);
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
