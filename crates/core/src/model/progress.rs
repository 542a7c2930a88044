use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::GameId;

//
// ─── STAR RULE ─────────────────────────────────────────────────────────────────
//

/// Derive a 0–3 star rating from an accuracy score.
///
/// The thresholds are inclusive: exactly 90, 70 and 50 map to the higher
/// tier. This is the sole scoring rule in the app; everything else (totals,
/// per-game sums, reward display) is derived from its output.
///
/// # Examples
///
/// ```
/// # use sprout_core::model::stars_from_accuracy;
/// assert_eq!(stars_from_accuracy(95.0), 3);
/// assert_eq!(stars_from_accuracy(90.0), 3);
/// assert_eq!(stars_from_accuracy(70.0), 2);
/// assert_eq!(stars_from_accuracy(50.0), 1);
/// assert_eq!(stars_from_accuracy(49.9), 0);
/// ```
#[must_use]
pub fn stars_from_accuracy(accuracy: f64) -> u8 {
    if accuracy >= 90.0 {
        3
    } else if accuracy >= 70.0 {
        2
    } else if accuracy >= 50.0 {
        1
    } else {
        0
    }
}

//
// ─── LEVEL PROGRESS ────────────────────────────────────────────────────────────
//

/// Per-level completion state. Created on the first completion report for a
/// level and never removed.
///
/// `best_accuracy` and `stars` only ratchet upward; `completed` never
/// reverts. The terminal state is `completed` with three stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub best_accuracy: f64,
    #[serde(default)]
    pub stars: u8,
    #[serde(default)]
    pub attempts: u32,
}

impl LevelProgress {
    /// State after the very first completion report for a level.
    #[must_use]
    pub fn first_attempt(accuracy: f64) -> Self {
        Self {
            completed: true,
            best_accuracy: accuracy,
            stars: stars_from_accuracy(accuracy),
            attempts: 1,
        }
    }

    /// Fold another completion report into this level.
    ///
    /// Best accuracy and stars keep their maximum; attempts always grow by
    /// one, even when the new score is worse.
    pub fn record_attempt(&mut self, accuracy: f64) {
        self.completed = true;
        if accuracy > self.best_accuracy {
            self.best_accuracy = accuracy;
        }
        let stars = stars_from_accuracy(accuracy);
        if stars > self.stars {
            self.stars = stars;
        }
        self.attempts = self.attempts.saturating_add(1);
    }
}

//
// ─── GAME PROGRESS ─────────────────────────────────────────────────────────────
//

fn default_current_level() -> u32 {
    1
}

/// Per-game progress, created lazily the first time a game is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    /// 1-based ordinal of the next playable level. Starts at 1 and never
    /// decreases.
    #[serde(default = "default_current_level")]
    pub current_level: u32,
    /// Level state keyed by 0-based level index.
    #[serde(default)]
    pub levels: BTreeMap<u32, LevelProgress>,
    #[serde(default)]
    pub total_play_time_ms: u64,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            current_level: 1,
            levels: BTreeMap::new(),
            total_play_time_ms: 0,
        }
    }
}

impl GameProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(&self, index: u32) -> Option<&LevelProgress> {
        self.levels.get(&index)
    }

    /// Sum of stars earned across this game's levels.
    #[must_use]
    pub fn stars(&self) -> u32 {
        self.levels.values().map(|level| u32::from(level.stars)).sum()
    }

    /// Apply a completion report for the level at `level_index` (0-based).
    ///
    /// Ratchets the level entry, then advances the unlock frontier:
    /// finishing the level at or beyond the frontier makes the level after
    /// it the next playable one. Replaying an earlier level never moves the
    /// pointer backwards (or at all).
    pub fn record_completion(&mut self, level_index: u32, accuracy: f64) {
        match self.levels.get_mut(&level_index) {
            Some(level) => level.record_attempt(accuracy),
            None => {
                self.levels
                    .insert(level_index, LevelProgress::first_attempt(accuracy));
            }
        }

        if level_index >= self.current_level.saturating_sub(1) {
            self.current_level = level_index.saturating_add(2);
        }
    }

    /// Accumulate play time. Stars and the unlock frontier are untouched.
    pub fn add_play_time(&mut self, millis: u64) {
        self.total_play_time_ms = self.total_play_time_ms.saturating_add(millis);
    }
}

//
// ─── PROGRESS DOCUMENT ─────────────────────────────────────────────────────────
//

/// Current persisted-document schema version.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_last_activity() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// The single progress document tracked per learner.
///
/// `total_stars` is derived data: it always equals the live recomputation
/// over `games` and is rebuilt wholesale after every mutation rather than
/// updated incrementally, so it cannot drift.
///
/// Every field carries a serde default so a stored document missing fields
/// (written by an older build, or hand-edited) degrades per-field instead of
/// failing the whole parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub games: BTreeMap<GameId, GameProgress>,
    #[serde(default)]
    pub total_stars: u32,
    #[serde(default = "default_last_activity")]
    pub last_activity: DateTime<Utc>,
}

impl ProgressDocument {
    /// The default document: no games played, zero stars.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            games: BTreeMap::new(),
            total_stars: 0,
            last_activity: now,
        }
    }

    #[must_use]
    pub fn game(&self, game_id: &GameId) -> Option<&GameProgress> {
        self.games.get(game_id)
    }

    /// Get-or-default accessor: returns the entry for `game_id`, creating a
    /// fresh default if the game has never been touched.
    pub fn game_mut(&mut self, game_id: &GameId) -> &mut GameProgress {
        self.games.entry(game_id.clone()).or_default()
    }

    /// Recompute the star total from scratch over every level of every game.
    #[must_use]
    pub fn compute_total_stars(&self) -> u32 {
        self.games.values().map(GameProgress::stars).sum()
    }

    /// Rebuild the derived `total_stars` field from the live game state.
    pub fn recompute_total_stars(&mut self) {
        self.total_stars = self.compute_total_stars();
    }

    /// Heal a freshly deserialized document.
    ///
    /// Stored documents are not trusted: accuracies are clamped into 0–100,
    /// stars are re-derived from best accuracy, frontiers and attempt counts
    /// are floored at their minimums, and the star total is rebuilt.
    pub fn normalize(&mut self) {
        for game in self.games.values_mut() {
            if game.current_level == 0 {
                game.current_level = 1;
            }
            for level in game.levels.values_mut() {
                level.best_accuracy = if level.best_accuracy.is_finite() {
                    level.best_accuracy.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                level.stars = stars_from_accuracy(level.best_accuracy);
                // An entry only exists because a completion was reported.
                level.completed = true;
                if level.attempts == 0 {
                    level.attempts = 1;
                }
            }
        }
        self.recompute_total_stars();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
