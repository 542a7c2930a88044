use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sprout_core::model::{GameId, GameProgress, ProgressDocument};
use sprout_core::time::Clock;
use storage::{ProgressStorage, ProgressStore};

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Owns the learner's progress document for the life of the session.
///
/// The service is the sole writer: every mutation is an atomic
/// read-modify-write of the whole document followed by a best-effort save,
/// and takes effect synchronously. Reads hand out structural copies, so a
/// snapshot taken before a mutation is never changed by it.
///
/// Mutations never fail. Unknown game ids are accepted and tracked like any
/// other (the registry is a separate, read-only collaborator), and a level
/// report is applied whether or not the lock predicate would have allowed
/// the level to be played; enforcing locks is the caller's job.
pub struct ProgressService {
    storage: ProgressStorage,
    clock: Clock,
    doc: Mutex<ProgressDocument>,
}

impl ProgressService {
    /// Load the stored document (a missing or corrupt slot degrades to the
    /// default document) and take ownership of it.
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>, clock: Clock) -> Self {
        let storage = ProgressStorage::new(store);
        let doc = storage.load(clock.now());
        Self {
            storage,
            clock,
            doc: Mutex::new(doc),
        }
    }

    // Single writer: the lock only coordinates interior mutability, and a
    // poisoned guard still holds a structurally valid document.
    fn doc(&self) -> MutexGuard<'_, ProgressDocument> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Progress for one game: the stored entry, or a fresh default if the
    /// game has never been played. Reading never creates an entry.
    #[must_use]
    pub fn game_progress(&self, game_id: &GameId) -> GameProgress {
        self.doc().game(game_id).cloned().unwrap_or_default()
    }

    /// Record a level completion reported by a game module.
    ///
    /// `level_index` is 0-based; `accuracy` is clamped into 0–100 before the
    /// star rule is applied, because game modules are an untrusted input
    /// channel. The document's star total is rebuilt from scratch and the
    /// new document is persisted best-effort.
    pub fn complete_level(&self, game_id: &GameId, level_index: u32, accuracy: f64) {
        let accuracy = clamp_accuracy(accuracy);
        let mut doc = self.doc();
        doc.game_mut(game_id).record_completion(level_index, accuracy);
        doc.recompute_total_stars();
        doc.last_activity = self.clock.now();
        self.storage.save(&doc);
        tracing::debug!(game = %game_id, level = level_index, accuracy, "level completion recorded");
    }

    /// Accumulate play time for a game. Stars and the unlock frontier are
    /// unaffected.
    pub fn add_play_time(&self, game_id: &GameId, millis: u64) {
        let mut doc = self.doc();
        doc.game_mut(game_id).add_play_time(millis);
        doc.last_activity = self.clock.now();
        self.storage.save(&doc);
    }

    /// Replace the whole document with the defaults and persist. There is no
    /// undo; confirmation belongs to the caller.
    pub fn reset_progress(&self) {
        let mut doc = self.doc();
        *doc = ProgressDocument::new(self.clock.now());
        self.storage.save(&doc);
        tracing::info!("progress reset to defaults");
    }

    /// Structural copy of the current document.
    #[must_use]
    pub fn snapshot(&self) -> ProgressDocument {
        self.doc().clone()
    }

    /// Stars earned across every level of every game.
    #[must_use]
    pub fn total_stars(&self) -> u32 {
        self.doc().total_stars
    }
}

fn clamp_accuracy(accuracy: f64) -> f64 {
    if accuracy.is_finite() {
        accuracy.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sprout_core::time::{fixed_clock, fixed_now};
    use storage::{InMemoryStore, StoreError};

    struct FailingStore;

    impl ProgressStore for FailingStore {
        fn read(&self) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io("storage disabled".into()))
        }

        fn write(&self, _raw: &str) -> Result<(), StoreError> {
            Err(StoreError::Io("storage disabled".into()))
        }
    }

    fn service() -> ProgressService {
        ProgressService::new(Arc::new(InMemoryStore::new()), fixed_clock())
    }

    fn aquarium() -> GameId {
        GameId::new("addition-aquarium")
    }

    #[test]
    fn first_completion_then_worse_retry() {
        let service = service();
        let game = aquarium();

        service.complete_level(&game, 0, 95.0);

        let progress = service.game_progress(&game);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.total_play_time_ms, 0);
        let level = progress.level(0).unwrap();
        assert!(level.completed);
        assert_eq!(level.best_accuracy, 95.0);
        assert_eq!(level.stars, 3);
        assert_eq!(level.attempts, 1);
        assert_eq!(service.total_stars(), 3);

        service.complete_level(&game, 0, 60.0);

        let progress = service.game_progress(&game);
        assert_eq!(progress.current_level, 2);
        let level = progress.level(0).unwrap();
        assert_eq!(level.best_accuracy, 95.0);
        assert_eq!(level.stars, 3);
        assert_eq!(level.attempts, 2);
        assert_eq!(service.total_stars(), 3);
    }

    #[test]
    fn stars_aggregate_across_games() {
        let service = service();
        service.complete_level(&GameId::new("a"), 0, 100.0);
        service.complete_level(&GameId::new("b"), 0, 55.0);
        assert_eq!(service.total_stars(), 4);
    }

    #[test]
    fn total_stars_always_matches_recomputation() {
        let service = service();
        let games = [GameId::new("a"), GameId::new("b")];
        let reports = [
            (0_usize, 0_u32, 95.0),
            (1, 0, 40.0),
            (0, 1, 72.0),
            (1, 0, 80.0),
            (0, 0, 20.0),
        ];

        for (game, level, accuracy) in reports {
            service.complete_level(&games[game], level, accuracy);
            let snapshot = service.snapshot();
            assert_eq!(snapshot.total_stars, snapshot.compute_total_stars());
            assert_eq!(service.total_stars(), snapshot.total_stars);
        }
    }

    #[test]
    fn frontier_never_regresses() {
        let service = service();
        let game = aquarium();

        service.complete_level(&game, 0, 90.0);
        assert_eq!(service.game_progress(&game).current_level, 2);

        service.complete_level(&game, 1, 90.0);
        assert_eq!(service.game_progress(&game).current_level, 3);

        service.complete_level(&game, 0, 100.0);
        assert_eq!(service.game_progress(&game).current_level, 3);
    }

    #[test]
    fn reading_never_creates_an_entry() {
        let service = service();
        let game = aquarium();

        let fresh = service.game_progress(&game);
        assert_eq!(fresh, GameProgress::default());
        assert!(service.snapshot().game(&game).is_none());
    }

    #[test]
    fn snapshots_are_isolated_from_later_mutations() {
        let service = service();
        let before = service.snapshot();

        service.complete_level(&aquarium(), 0, 95.0);

        assert!(before.games.is_empty());
        assert_eq!(before.total_stars, 0);
        assert_eq!(service.total_stars(), 3);
    }

    #[test]
    fn play_time_accumulates_without_touching_stars() {
        let service = service();
        let game = aquarium();

        service.add_play_time(&game, 1_500);
        service.add_play_time(&game, 500);

        let progress = service.game_progress(&game);
        assert_eq!(progress.total_play_time_ms, 2_000);
        assert_eq!(progress.current_level, 1);
        assert!(progress.levels.is_empty());
        assert_eq!(service.total_stars(), 0);
    }

    #[test]
    fn out_of_range_accuracy_is_clamped_at_the_boundary() {
        let service = service();

        service.complete_level(&GameId::new("a"), 0, 150.0);
        let level_a = service.game_progress(&GameId::new("a"));
        assert_eq!(level_a.level(0).unwrap().best_accuracy, 100.0);
        assert_eq!(level_a.level(0).unwrap().stars, 3);

        service.complete_level(&GameId::new("b"), 0, -12.0);
        let level_b = service.game_progress(&GameId::new("b"));
        assert_eq!(level_b.level(0).unwrap().best_accuracy, 0.0);
        assert_eq!(level_b.level(0).unwrap().stars, 0);
        assert!(level_b.level(0).unwrap().completed);
    }

    #[test]
    fn reset_is_idempotent_under_a_fixed_clock() {
        let service = service();
        service.complete_level(&aquarium(), 0, 95.0);
        service.add_play_time(&aquarium(), 10_000);

        service.reset_progress();
        let once = service.snapshot();

        service.reset_progress();
        let twice = service.snapshot();

        assert_eq!(once, twice);
        assert_eq!(once, ProgressDocument::new(fixed_now()));
    }

    #[test]
    fn mutations_survive_a_store_that_rejects_writes() {
        let service = ProgressService::new(Arc::new(FailingStore), fixed_clock());

        service.complete_level(&aquarium(), 0, 95.0);
        assert_eq!(service.total_stars(), 3);

        service.add_play_time(&aquarium(), 1_000);
        assert_eq!(service.game_progress(&aquarium()).total_play_time_ms, 1_000);
    }

    #[test]
    fn state_is_restored_by_a_later_service_instance() {
        let store = Arc::new(InMemoryStore::new());

        let first = ProgressService::new(Arc::clone(&store) as Arc<dyn ProgressStore>, fixed_clock());
        first.complete_level(&aquarium(), 0, 95.0);
        first.add_play_time(&aquarium(), 2_500);
        drop(first);

        let second = ProgressService::new(store, fixed_clock());
        assert_eq!(second.total_stars(), 3);
        let progress = second.game_progress(&aquarium());
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.total_play_time_ms, 2_500);
    }

    #[test]
    fn mutations_stamp_last_activity_from_the_clock() {
        let mut clock = fixed_clock();
        clock.advance(Duration::hours(1));
        let service = ProgressService::new(Arc::new(InMemoryStore::new()), clock);

        service.complete_level(&aquarium(), 0, 80.0);
        assert_eq!(
            service.snapshot().last_activity,
            fixed_now() + Duration::hours(1)
        );
    }
}
