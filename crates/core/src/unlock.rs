//! Read-only queries over progress state: level locks, star totals, and
//! reward-requirement evaluation.
//!
//! Everything here is pure. The services layer owns the mutable state and
//! calls in with references; UI code renders whatever these functions say.

use crate::model::{GameMeta, GameProgress};

//
// ─── LEVEL LOCKS ───────────────────────────────────────────────────────────────
//

/// Whether the level at the given 1-based ordinal is locked.
///
/// Ordinal 0 and ordinals past the game's level count are always locked
/// (the registry supplies the bounds); otherwise a level is locked exactly
/// when its ordinal lies beyond the game's unlock frontier. A fresh game has
/// `current_level == 1`, so level 1 is always playable.
///
/// # Examples
///
/// ```
/// # use sprout_core::model::{GameMeta, GameProgress, Category, LevelMeta};
/// # use sprout_core::unlock::is_level_locked;
/// let meta = GameMeta::new(
///     "rhyme-racer",
///     "Rhyme Racer",
///     Category::Reading,
///     "#fb923c",
///     "🏁",
///     vec![
///         LevelMeta::new("Warm-up Lap", "Pick the rhyming pair"),
///         LevelMeta::new("Speedway", "Rhyme against the clock"),
///     ],
/// );
/// let progress = GameProgress::new();
/// assert!(!is_level_locked(&meta, &progress, 1));
/// assert!(is_level_locked(&meta, &progress, 2));
/// ```
#[must_use]
pub fn is_level_locked(meta: &GameMeta, progress: &GameProgress, level_ordinal: u32) -> bool {
    if level_ordinal == 0 || level_ordinal > meta.level_count() {
        return true;
    }
    level_ordinal > progress.current_level
}

/// Stars earned in one game; equals the game's contribution to the
/// document-wide star total.
#[must_use]
pub fn stars_for_game(progress: &GameProgress) -> u32 {
    progress.stars()
}

//
// ─── REWARD REQUIREMENTS ───────────────────────────────────────────────────────
//

/// One requirement a topic reward declares. A reward unlocks only when every
/// declared requirement evaluates true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardRequirement {
    /// Every quiz answered this session must be correct.
    AllQuizzesCorrect,
    /// A saved essay of at least `min_chars` characters.
    EssayMinChars { min_chars: usize },
}

/// True iff at least one quiz result is recorded and none of them is wrong.
#[must_use]
pub fn all_quizzes_correct(results: &[bool]) -> bool {
    !results.is_empty() && results.iter().all(|correct| *correct)
}

/// True iff an essay was saved and its trimmed length reaches `min_chars`.
#[must_use]
pub fn essay_saved_with_min_chars(essay: Option<&str>, min_chars: usize) -> bool {
    essay.is_some_and(|text| text.trim().chars().count() >= min_chars)
}

/// Evaluate a reward's full requirement list against session-local state.
#[must_use]
pub fn reward_unlocked(
    requirements: &[RewardRequirement],
    quiz_results: &[bool],
    essay: Option<&str>,
) -> bool {
    requirements.iter().all(|requirement| match requirement {
        RewardRequirement::AllQuizzesCorrect => all_quizzes_correct(quiz_results),
        RewardRequirement::EssayMinChars { min_chars } => {
            essay_saved_with_min_chars(essay, *min_chars)
        }
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, GameId, GameRegistry, LevelMeta};

    fn meta(levels: usize) -> GameMeta {
        GameMeta::new(
            "test-game",
            "Test Game",
            Category::Math,
            "#000000",
            "⭐",
            (0..levels)
                .map(|i| LevelMeta::new(format!("Level {}", i + 1), "test"))
                .collect(),
        )
    }

    #[test]
    fn first_level_unlocked_by_default() {
        let meta = meta(3);
        let progress = GameProgress::new();
        assert!(!is_level_locked(&meta, &progress, 1));
        assert!(is_level_locked(&meta, &progress, 2));
        assert!(is_level_locked(&meta, &progress, 3));
    }

    #[test]
    fn completing_a_level_unlocks_the_next_ordinal() {
        let meta = meta(3);
        let mut progress = GameProgress::new();
        progress.record_completion(0, 95.0);

        assert!(!is_level_locked(&meta, &progress, 1));
        assert!(!is_level_locked(&meta, &progress, 2));
        assert!(is_level_locked(&meta, &progress, 3));
    }

    #[test]
    fn out_of_bounds_ordinals_are_locked() {
        let meta = meta(2);
        let mut progress = GameProgress::new();
        progress.record_completion(0, 100.0);
        progress.record_completion(1, 100.0);

        assert!(is_level_locked(&meta, &progress, 0));
        assert!(!is_level_locked(&meta, &progress, 2));
        assert!(is_level_locked(&meta, &progress, 3));
    }

    #[test]
    fn builtin_registry_bounds_apply() {
        let registry = GameRegistry::builtin();
        let game = registry.get(&GameId::new("counting-carnival")).unwrap();
        let mut progress = GameProgress::new();
        for index in 0..game.level_count() {
            progress.record_completion(index, 90.0);
        }
        // Every shipped level is playable, but there is no level 4.
        for ordinal in 1..=game.level_count() {
            assert!(!is_level_locked(game, &progress, ordinal));
        }
        assert!(is_level_locked(game, &progress, game.level_count() + 1));
    }

    #[test]
    fn stars_for_game_matches_progress_sum() {
        let mut progress = GameProgress::new();
        progress.record_completion(0, 95.0);
        progress.record_completion(1, 60.0);
        assert_eq!(stars_for_game(&progress), 4);
    }

    #[test]
    fn all_quizzes_correct_requires_answers() {
        assert!(!all_quizzes_correct(&[]));
        assert!(all_quizzes_correct(&[true]));
        assert!(all_quizzes_correct(&[true, true, true]));
        assert!(!all_quizzes_correct(&[true, false, true]));
    }

    #[test]
    fn essay_length_is_counted_in_chars_after_trim() {
        assert!(!essay_saved_with_min_chars(None, 1));
        assert!(!essay_saved_with_min_chars(Some("   "), 1));
        assert!(essay_saved_with_min_chars(Some("abcde"), 5));
        assert!(!essay_saved_with_min_chars(Some("abcd"), 5));
        assert!(essay_saved_with_min_chars(Some("  fünf  "), 4));
    }

    #[test]
    fn reward_needs_every_requirement() {
        let requirements = [
            RewardRequirement::AllQuizzesCorrect,
            RewardRequirement::EssayMinChars { min_chars: 10 },
        ];

        assert!(!reward_unlocked(&requirements, &[], None));
        assert!(!reward_unlocked(
            &requirements,
            &[true, true],
            Some("too short")
        ));
        assert!(reward_unlocked(
            &requirements,
            &[true, true],
            Some("long enough essay")
        ));
        assert!(!reward_unlocked(
            &requirements,
            &[true, false],
            Some("long enough essay")
        ));
    }

    #[test]
    fn empty_requirement_list_is_vacuously_unlocked() {
        assert!(reward_unlocked(&[], &[], None));
    }
}
