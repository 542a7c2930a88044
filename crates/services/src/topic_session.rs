use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sprout_core::unlock::{RewardRequirement, reward_unlocked};

//
// ─── TOPIC SESSION STATE ───────────────────────────────────────────────────────
//

/// Quiz and essay state for one topic, valid for this session only.
#[derive(Debug, Clone, Default)]
struct TopicSession {
    /// Latest answer per quiz question; re-answering overwrites.
    quiz_answers: BTreeMap<u32, bool>,
    essay: Option<String>,
}

/// Session-local quiz/essay tracking that feeds the reward evaluator.
///
/// Deliberately not part of the persisted progress document: a topic's
/// reward is re-earned each session, so this state lives and dies with the
/// service instance.
#[derive(Default)]
pub struct TopicSessionService {
    topics: Mutex<HashMap<String, TopicSession>>,
}

impl TopicSessionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, TopicSession>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the learner's answer to one quiz question of a topic.
    pub fn record_quiz_answer(&self, topic: &str, question: u32, correct: bool) {
        let mut topics = self.topics();
        topics
            .entry(topic.to_owned())
            .or_default()
            .quiz_answers
            .insert(question, correct);
    }

    /// Save (or replace) the learner's essay for a topic.
    pub fn save_essay(&self, topic: &str, text: impl Into<String>) {
        let mut topics = self.topics();
        topics.entry(topic.to_owned()).or_default().essay = Some(text.into());
    }

    /// Recorded quiz results for a topic, in question order.
    #[must_use]
    pub fn quiz_results(&self, topic: &str) -> Vec<bool> {
        self.topics()
            .get(topic)
            .map(|session| session.quiz_answers.values().copied().collect())
            .unwrap_or_default()
    }

    /// The saved essay for a topic, if any.
    #[must_use]
    pub fn essay(&self, topic: &str) -> Option<String> {
        self.topics().get(topic).and_then(|s| s.essay.clone())
    }

    /// Whether every declared requirement for a topic's reward is satisfied
    /// by the state recorded so far this session.
    #[must_use]
    pub fn reward_unlocked(&self, topic: &str, requirements: &[RewardRequirement]) -> bool {
        let topics = self.topics();
        let session = topics.get(topic);
        let results: Vec<bool> = session
            .map(|s| s.quiz_answers.values().copied().collect())
            .unwrap_or_default();
        let essay = session.and_then(|s| s.essay.as_deref());
        reward_unlocked(requirements, &results, essay)
    }

    /// Drop all recorded state for a topic (e.g. when the learner leaves it).
    pub fn clear_topic(&self, topic: &str) {
        self.topics().remove(topic);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
