use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use sprout_core::model::GameRegistry;
use sprout_core::time::Clock;
use storage::{JsonFileStore, ProgressStore};

use crate::progress_service::ProgressService;
use crate::topic_session::TopicSessionService;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("no platform data directory available for progress storage")]
    NoDataDir,
}

/// Assembles the app-facing services around one explicitly-owned progress
/// document.
///
/// This is the single construction point for the session: callers build one
/// `AppServices` at startup and inject it into consumers, instead of
/// reaching for ambient global state. `reset` semantics live on the
/// contained `ProgressService`.
#[derive(Clone)]
pub struct AppServices {
    registry: Arc<GameRegistry>,
    progress: Arc<ProgressService>,
    topic_sessions: Arc<TopicSessionService>,
}

impl AppServices {
    /// Build services over the default on-disk JSON slot.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::NoDataDir` if the platform exposes no data
    /// directory to put the progress file in.
    pub fn new_json_file(clock: Clock) -> Result<Self, AppServicesError> {
        let path = JsonFileStore::default_path().ok_or(AppServicesError::NoDataDir)?;
        Ok(Self::new_json_file_at(path, clock))
    }

    /// Build services over a JSON slot at an explicit path.
    #[must_use]
    pub fn new_json_file_at(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self::with_store(Arc::new(JsonFileStore::new(path)), clock)
    }

    /// Build services over any slot backend (tests inject in-memory or
    /// failing stores here).
    #[must_use]
    pub fn with_store(store: Arc<dyn ProgressStore>, clock: Clock) -> Self {
        Self {
            registry: Arc::new(GameRegistry::builtin()),
            progress: Arc::new(ProgressService::new(store, clock)),
            topic_sessions: Arc::new(TopicSessionService::new()),
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<GameRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn topic_sessions(&self) -> Arc<TopicSessionService> {
        Arc::clone(&self.topic_sessions)
    }
}
