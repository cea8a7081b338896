use std::sync::Arc;

use crate::auth::{SessionStore, UserRepository};
use crate::config::Config;
use crate::matching::engine::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only after startup; every request runs its own analysis against it.
    pub engine: Arc<MatchEngine>,
    /// Pluggable account store. Default: InMemoryUserRepository.
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<SessionStore>,
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        use crate::auth::InMemoryUserRepository;
        use crate::embedding::HashEmbedder;
        use crate::matching::extractor::SkillExtractor;
        use crate::matching::vocabulary::SkillVocabulary;

        let config = Config::for_tests();
        let extractor = SkillExtractor::new(
            Arc::new(SkillVocabulary::default()),
            config.skill_match_mode,
        );
        let engine = MatchEngine::new(
            extractor,
            Arc::new(HashEmbedder::new(config.embedding_dimension)),
        );

        AppState {
            config,
            engine: Arc::new(engine),
            users: Arc::new(InMemoryUserRepository::default()),
            sessions: Arc::new(SessionStore::default()),
        }
    }
}
