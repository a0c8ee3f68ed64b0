//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::repository::Repository;
use crate::service::{AttemptTracker, DailyScheduler, RecommendationEngine, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Daily puzzle assignment.
    pub scheduler: DailyScheduler,
    /// Attempt grading and history.
    pub tracker: AttemptTracker,
    /// Profile derivation and recommendations.
    pub recommender: Arc<RecommendationEngine>,
    /// User registration and lookup.
    pub users: UserService,
    /// Direct storage access for catalog reads.
    pub repository: Arc<dyn Repository>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service over one repository and one event bus.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, event_bus: EventBus) -> Self {
        Self::with_recommender(
            Arc::clone(&repository),
            event_bus.clone(),
            RecommendationEngine::new(repository, event_bus),
        )
    }

    /// Like [`AppState::new`], with a caller-built recommendation engine
    /// (e.g. one with a fixed seed).
    #[must_use]
    pub fn with_recommender(
        repository: Arc<dyn Repository>,
        event_bus: EventBus,
        recommender: RecommendationEngine,
    ) -> Self {
        Self {
            scheduler: DailyScheduler::new(Arc::clone(&repository), event_bus.clone()),
            tracker: AttemptTracker::new(Arc::clone(&repository), event_bus.clone()),
            recommender: Arc::new(recommender),
            users: UserService::new(Arc::clone(&repository)),
            repository,
            event_bus,
        }
    }
}
