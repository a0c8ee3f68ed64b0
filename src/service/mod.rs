//! Service layer: business logic orchestration.
//!
//! Each service holds an `Arc<dyn Repository>` and, where it produces
//! notifications, a clone of the [`super::domain::EventBus`]:
//!
//! - [`DailyScheduler`] binds calendar days to catalog puzzles.
//! - [`AttemptTracker`] grades moves and enforces the per-puzzle limit.
//! - [`RecommendationEngine`] derives skill profiles and picks puzzles.
//! - [`UserService`] registers players and reads their profiles.

pub mod attempt_tracker;
pub mod recommendation;
pub mod scheduler;
pub mod user_service;

pub use attempt_tracker::{AttemptSummary, AttemptTracker};
pub use recommendation::{
    Recommendation, RecommendationEngine, RecommendationReason, RecommendationResponse,
};
pub use scheduler::{DailyPuzzle, DailyScheduler};
pub use user_service::UserService;
