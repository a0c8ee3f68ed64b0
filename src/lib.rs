//! # daily-puzzle
//!
//! REST API and WebSocket service for daily chess puzzles.
//!
//! Every calendar day is bound to one catalog puzzle, deterministically
//! and exactly once. Players submit moves (three attempts per puzzle),
//! and a recommendation engine turns their attempt history into a skill
//! profile that picks the next unsolved puzzle at the right difficulty.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── DailyScheduler / AttemptTracker /
//!     │   RecommendationEngine / UserService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── dyn Repository (repository/)
//!         ├── InMemoryRepository
//!         └── PostgresRepository
//! ```

pub mod api;
pub mod app_state;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod ws;
