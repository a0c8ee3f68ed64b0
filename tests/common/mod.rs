//! Shared helpers: an in-memory server on an ephemeral port.

#![allow(clippy::panic, dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use daily_puzzle::api;
use daily_puzzle::app_state::AppState;
use daily_puzzle::catalog;
use daily_puzzle::domain::EventBus;
use daily_puzzle::repository::{InMemoryRepository, Repository};
use daily_puzzle::service::RecommendationEngine;

/// A running test server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }
}

/// Starts the full application over a seeded in-memory repository.
pub async fn spawn_server() -> TestServer {
    let repository: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
    let Ok(puzzles) = catalog::builtin_catalog() else {
        panic!("builtin catalog invalid");
    };
    let Ok(_) = catalog::seed(repository.as_ref(), puzzles).await else {
        panic!("seeding failed");
    };

    let event_bus = EventBus::new(64);
    let recommender =
        RecommendationEngine::with_seed(Arc::clone(&repository), event_bus.clone(), 2025);
    let state = AppState::with_recommender(repository, event_bus, recommender);
    let app = api::build_app(state, Duration::from_secs(10));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("cannot bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        client: reqwest::Client::new(),
    }
}
