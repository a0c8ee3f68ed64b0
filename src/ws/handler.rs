//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use super::subscription::SubscriptionManager;
use crate::app_state::AppState;
use crate::domain::WalletAddress;
use crate::error::PuzzleError;

/// Query parameters accepted by `GET /ws`.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Follow only this wallet. Without it the client receives every event.
    #[serde(default)]
    pub wallet: Option<String>,
}

/// `GET /ws[?wallet=]` — Upgrade HTTP connection to WebSocket.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidRequest`] for a malformed wallet.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> Result<impl IntoResponse, PuzzleError> {
    let subs = match params.wallet.as_deref() {
        Some(raw) => {
            let mut subs = SubscriptionManager::new();
            subs.subscribe(&[WalletAddress::parse(raw)?], false);
            subs
        }
        None => SubscriptionManager::all(),
    };
    let event_rx = state.event_bus.subscribe();
    Ok(ws.on_upgrade(move |socket| run_connection(socket, event_rx, subs)))
}
