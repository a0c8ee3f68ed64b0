//! Per-connection subscription manager.
//!
//! Tracks which wallets a WebSocket client follows and filters events
//! server-side. Events that concern no wallet (daily assignments) reach
//! every client.

use std::collections::HashSet;

use crate::domain::{PuzzleEvent, WalletAddress};

/// Manages the set of wallet subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed wallets. If `subscribe_all` is true, this set is ignored.
    wallets: HashSet<WalletAddress>,
    /// Whether the client follows every wallet (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager following every wallet.
    #[must_use]
    pub fn all() -> Self {
        Self {
            wallets: HashSet::new(),
            subscribe_all: true,
        }
    }

    /// Adds wallets to the subscription set.
    pub fn subscribe(&mut self, wallets: &[WalletAddress], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.wallets.extend(wallets.iter().cloned());
    }

    /// Removes wallets from the subscription set. Passing the wildcard
    /// turns the catch-all subscription off.
    pub fn unsubscribe(&mut self, wallets: &[WalletAddress], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for wallet in wallets {
            self.wallets.remove(wallet);
        }
    }

    /// Returns `true` if the event should be forwarded to this client.
    #[must_use]
    pub fn matches(&self, event: &PuzzleEvent) -> bool {
        match event.wallet() {
            None => true,
            Some(wallet) => self.subscribe_all || self.wallets.contains(wallet),
        }
    }

    /// Returns the number of explicitly followed wallets.
    #[must_use]
    pub fn count(&self) -> usize {
        self.wallets.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
