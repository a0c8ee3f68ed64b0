//! User registration and lookup.

use std::sync::Arc;

use crate::domain::{User, WalletAddress};
use crate::domain::user::normalize_display_name;
use crate::error::PuzzleError;
use crate::repository::Repository;

/// Registers players and reads their cached profiles.
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn Repository>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Creates the user if needed and sets the display name when one is
    /// given. Registering an existing wallet without a name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidRequest`] for an over-long name, or
    /// a repository error.
    pub async fn register(
        &self,
        wallet: &WalletAddress,
        display_name: Option<&str>,
    ) -> Result<User, PuzzleError> {
        match normalize_display_name(display_name)? {
            Some(name) => {
                let user = self.repository.set_display_name(wallet, &name).await?;
                tracing::info!(%wallet, display_name = %name, "display name set");
                Ok(user)
            }
            None => {
                self.repository
                    .insert_user_if_absent(User::new(wallet.clone()))
                    .await
            }
        }
    }

    /// Looks up a user.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::UserNotFound`] for unknown wallets.
    pub async fn get(&self, wallet: &WalletAddress) -> Result<User, PuzzleError> {
        self.repository
            .get_user(wallet)
            .await?
            .ok_or_else(|| PuzzleError::UserNotFound(wallet.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryRepository::new()))
    }

    fn wallet(raw: &str) -> WalletAddress {
        let Ok(w) = WalletAddress::parse(raw) else {
            panic!("valid wallet");
        };
        w
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let result = service().get(&wallet("0xnobody")).await;
        assert!(matches!(result, Err(PuzzleError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn register_then_rename() {
        let users = service();
        let w = wallet("0xMagnus");
        let Ok(created) = users.register(&w, None).await else {
            panic!("register failed");
        };
        assert!(created.display_name.is_none());

        let Ok(renamed) = users.register(&w, Some("  Magnus ")).await else {
            panic!("rename failed");
        };
        assert_eq!(renamed.display_name.as_deref(), Some("Magnus"));
        assert_eq!(renamed.created_at, created.created_at);

        // No name keeps the existing one.
        let Ok(again) = users.register(&w, None).await else {
            panic!("register failed");
        };
        assert_eq!(again.display_name.as_deref(), Some("Magnus"));

        let Ok(fetched) = users.get(&wallet("0xmagnus")).await else {
            panic!("get failed");
        };
        assert_eq!(fetched, again);
    }

    #[tokio::test]
    async fn over_long_name_is_rejected() {
        let result = service().register(&wallet("0xa"), Some(&"x".repeat(80))).await;
        assert!(matches!(result, Err(PuzzleError::InvalidRequest(_))));
    }
}
