//! Type-safe identifiers for puzzles, attempts and wallets.
//!
//! Each identifier is a newtype so that a puzzle number can never be
//! passed where an attempt id or a wallet is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PuzzleError;

/// Longest wallet address accepted.
const WALLET_MAX_LEN: usize = 128;

/// Integer identifier of a catalog puzzle.
///
/// Assigned by the catalog and stable forever. The catalog order used by
/// the daily scheduler is ascending `PuzzleId`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PuzzleId(u32);

impl PuzzleId {
    /// Wraps a raw puzzle number.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw puzzle number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PuzzleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for a recorded attempt.
///
/// Wraps a UUID v4 generated when the attempt is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AttemptId(uuid::Uuid);

impl AttemptId {
    /// Creates a new random `AttemptId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `AttemptId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet address identifying a user.
///
/// Normalized on construction: surrounding whitespace is trimmed and the
/// address is lowercased, so `0xABC` and ` 0xabc ` name the same user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parses and normalizes a wallet address.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidRequest`] if the address is empty,
    /// longer than 128 characters, or contains characters other than
    /// ASCII alphanumerics and `_-.:`.
    pub fn parse(raw: &str) -> Result<Self, PuzzleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PuzzleError::InvalidRequest(
                "wallet address must not be empty".to_string(),
            ));
        }
        if trimmed.len() > WALLET_MAX_LEN {
            return Err(PuzzleError::InvalidRequest(format!(
                "wallet address longer than {WALLET_MAX_LEN} characters"
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        {
            return Err(PuzzleError::InvalidRequest(format!(
                "wallet address contains invalid characters: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Wraps an already-normalized address (e.g. read back from storage).
    #[must_use]
    pub(crate) fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = PuzzleError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<WalletAddress> for String {
    fn from(wallet: WalletAddress) -> Self {
        wallet.0
    }
}
