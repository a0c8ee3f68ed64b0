//! User DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `PUT /users/{wallet}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Optional display name; blank keeps the current one.
    #[serde(default)]
    pub display_name: Option<String>,
}
