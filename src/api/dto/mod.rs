//! Data Transfer Objects for REST request/response serialization.
//!
//! Wallet addresses arrive as plain strings and are normalized by the
//! handlers, so a bad address maps to a 400 with the usual error body.

pub mod attempt_dto;
pub mod puzzle_dto;
pub mod user_dto;

pub use attempt_dto::*;
pub use puzzle_dto::*;
pub use user_dto::*;
