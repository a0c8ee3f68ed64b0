//! Domain layer: puzzles, users, attempts, daily assignments, the skill
//! profile and the event system.

pub mod attempt;
pub mod daily;
pub mod event_bus;
pub mod ids;
pub mod profile;
pub mod puzzle;
pub mod puzzle_event;
pub mod user;

pub use attempt::{Attempt, AttemptDraft, MAX_ATTEMPTS, MintReference};
pub use daily::{DailyAssignment, EpochDay};
pub use event_bus::EventBus;
pub use ids::{AttemptId, PuzzleId, WalletAddress};
pub use profile::SkillProfile;
pub use puzzle::{Difficulty, Puzzle, PuzzleView, Side};
pub use puzzle_event::PuzzleEvent;
pub use user::{ProfileSnapshot, User};
