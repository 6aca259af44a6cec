//! Session-backed state: one-shot notices and the draft reservation.
//!
//! The session itself (cookie, id, store) is managed by `tower-sessions`;
//! this module only fixes the keys and value types stored in it.

pub mod draft;
pub mod flash;

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Session key holding the signed-in user's access level.
pub const ACCESS_LEVEL_KEY: &str = "access_level";
