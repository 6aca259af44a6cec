//! Well-known access level constants.
//!
//! These must match the values written by the admin user forms and the
//! optional bootstrap administrator.

/// Regular staff account without access to the admin area.
pub const ACCESS_LEVEL_STAFF: i32 = 1;

/// Administrator. Required by every `/admin` route.
pub const ACCESS_LEVEL_ADMIN: i32 = 3;

/// Returns `true` if `level` grants access to the admin area.
pub fn is_admin(level: i32) -> bool {
    level >= ACCESS_LEVEL_ADMIN
}
