use bookings_core::access::ACCESS_LEVEL_ADMIN;
use bookings_db::models::user::CreateUser;
use bookings_db::BookingRepository;

use super::password::hash_password;
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the configured administrator unless a user with that email exists.
///
/// Returns `true` when a new account was created.
pub async fn ensure_admin(repo: &dyn BookingRepository, admin: &AdminBootstrap) -> AppResult<bool> {
    if repo.find_user_by_email(&admin.email).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = repo
        .create_user(&CreateUser {
            first_name: "Admin".into(),
            last_name: "User".into(),
            email: admin.email.clone(),
            password_hash,
            access_level: ACCESS_LEVEL_ADMIN,
        })
        .await?;
    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap administrator created");
    Ok(true)
}
