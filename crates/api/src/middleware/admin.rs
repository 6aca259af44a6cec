//! Administrator gate.
//!
//! [`RequireAdmin`] reads the signed-in user id from the session and loads
//! the account. Requests without one, for a deleted account, or with an
//! access level below administrator, are redirected to the login page with
//! an error notice.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::access::is_admin;
use bookings_core::types::DbId;
use bookings_db::RepoError;
use tower_sessions::Session;

use crate::error::AppError;
use crate::session::flash::put_error;
use crate::session::{ACCESS_LEVEL_KEY, USER_ID_KEY};
use crate::state::AppState;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/user/login";

/// The signed-in administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
    pub id: DbId,
    pub access_level: i32,
}

/// Requires an administrator session.
///
/// ```ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> AppResult<Response> {
///     // admin.access_level >= ACCESS_LEVEL_ADMIN here
/// }
/// ```
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user_id = session
            .get::<DbId>(USER_ID_KEY)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        // The account is re-read on every request so deletions take effect
        // immediately instead of when the session expires.
        let user = match user_id {
            Some(id) => match state.repo.get_user_by_id(id).await {
                Ok(user) => Some(user),
                Err(RepoError::NotFound { .. }) => {
                    tracing::info!(user_id = id, "Session refers to a deleted user");
                    session
                        .remove_value(USER_ID_KEY)
                        .await
                        .map_err(|e| AppError::from(e).into_response())?;
                    session
                        .remove_value(ACCESS_LEVEL_KEY)
                        .await
                        .map_err(|e| AppError::from(e).into_response())?;
                    None
                }
                Err(e) => return Err(AppError::from(e).into_response()),
            },
            None => None,
        };

        let message = match user {
            Some(user) if is_admin(user.access_level) => {
                return Ok(RequireAdmin(AdminUser {
                    id: user.id,
                    access_level: user.access_level,
                }));
            }
            Some(user) => {
                tracing::warn!(
                    user_id = user.id,
                    access_level = user.access_level,
                    "Admin page refused"
                );
                "Access denied"
            }
            None => "Log in first!",
        };

        if let Err(e) = put_error(&session, message).await {
            return Err(e.into_response());
        }
        Err(Redirect::to(LOGIN_PATH).into_response())
    }
}
