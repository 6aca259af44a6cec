//! Handlers for `/user` (login, logout).

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use bookings_core::forms::FormErrors;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::render_page;
use crate::auth::password::verify_password;
use crate::error::AppResult;
use crate::render::TemplateData;
use crate::session::flash::{put_error, put_flash};
use crate::session::{ACCESS_LEVEL_KEY, USER_ID_KEY};
use crate::state::AppState;

const MSG_BAD_CREDENTIALS: &str = "Invalid login credentials";

/// Login form body.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

/// GET /user/login
pub async fn login_page(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let data = TemplateData::new().with_string("title", "Login");
    render_page(&state, &session, "login.page.tmpl", data).await
}

/// POST /user/login
///
/// Authenticate with email + password. The session id is rotated on success.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let mut errors = FormErrors::new();
    errors.required(&[
        ("email", form.email.as_str()),
        ("password", form.password.as_str()),
    ]);
    if !errors.is_empty() {
        let data = TemplateData::new()
            .with_string("title", "Login")
            .with_form_values(&form)?
            .with_form_errors(errors);
        return render_page(&state, &session, "login.page.tmpl", data).await;
    }

    let user = match state.repo.find_user_by_email(form.email.trim()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "User lookup failed during login");
            put_error(&session, "Login is unavailable right now").await?;
            return Ok(Redirect::to("/user/login").into_response());
        }
    };

    let authenticated = match &user {
        Some(user) => verify_password(&form.password, &user.password_hash).unwrap_or_else(|e| {
            tracing::error!(error = %e, user_id = user.id, "Stored password hash is invalid");
            false
        }),
        None => false,
    };

    match user {
        Some(user) if authenticated => {
            session.cycle_id().await?;
            session.insert(USER_ID_KEY, user.id).await?;
            session.insert(ACCESS_LEVEL_KEY, user.access_level).await?;
            put_flash(&session, "Logged in successfully").await?;
            tracing::info!(user_id = user.id, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        _ => {
            tracing::info!(email = %form.email, "Failed login attempt");
            put_error(&session, MSG_BAD_CREDENTIALS).await?;
            Ok(Redirect::to("/user/login").into_response())
        }
    }
}

/// GET /user/logout
///
/// Drops the whole session, draft included.
pub async fn logout(session: Session) -> AppResult<Response> {
    session.flush().await?;
    Ok(Redirect::to("/user/login").into_response())
}
