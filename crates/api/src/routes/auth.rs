use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Authentication routes.
///
/// ```text
/// GET  /user/login    -> login_page
/// POST /user/login    -> login
/// GET  /user/logout   -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/login", get(auth::login_page).post(auth::login))
        .route("/user/logout", get(auth::logout))
}
