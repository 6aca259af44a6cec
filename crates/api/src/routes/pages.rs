use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Public pages.
///
/// ```text
/// GET /                -> home
/// GET /about           -> about
/// GET /contact         -> contact
/// GET /rooms/{slug}    -> room
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/rooms/{slug}", get(pages::room))
}
