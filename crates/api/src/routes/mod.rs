//! Route tables. Each submodule returns a `Router<AppState>` that
//! [`crate::router::build_app_router`] merges.

use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod booking;
pub mod health;
pub mod pages;

/// All application routes except health.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .merge(booking::router())
        .merge(auth::router())
        .nest("/admin", admin::router())
}
