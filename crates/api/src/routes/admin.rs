use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes (mounted at `/admin`).
///
/// ```text
/// GET  /                                   -> index
/// GET  /dashboard                          -> dashboard
/// GET  /reservations/new                   -> new_reservations
/// GET  /reservations/all                   -> all_reservations
/// GET  /reservations/calendar              -> reservations_calendar
/// GET  /reservations/calendar/json         -> reservations_calendar_json
/// GET  /reservations/{src}/{id}            -> show_reservation
/// POST /reservations/{src}/{id}            -> update_reservation
/// POST /reservations/{src}/{id}/processed  -> mark_processed
/// POST /reservations/{src}/{id}/delete     -> delete_reservation
/// GET  /users                              -> list_users
/// GET  /users/new                          -> new_user_page
/// POST /users/new                          -> create_user
/// POST /users/{id}/delete                  -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/dashboard", get(admin::dashboard))
        .route("/reservations/new", get(admin::new_reservations))
        .route("/reservations/all", get(admin::all_reservations))
        .route("/reservations/calendar", get(admin::reservations_calendar))
        .route(
            "/reservations/calendar/json",
            get(admin::reservations_calendar_json),
        )
        .route(
            "/reservations/{src}/{id}",
            get(admin::show_reservation).post(admin::update_reservation),
        )
        .route(
            "/reservations/{src}/{id}/processed",
            post(admin::mark_processed),
        )
        .route("/reservations/{src}/{id}/delete", post(admin::delete_reservation))
        .route("/users", get(admin::list_users))
        .route(
            "/users/new",
            get(admin::new_user_page).post(admin::create_user),
        )
        .route("/users/{id}/delete", post(admin::delete_user))
}
