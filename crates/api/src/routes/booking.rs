use axum::routing::{get, post};
use axum::Router;

use crate::handlers::booking;
use crate::state::AppState;

/// Booking workflow routes.
///
/// ```text
/// GET  /availability        -> availability
/// POST /availability        -> post_availability
/// POST /availability/json   -> availability_json
/// GET  /rooms/book/{id}     -> choose_room
/// GET  /book-room           -> book_room (?id=&s=&e=)
/// GET  /book                -> make_reservation
/// POST /book                -> post_reservation
/// GET  /book/summary        -> reservation_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/availability",
            get(booking::availability).post(booking::post_availability),
        )
        .route("/availability/json", post(booking::availability_json))
        .route("/rooms/book/{id}", get(booking::choose_room))
        .route("/book-room", get(booking::book_room))
        .route(
            "/book",
            get(booking::make_reservation).post(booking::post_reservation),
        )
        .route("/book/summary", get(booking::reservation_summary))
}
