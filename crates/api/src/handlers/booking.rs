//! The booking workflow: search, choose a room, enter guest details,
//! commit, show the summary once.
//!
//! Every step reads the draft from the session and writes an updated copy
//! back. Missing or stale drafts, bad input and storage failures end in a
//! redirect with a one-shot notice; none of them surface as server errors.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use bookings_core::dates::{format_date, StayDates};
use bookings_core::draft::{BookingStep, ChosenRoom, DraftReservation};
use bookings_core::error::CoreError;
use bookings_core::forms::GuestDetails;
use bookings_core::types::DbId;
use bookings_db::models::reservation::NewReservation;
use bookings_db::RepoError;
use serde::{Deserialize, Serialize};

use super::render_page;
use crate::error::AppResult;
use crate::notifications;
use crate::render::TemplateData;
use crate::session::draft::DraftStore;
use crate::session::flash::put_error;
use crate::state::AppState;

const MSG_NO_DRAFT: &str = "Can't get reservation from session";
const MSG_NO_AVAILABILITY: &str = "No availability";
const MSG_SEARCH_FAILED: &str = "Can't search availability right now";
const MSG_COMMIT_FAILED: &str = "Can't insert reservation into database!";
const MSG_TAKEN: &str = "Sorry, that room is no longer available for those dates";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Date search form posted to `/availability` and `/availability/json`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Query string of `/book-room`.
#[derive(Debug, Deserialize)]
pub struct BookRoomQuery {
    pub id: DbId,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub e: String,
}

/// Response body of `POST /availability/json`.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// User-facing text for a domain error.
fn notice(err: CoreError) -> String {
    match err {
        CoreError::Validation(message) | CoreError::Conflict(message) => message,
        other => other.to_string(),
    }
}

async fn redirect_with_error(drafts: &DraftStore, to: &str, message: &str) -> AppResult<Response> {
    put_error(drafts.session(), message).await?;
    Ok(Redirect::to(to).into_response())
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// GET /availability
pub async fn availability(State(state): State<AppState>, drafts: DraftStore) -> AppResult<Response> {
    let data = TemplateData::new().with_string("title", "Search for Availability");
    render_page(&state, drafts.session(), "search-availability.page.tmpl", data).await
}

/// POST /availability
///
/// On success the previous draft is replaced by one holding only the dates
/// and the available rooms are listed.
pub async fn post_availability(
    State(state): State<AppState>,
    drafts: DraftStore,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let stay = match StayDates::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(e) => return redirect_with_error(&drafts, "/availability", &notice(e)).await,
    };

    let rooms = match state.repo.search_availability_all_rooms(&stay).await {
        Ok(rooms) => rooms,
        Err(e) => {
            tracing::error!(error = %e, "Availability search failed");
            return redirect_with_error(&drafts, "/availability", MSG_SEARCH_FAILED).await;
        }
    };

    if rooms.is_empty() {
        drafts.remove().await?;
        return redirect_with_error(&drafts, "/availability", MSG_NO_AVAILABILITY).await;
    }

    drafts.put(&DraftReservation::with_dates(stay)).await?;
    tracing::debug!(rooms = rooms.len(), start = %stay.start, end = %stay.end, "Rooms available");

    let data = TemplateData::new()
        .with_string("title", "Choose a Room")
        .with_string("start_date", format_date(stay.start))
        .with_string("end_date", format_date(stay.end))
        .with_data("rooms", &rooms)?;
    render_page(&state, drafts.session(), "choose-room.page.tmpl", data).await
}

/// POST /availability/json
///
/// Single-room check used by the room pages. Storage failures are a 500
/// with `ok: false`.
pub async fn availability_json(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Response {
    let room_id_raw = form.room_id.clone().unwrap_or_default();
    let reply = |status: StatusCode, ok: bool, message: &str| {
        let body = AvailabilityResponse {
            ok,
            message: message.to_string(),
            room_id: room_id_raw.clone(),
            start_date: form.start.clone(),
            end_date: form.end.clone(),
        };
        (status, Json(body)).into_response()
    };

    let stay = match StayDates::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(e) => return reply(StatusCode::OK, false, &notice(e)),
    };
    let Ok(room_id) = room_id_raw.trim().parse::<DbId>() else {
        return reply(StatusCode::OK, false, "Invalid room");
    };

    match state.repo.search_availability_for_room(&stay, room_id).await {
        Ok(true) => reply(StatusCode::OK, true, "Room is available"),
        Ok(false) => reply(StatusCode::OK, false, "Room is not available"),
        Err(e) => {
            tracing::error!(error = %e, room_id, "Single-room availability check failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Error querying database")
        }
    }
}

// ---------------------------------------------------------------------------
// Room selection
// ---------------------------------------------------------------------------

/// GET /rooms/book/{id}
///
/// Requires a draft holding dates; records the room and moves on to the
/// details form.
pub async fn choose_room(
    State(state): State<AppState>,
    drafts: DraftStore,
    Path(room_id): Path<DbId>,
) -> AppResult<Response> {
    let Some(draft) = drafts.get().await? else {
        return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await;
    };

    let room = match state.repo.get_room_by_id(room_id).await {
        Ok(room) => room,
        Err(RepoError::NotFound { .. }) => {
            return redirect_with_error(&drafts, "/availability", "Room not found").await;
        }
        Err(e) => {
            tracing::error!(error = %e, room_id, "Failed to load room");
            return redirect_with_error(&drafts, "/", MSG_SEARCH_FAILED).await;
        }
    };

    let chosen = ChosenRoom {
        id: room.id,
        name: room.room_name,
    };
    let draft = match draft.choose_room(chosen) {
        Ok(draft) => draft,
        Err(e) => return redirect_with_error(&drafts, "/availability", &notice(e)).await,
    };
    drafts.put(&draft).await?;
    Ok(Redirect::to("/book").into_response())
}

/// GET /book-room?id=&s=&e=
///
/// Starts a draft straight from a single-room check: dates and room at once.
pub async fn book_room(
    State(state): State<AppState>,
    drafts: DraftStore,
    Query(query): Query<BookRoomQuery>,
) -> AppResult<Response> {
    let Ok(stay) = StayDates::parse(&query.s, &query.e) else {
        return redirect_with_error(&drafts, "/availability", "Invalid dates").await;
    };

    let room = match state.repo.get_room_by_id(query.id).await {
        Ok(room) => room,
        Err(RepoError::NotFound { .. }) => {
            return redirect_with_error(&drafts, "/availability", "Room not found").await;
        }
        Err(e) => {
            tracing::error!(error = %e, room_id = query.id, "Failed to load room");
            return redirect_with_error(&drafts, "/", MSG_SEARCH_FAILED).await;
        }
    };

    let draft = DraftReservation::with_dates(stay).choose_room(ChosenRoom {
        id: room.id,
        name: room.room_name,
    })?;
    drafts.put(&draft).await?;
    Ok(Redirect::to("/book").into_response())
}

// ---------------------------------------------------------------------------
// Guest details and commit
// ---------------------------------------------------------------------------

fn reservation_page(
    draft: &DraftReservation,
    room_name: &str,
    values: &GuestDetails,
) -> AppResult<TemplateData> {
    Ok(TemplateData::new()
        .with_string("title", "Make Reservation")
        .with_string("room_name", room_name)
        .with_string("start_date", format_date(draft.stay.start))
        .with_string("end_date", format_date(draft.stay.end))
        .with_data("reservation", draft)?
        .with_form_values(values)?)
}

/// GET /book
pub async fn make_reservation(
    State(state): State<AppState>,
    drafts: DraftStore,
) -> AppResult<Response> {
    let Some(draft) = drafts.get().await? else {
        return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await;
    };
    let Ok(room) = draft.require_room() else {
        return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await;
    };

    let values = draft.guest.clone().unwrap_or_default();
    let data = reservation_page(&draft, &room.name, &values)?;
    render_page(&state, drafts.session(), "make-reservation.page.tmpl", data).await
}

/// POST /book
///
/// Invalid input redisplays the form with the submitted values and leaves
/// the draft untouched. A storage failure keeps the draft so nothing typed
/// is lost.
pub async fn post_reservation(
    State(state): State<AppState>,
    drafts: DraftStore,
    Form(guest): Form<GuestDetails>,
) -> AppResult<Response> {
    let Some(draft) = drafts.get().await? else {
        return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await;
    };
    let Ok(room) = draft.require_room().cloned() else {
        return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await;
    };

    let guest = guest.normalized();
    if let Err(errors) = guest.check() {
        let data = reservation_page(&draft, &room.name, &guest)?.with_form_errors(errors);
        return render_page(&state, drafts.session(), "make-reservation.page.tmpl", data).await;
    }

    let input = NewReservation::new(&guest, draft.stay, room.id);
    let reservation_id = match state.repo.commit_booking(&input).await {
        Ok(id) => id,
        Err(RepoError::Unavailable) => {
            tracing::info!(room_id = room.id, "Room taken before the booking was committed");
            return redirect_with_error(&drafts, "/availability", MSG_TAKEN).await;
        }
        Err(e) => {
            tracing::error!(error = %e, room_id = room.id, "Failed to commit reservation");
            return redirect_with_error(&drafts, "/", MSG_COMMIT_FAILED).await;
        }
    };
    tracing::info!(reservation_id, room_id = room.id, "Reservation committed");

    state.mail.enqueue(notifications::guest_confirmation(
        &state.config.mail,
        &guest,
        &room.name,
        &draft.stay,
    ));
    state.mail.enqueue(notifications::operator_notice(
        &state.config.mail,
        &guest,
        &room.name,
        &draft.stay,
    ));

    drafts.put(&draft.committed(reservation_id, guest)).await?;
    Ok(Redirect::to("/book/summary").into_response())
}

/// GET /book/summary
///
/// Shows a committed reservation once; the draft is removed afterwards.
pub async fn reservation_summary(
    State(state): State<AppState>,
    drafts: DraftStore,
) -> AppResult<Response> {
    let draft = match drafts.get().await? {
        Some(draft) if draft.step() == BookingStep::Committed => draft,
        _ => return redirect_with_error(&drafts, "/", MSG_NO_DRAFT).await,
    };
    drafts.remove().await?;

    let mut data = TemplateData::new()
        .with_string("title", "Reservation Summary")
        .with_string("start_date", format_date(draft.stay.start))
        .with_string("end_date", format_date(draft.stay.end))
        .with_string("nights", draft.stay.nights().to_string())
        .with_data("reservation", &draft)?;
    if let Some(room) = &draft.room {
        data = data.with_string("room_name", room.name.clone());
    }
    render_page(&state, drafts.session(), "reservation-summary.page.tmpl", data).await
}
