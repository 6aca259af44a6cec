//! Handlers for the `/admin` area: dashboard, reservation management,
//! calendar feed and user management.
//!
//! Every handler requires [`RequireAdmin`]. Missing ids surface as 404 and
//! malformed ids are rejected by the `Path` extractor with 400.

use std::fmt;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use bookings_core::dates::{format_date, StayDates};
use bookings_core::forms::{FormErrors, GuestDetails, NewUserForm};
use bookings_core::types::DbId;
use bookings_db::models::reservation::{Reservation, UpdateReservation};
use bookings_db::models::user::{CreateUser, UserResponse};
use bookings_db::RepoError;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::render_page;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::admin::RequireAdmin;
use crate::render::TemplateData;
use crate::session::flash::{put_flash, put_warning};
use crate::state::AppState;

const MSG_BAD_CALENDAR_START: &str = "Invalid start date format. Use RFC3339 format.";
const MSG_BAD_CALENDAR_END: &str = "Invalid end date format. Use RFC3339 format.";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which listing a reservation was opened from; decides where to go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationSource {
    New,
    All,
    Cal,
}

impl ReservationSource {
    pub fn list_path(self) -> &'static str {
        match self {
            ReservationSource::New => "/admin/reservations/new",
            ReservationSource::All => "/admin/reservations/all",
            ReservationSource::Cal => "/admin/reservations/calendar",
        }
    }
}

impl fmt::Display for ReservationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationSource::New => "new",
            ReservationSource::All => "all",
            ReservationSource::Cal => "cal",
        };
        f.write_str(s)
    }
}

/// Query string of the calendar feed.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// One entry of the calendar feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: DbId,
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    pub url: String,
    pub editable: bool,
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventProps {
    pub name: String,
    pub room: String,
    pub last_updated: String,
}

impl From<&Reservation> for CalendarEvent {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            title: format!("{}: {}", r.room_name, r.full_name()),
            start: r.start_date.to_string(),
            end: r.end_date.to_string(),
            all_day: true,
            url: format!("/admin/reservations/cal/{}", r.id),
            editable: false,
            extended_props: CalendarEventProps {
                name: r.full_name(),
                room: r.room_name.clone(),
                last_updated: r.updated_at.to_rfc3339(),
            },
        }
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub new_reservations: usize,
    pub all_reservations: usize,
    pub rooms: usize,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /admin
pub async fn index(_admin: RequireAdmin) -> Redirect {
    Redirect::to("/admin/dashboard")
}

/// GET /admin/dashboard
pub async fn dashboard(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let stats = DashboardStats {
        new_reservations: state.repo.all_new_reservations().await?.len(),
        all_reservations: state.repo.all_reservations(None).await?.len(),
        rooms: state.repo.all_rooms().await?.len(),
    };
    let data = TemplateData::new()
        .with_string("title", "Dashboard")
        .with_data("stats", &stats)?;
    render_page(&state, &session, "admin-dashboard.page.tmpl", data).await
}

// ---------------------------------------------------------------------------
// Reservation listings
// ---------------------------------------------------------------------------

/// GET /admin/reservations/new
pub async fn new_reservations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let reservations = state.repo.all_new_reservations().await?;
    let data = TemplateData::new()
        .with_string("title", "New Reservations")
        .with_data("reservations", &reservations)?;
    render_page(&state, &session, "admin-new-reservations.page.tmpl", data).await
}

/// GET /admin/reservations/all
pub async fn all_reservations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let reservations = state.repo.all_reservations(None).await?;
    let data = TemplateData::new()
        .with_string("title", "All Reservations")
        .with_data("reservations", &reservations)?;
    render_page(&state, &session, "admin-all-reservations.page.tmpl", data).await
}

/// GET /admin/reservations/calendar
pub async fn reservations_calendar(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let rooms = state.repo.all_rooms().await?;
    let data = TemplateData::new()
        .with_string("title", "Reservation Calendar")
        .with_data("rooms", &rooms)?;
    render_page(&state, &session, "admin-reservations-calendar.page.tmpl", data).await
}

/// GET /admin/reservations/calendar/json?start=<RFC3339>&end=<RFC3339>
///
/// Reservations overlapping the window, as calendar events.
pub async fn reservations_calendar_json(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    let start = DateTime::parse_from_rfc3339(query.start.trim())
        .map_err(|_| AppError::BadRequest(MSG_BAD_CALENDAR_START.into()))?
        .date_naive();
    let end = DateTime::parse_from_rfc3339(query.end.trim())
        .map_err(|_| AppError::BadRequest(MSG_BAD_CALENDAR_END.into()))?
        .date_naive();
    let window = StayDates::new(start, end)?;

    let reservations = state.repo.all_reservations(Some(window)).await?;
    Ok(Json(reservations.iter().map(CalendarEvent::from).collect()))
}

// ---------------------------------------------------------------------------
// Single reservation
// ---------------------------------------------------------------------------

fn reservation_page(
    reservation: &Reservation,
    src: ReservationSource,
    values: &GuestDetails,
) -> AppResult<TemplateData> {
    Ok(TemplateData::new()
        .with_string("title", "Reservation")
        .with_string("src", src.to_string())
        .with_string("start_date", format_date(reservation.start_date))
        .with_string("end_date", format_date(reservation.end_date))
        .with_data("reservation", reservation)?
        .with_form_values(values)?)
}

/// GET /admin/reservations/{src}/{id}
pub async fn show_reservation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(ReservationSource, DbId)>,
) -> AppResult<Response> {
    let reservation = state.repo.get_reservation_by_id(id).await?;
    let data = reservation_page(&reservation, src, &reservation.guest())?;
    render_page(&state, &session, "admin-reservations-show.page.tmpl", data).await
}

/// POST /admin/reservations/{src}/{id}
///
/// Update guest details with the same rules as the booking form.
pub async fn update_reservation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(ReservationSource, DbId)>,
    Form(guest): Form<GuestDetails>,
) -> AppResult<Response> {
    let reservation = state.repo.get_reservation_by_id(id).await?;

    let guest = guest.normalized();
    if let Err(errors) = guest.check() {
        let data = reservation_page(&reservation, src, &guest)?.with_form_errors(errors);
        return render_page(&state, &session, "admin-reservations-show.page.tmpl", data).await;
    }

    state
        .repo
        .update_reservation(id, &UpdateReservation::from(guest))
        .await?;
    tracing::info!(reservation_id = id, "Reservation updated");

    put_flash(&session, "Changes saved").await?;
    Ok(Redirect::to(src.list_path()).into_response())
}

/// POST /admin/reservations/{src}/{id}/processed
pub async fn mark_processed(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(ReservationSource, DbId)>,
) -> AppResult<Response> {
    state.repo.update_processed(id, true).await?;
    tracing::info!(reservation_id = id, "Reservation marked as processed");

    put_flash(&session, "Reservation marked as processed").await?;
    Ok(Redirect::to(src.list_path()).into_response())
}

/// POST /admin/reservations/{src}/{id}/delete
pub async fn delete_reservation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(ReservationSource, DbId)>,
) -> AppResult<Response> {
    state.repo.delete_reservation(id).await?;
    tracing::info!(reservation_id = id, "Reservation deleted");

    put_flash(&session, "Reservation deleted").await?;
    Ok(Redirect::to(src.list_path()).into_response())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /admin/users
pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let users: Vec<UserResponse> = state
        .repo
        .list_users()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    let data = TemplateData::new()
        .with_string("title", "Users")
        .with_data("users", &users)?;
    render_page(&state, &session, "admin-users.page.tmpl", data).await
}

/// GET /admin/users/new
pub async fn new_user_page(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let data = TemplateData::new().with_string("title", "New User");
    render_page(&state, &session, "admin-users-new.page.tmpl", data).await
}

#[derive(Serialize)]
struct NewUserValues<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    access_level: i32,
}

impl<'a> From<&'a NewUserForm> for NewUserValues<'a> {
    fn from(form: &'a NewUserForm) -> Self {
        Self {
            first_name: &form.first_name,
            last_name: &form.last_name,
            email: &form.email,
            access_level: form.access_level,
        }
    }
}

/// POST /admin/users/new
pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> AppResult<Response> {
    let redisplay = |errors: FormErrors| -> AppResult<TemplateData> {
        Ok(TemplateData::new()
            .with_string("title", "New User")
            .with_form_values(&NewUserValues::from(&form))?
            .with_form_errors(errors))
    };

    if let Err(errors) = form.check() {
        let data = redisplay(errors)?;
        return render_page(&state, &session, "admin-users-new.page.tmpl", data).await;
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    let input = CreateUser {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        password_hash,
        access_level: form.access_level,
    };

    match state.repo.create_user(&input).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User created");
            put_flash(&session, "User created").await?;
            Ok(Redirect::to("/admin/users").into_response())
        }
        Err(RepoError::Constraint(_)) => {
            let mut errors = FormErrors::new();
            errors.add("email", "A user with this email already exists");
            let data = redisplay(errors)?;
            render_page(&state, &session, "admin-users-new.page.tmpl", data).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/users/{id}/delete
///
/// An administrator cannot delete their own account.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    if id == admin.id {
        put_warning(&session, "You cannot delete your own account").await?;
        return Ok(Redirect::to("/admin/users").into_response());
    }

    state.repo.delete_user(id).await?;
    tracing::info!(user_id = id, deleted_by = admin.id, "User deleted");

    put_flash(&session, "User deleted").await?;
    Ok(Redirect::to("/admin/users").into_response())
}
