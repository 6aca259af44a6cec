//! Static and room pages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bookings_db::RepoError;
use tower_sessions::Session;

use super::{render_page, render_page_with_status};
use crate::error::AppResult;
use crate::render::TemplateData;
use crate::state::AppState;

/// GET /
pub async fn home(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let mut data = TemplateData::new().with_string("title", "Home");
    match state.repo.all_rooms().await {
        Ok(rooms) => data = data.with_data("rooms", &rooms)?,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list rooms for home page");
            data.error = Some("Rooms cannot be listed right now".into());
        }
    }
    render_page(&state, &session, "home.page.tmpl", data).await
}

/// GET /about
pub async fn about(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let data = TemplateData::new().with_string("title", "About");
    render_page(&state, &session, "about.page.tmpl", data).await
}

/// GET /contact
pub async fn contact(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let data = TemplateData::new().with_string("title", "Contact");
    render_page(&state, &session, "contact.page.tmpl", data).await
}

/// GET /rooms/{slug}
pub async fn room(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    match state.repo.get_room_by_slug(&slug).await {
        Ok(room) => {
            let data = TemplateData::new()
                .with_string("title", room.room_name.clone())
                .with_data("room", &room)?;
            render_page(&state, &session, "room.page.tmpl", data).await
        }
        Err(RepoError::NotFound { .. }) => {
            let data = TemplateData::new().with_string("title", "Page not found");
            render_page_with_status(
                &state,
                &session,
                "not-found.page.tmpl",
                data,
                StatusCode::NOT_FOUND,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}
