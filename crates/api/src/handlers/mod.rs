//! Request handlers, grouped by area.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use bookings_core::types::DbId;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::render::TemplateData;
use crate::session::flash::take_notices;
use crate::session::USER_ID_KEY;
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod booking;
pub mod pages;

/// Render a page with 200 OK.
pub async fn render_page(
    state: &AppState,
    session: &Session,
    template: &str,
    data: TemplateData,
) -> AppResult<Response> {
    render_page_with_status(state, session, template, data, StatusCode::OK).await
}

/// Render a page, merging in pending notices and the sign-in flag.
pub async fn render_page_with_status(
    state: &AppState,
    session: &Session,
    template: &str,
    mut data: TemplateData,
    status: StatusCode,
) -> AppResult<Response> {
    let notices = take_notices(session).await?;
    data.flash = data.flash.or(notices.flash);
    data.warning = data.warning.or(notices.warning);
    data.error = data.error.or(notices.error);
    data.is_authenticated = session.get::<DbId>(USER_ID_KEY).await?.is_some();

    let body = state.renderer.render(template, &data)?;
    Ok((status, Html(body)).into_response())
}
